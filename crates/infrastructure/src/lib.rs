pub mod memory;
pub mod queue_client;
pub mod redis;

pub use self::memory::{InMemoryCacheStore, InMemoryQueueTransport, InMemoryResultStore};
pub use self::queue_client::JobQueueClient;
pub use self::redis::{
    RedisCacheStore, RedisConnectionManager, RedisQueueTransport, RedisResultStore,
};
