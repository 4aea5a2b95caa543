mod cache;
mod connection;
mod queue;
mod store;

pub use cache::RedisCacheStore;
pub use connection::RedisConnectionManager;
pub use queue::RedisQueueTransport;
pub use store::RedisResultStore;
