pub mod models;

pub use models::{
    ApiConfig, AppConfig, CacheConfig, MessageQueueConfig, ProcessorConfig, QueueBackend,
    RedisConfig, ResultStoreConfig,
};
