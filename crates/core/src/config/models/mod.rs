mod api;
mod app_config;
mod cache;
mod message_queue;
mod processor;
mod result_store;

pub use api::ApiConfig;
pub use app_config::AppConfig;
pub use cache::CacheConfig;
pub use message_queue::{MessageQueueConfig, QueueBackend, RedisConfig};
pub use processor::ProcessorConfig;
pub use result_store::ResultStoreConfig;
