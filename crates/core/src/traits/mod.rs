pub mod cache;
pub mod handler;
pub mod queue_service;
pub mod store;
pub mod transport;

pub use cache::{cache_keys, CacheStore};
pub use handler::JobHandler;
pub use queue_service::JobQueueService;
pub use store::ResultStore;
pub use transport::QueueTransport;
