pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use self::config::AppConfig;
pub use errors::{AnalyticsError, AnalyticsResult};
pub use models::{JobKind, JobMessage, JobRecord, JobStatus};
pub use traits::{CacheStore, JobHandler, JobQueueService, QueueTransport, ResultStore};
