pub mod job;
pub mod record;

pub use job::{JobKind, JobMessage};
pub use record::{JobRecord, JobStatus};
