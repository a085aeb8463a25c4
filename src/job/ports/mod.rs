//! Port for vendor job queues.

mod queue;

pub use queue::{JobQueue, JobQueueError, JobQueueResult};
