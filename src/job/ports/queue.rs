//! Job submission and status contract.

use crate::context::{ContextError, OperationContext};
use crate::job::domain::JobId;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job queue operations.
pub type JobQueueResult<T> = Result<T, JobQueueError>;

/// Device-side queue that accepts payload files and reports job status as
/// free-form text.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submits the payload stored at `payload_path` and returns the raw
    /// submission output.
    ///
    /// # Errors
    ///
    /// Returns [`JobQueueError`] when the call cannot be made or the device
    /// rejects it.
    async fn submit(&self, ctx: &OperationContext, payload_path: &Path) -> JobQueueResult<String>;

    /// Returns the raw status output for `job_id`.
    ///
    /// # Errors
    ///
    /// Returns [`JobQueueError`] when the query cannot be made or the device
    /// rejects it.
    async fn status(&self, ctx: &OperationContext, job_id: &JobId) -> JobQueueResult<String>;
}

/// Errors returned by job queue implementations.
#[derive(Debug, Clone, Error)]
pub enum JobQueueError {
    /// The call could not be made.
    #[error("job queue transport failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The device answered with an error.
    #[error("job queue rejected the request: {0}")]
    Rejected(String),

    /// The context ended while the call was in flight.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl JobQueueError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
