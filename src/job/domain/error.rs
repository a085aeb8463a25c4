//! Job parsing and polling errors.

use super::JobStatus;
use crate::context::ContextError;
use crate::job::ports::JobQueueError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading job identifiers and progress from CLI output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseJobError {
    /// The submission output has no `JID_` marker.
    #[error("job ID not found in submission output")]
    MissingJobId,

    /// The token after the marker is not a complete identifier.
    #[error("invalid job ID '{0}'")]
    InvalidJobId(String),

    /// The status output has no `Percent Complete=[...]` line.
    #[error("percent complete not found in job status output")]
    MissingProgress,

    /// The bracketed progress value is not an integer between 0 and 100.
    #[error("invalid percent complete value '{0}'")]
    InvalidProgress(String),
}

/// Errors returned by the job poller.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    /// The caller's deadline leaves too little time to watch the job finish.
    #[error("remaining deadline {remaining:?} is shorter than the required {required:?}")]
    InsufficientDeadline {
        /// Time left before the caller's deadline.
        remaining: Duration,
        /// Minimum time the poller needs.
        required: Duration,
    },

    /// The context ended before the job was submitted.
    #[error("job not submitted: {0}")]
    Context(#[source] ContextError),

    /// The scratch payload file could not be written.
    #[error("failed to stage job payload: {0}")]
    Scratch(Arc<std::io::Error>),

    /// The submission call failed.
    #[error("job submission failed: {0}")]
    Submit(#[source] JobQueueError),

    /// Submission or status output could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseJobError),

    /// A status query failed.
    #[error("job status query failed: {0}")]
    Query(#[source] JobQueueError),

    /// Status reads failed too many times in a row.
    #[error("job {job_id} failed after {} consecutive status errors", errors.len())]
    ConsecutiveErrors {
        /// Job identifier.
        job_id: String,
        /// Every error in the final streak, oldest first.
        errors: Vec<JobError>,
    },

    /// The caller cancelled or its deadline expired while polling.
    #[error("job {job_id} cancelled: {source}")]
    Cancelled {
        /// Job identifier.
        job_id: String,
        /// Why the context ended.
        #[source]
        source: ContextError,
    },

    /// The poller's own ceiling elapsed before the job finished.
    #[error("job {job_id} timed out after {timeout:?}")]
    TimedOut {
        /// Job identifier.
        job_id: String,
        /// Ceiling that elapsed.
        timeout: Duration,
    },
}

impl JobError {
    /// Wraps a scratch file failure.
    #[must_use]
    pub fn scratch(err: std::io::Error) -> Self {
        Self::Scratch(Arc::new(err))
    }

    /// Returns whether the failure came from cancellation or a time ceiling.
    ///
    /// A queue call interrupted by the context counts as cancellation even
    /// though it surfaces as a submission or status failure.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.is_cancellation() || matches!(self, Self::TimedOut { .. })
    }

    /// Returns whether the caller's context ended the job.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Context(_)
                | Self::Cancelled { .. }
                | Self::Submit(JobQueueError::Context(_))
                | Self::Query(JobQueueError::Context(_))
        )
    }

    /// Returns the terminal job state this failure corresponds to, or `None`
    /// when the job never reached polling.
    #[must_use]
    pub const fn terminal_status(&self) -> Option<JobStatus> {
        match self {
            Self::ConsecutiveErrors { .. } => Some(JobStatus::Failed),
            Self::TimedOut { .. } => Some(JobStatus::TimedOut),
            Self::Cancelled { .. } => Some(JobStatus::Cancelled),
            _ => None,
        }
    }
}
