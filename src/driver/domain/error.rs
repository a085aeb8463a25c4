//! Error taxonomy for driver operations.

use super::Capability;
use crate::context::ContextError;
use crate::job::domain::JobError;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a single driver invocation.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// A required configuration field is missing or invalid. Raised before
    /// any request is sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Connection, process spawn or I/O failure.
    #[error("transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The device answered with a status code outside the expected range.
    #[error("unexpected status {status} from {endpoint} (expected {expected})")]
    UnexpectedStatus {
        /// Endpoint or command that was called.
        endpoint: String,
        /// Status code received.
        status: u16,
        /// Accepted status codes.
        expected: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// An expected text pattern was absent from the output.
    #[error("parse failure: {0}")]
    Parse(String),

    /// A hard time ceiling was exceeded.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The operation context was cancelled or hit its deadline.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A long-running vendor job failed.
    #[error(transparent)]
    Job(#[from] JobError),

    /// One step of a multi-step protocol failed; later steps were not sent.
    #[error("step '{step}' failed: {source}")]
    Step {
        /// Name of the failed step.
        step: String,
        /// Failure of that step.
        #[source]
        source: Box<DriverError>,
    },

    /// The driver does not implement the capability.
    #[error("capability {0} is not implemented by this driver")]
    Unsupported(Capability),
}

impl DriverError {
    /// Builds a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Tags this error with the protocol step that produced it.
    #[must_use]
    pub fn in_step(self, step: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            source: Box::new(self),
        }
    }

    /// Returns the name of the failed step for multi-step protocol failures.
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Returns whether the failure must stop fallback to further drivers.
    ///
    /// Cancellation and timeouts are fatal; every other failure lets the
    /// dispatcher try the next candidate.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Context(_) | Self::Timeout(_) => true,
            Self::Job(job_error) => job_error.is_fatal(),
            Self::Step { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Returns whether the caller's cancellation or deadline caused the
    /// failure.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Context(_) => true,
            Self::Job(job_error) => job_error.is_cancellation(),
            Self::Step { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}
