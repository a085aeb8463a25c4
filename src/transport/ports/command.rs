//! Subprocess execution contract.

use crate::context::{ContextError, OperationContext};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Captured result of one command run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Builds a successful output with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Returns whether the process exited with status zero.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs one external program with the given arguments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs the program and captures its output. A non-zero exit is not an
    /// error at this layer.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] when the program cannot be started and
    /// [`CommandError::Context`] when the context ends first.
    async fn run(&self, ctx: &OperationContext, args: &[String]) -> Result<CommandOutput, CommandError>;
}

/// Errors returned by command executors.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The program could not be started or its output read.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program path.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The context ended while the command was running; the child is killed.
    #[error(transparent)]
    Context(#[from] ContextError),
}
