//! `tokio::process` command executor.

use crate::context::OperationContext;
use crate::transport::ports::{CommandError, CommandExecutor, CommandOutput};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// Runs a fixed program as a child process.
///
/// Arguments may carry credentials, so only the program path and the
/// argument count are logged. The child is killed if the context ends first.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: PathBuf,
    envs: Vec<(String, String)>,
}

impl ProcessExecutor {
    /// Creates an executor for `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            envs: Vec::new(),
        }
    }

    /// Sets an environment variable on every child.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Returns the program path.
    #[must_use]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn spawn_error(&self, source: std::io::Error) -> CommandError {
        CommandError::Spawn {
            program: self.program.display().to_string(),
            source: Arc::new(source),
        }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, ctx: &OperationContext, args: &[String]) -> Result<CommandOutput, CommandError> {
        ctx.check()?;
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .envs(self.envs.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        debug!(
            program = %self.program.display(),
            arg_count = args.len(),
            "running command"
        );

        let output = tokio::select! {
            biased;
            reason = ctx.done() => return Err(CommandError::Context(reason)),
            result = command.output() => result.map_err(|err| self.spawn_error(err))?,
        };

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
