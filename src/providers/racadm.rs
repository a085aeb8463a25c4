//! Dell `racadm` CLI: BIOS configuration through vendor jobs.

use super::Credentials;
use crate::context::OperationContext;
use crate::driver::domain::{Capability, CapabilitySet};
use crate::driver::ports::{BiosConfigurator, Connection, Driver, DriverResult};
use crate::job::domain::JobId;
use crate::job::ports::{JobQueue, JobQueueError, JobQueueResult};
use crate::job::services::JobPoller;
use crate::registry::domain::{DriverDescriptor, DriverName, Protocol, RegistryError};
use crate::transport::adapters::ProcessExecutor;
use crate::transport::ports::{CommandError, CommandExecutor};
use async_trait::async_trait;
use mockable::Clock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Registered driver name.
pub const NAME: &str = "racadm";
/// Protocol family.
pub const PROTOCOL: Protocol = Protocol::Cli;
/// Advertised capabilities.
pub const CAPABILITIES: [Capability; 2] = [Capability::Connection, Capability::BiosConfiguration];

/// Builds an executor for the `racadm` binary at `program`.
///
/// racadm output is parsed by text, so the child runs under a fixed
/// `C.UTF-8` locale.
#[must_use]
pub fn executor(program: impl Into<PathBuf>) -> ProcessExecutor {
    ProcessExecutor::new(program).with_env("LC_ALL", "C.UTF-8")
}

/// The device job queue as seen through `racadm set` and
/// `racadm jobqueue view`.
struct RacadmQueue {
    executor: Arc<dyn CommandExecutor>,
    credentials: Credentials,
}

impl RacadmQueue {
    fn args(&self, command: &str, extra: &[&str]) -> Vec<String> {
        let remote = self.credentials.port.map_or_else(
            || self.credentials.host.clone(),
            |port| format!("{}:{port}", self.credentials.host),
        );
        let mut args = vec![
            "-r".to_owned(),
            remote,
            "-u".to_owned(),
            self.credentials.username.clone(),
            "-p".to_owned(),
            self.credentials.password.clone(),
            "--nocertwarn".to_owned(),
            command.to_owned(),
        ];
        args.extend(extra.iter().map(|arg| (*arg).to_owned()));
        args
    }

    async fn run(&self, ctx: &OperationContext, command: &str, extra: &[&str]) -> JobQueueResult<String> {
        debug!(host = %self.credentials.host, command, "racadm call");
        let output = self
            .executor
            .run(ctx, &self.args(command, extra))
            .await
            .map_err(queue_error)?;
        if !output.succeeded() {
            let reason = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            return Err(JobQueueError::Rejected(format!("racadm {command}: {reason}")));
        }
        Ok(output.stdout)
    }
}

fn queue_error(err: CommandError) -> JobQueueError {
    match err {
        CommandError::Context(context) => JobQueueError::Context(context),
        spawn @ CommandError::Spawn { .. } => JobQueueError::transport(spawn),
    }
}

#[async_trait]
impl JobQueue for RacadmQueue {
    async fn submit(&self, ctx: &OperationContext, payload_path: &Path) -> JobQueueResult<String> {
        let file = payload_path.to_string_lossy();
        self.run(ctx, "set", &["-t", "xml", "-f", &*file]).await
    }

    async fn status(&self, ctx: &OperationContext, job_id: &JobId) -> JobQueueResult<String> {
        self.run(ctx, "jobqueue", &["view", "-i", job_id.as_str()])
            .await
    }
}

/// Driver that applies BIOS configuration documents with `racadm`.
pub struct Racadm<C>
where
    C: Clock + Send + Sync,
{
    queue: RacadmQueue,
    poller: JobPoller<C>,
}

impl<C> Racadm<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates the driver. `executor` must run the `racadm` binary; see
    /// [`executor`].
    #[must_use]
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        credentials: Credentials,
        poller: JobPoller<C>,
    ) -> Self {
        Self {
            queue: RacadmQueue {
                executor,
                credentials,
            },
            poller,
        }
    }

    /// Wraps the driver in a registry descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapabilityMismatch`] if the advertised tags
    /// drift from the implemented interfaces.
    pub fn descriptor(self) -> Result<DriverDescriptor, RegistryError> {
        DriverDescriptor::new(
            DriverName::new(NAME)?,
            PROTOCOL,
            CapabilitySet::new(CAPABILITIES),
            Arc::new(self),
        )
    }
}

impl<C> std::fmt::Debug for Racadm<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Racadm")
            .field("credentials", &self.queue.credentials)
            .field("poller", self.poller.config())
            .finish_non_exhaustive()
    }
}

impl<C> Driver for Racadm<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn connection(&self) -> Option<&dyn Connection> {
        Some(self)
    }

    fn bios_configurator(&self) -> Option<&dyn BiosConfigurator> {
        Some(self)
    }
}

/// racadm authenticates on every invocation, so open and close do nothing.
#[async_trait]
impl<C> Connection for Racadm<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn open(&self, _ctx: &OperationContext) -> DriverResult<()> {
        Ok(())
    }

    async fn close(&self, _ctx: &OperationContext) -> DriverResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<C> BiosConfigurator for Racadm<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn set_bios_configuration(
        &self,
        ctx: &OperationContext,
        document: &str,
    ) -> DriverResult<()> {
        let job = self.poller.run(ctx, &self.queue, document).await?;
        info!(
            host = %self.queue.credentials.host,
            job_id = %job.id,
            "BIOS configuration applied"
        );
        Ok(())
    }
}
