//! Submit-then-poll state machine for vendor jobs.

use crate::context::{ContextError, OperationContext};
use crate::job::domain::{
    CompletedJob, Job, JobError, JobId, JobStatus, parse_job_id, parse_percent_complete,
};
use crate::job::ports::{JobQueue, JobQueueError};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

/// Timing and error tolerance for [`JobPoller`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Delay between status queries.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Hard ceiling on polling, independent of the caller's deadline.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Failed status reads in a row that fail the job.
    pub max_consecutive_errors: u32,
    /// Shortest caller deadline the poller accepts before submitting.
    #[serde(with = "humantime_serde")]
    pub minimum_deadline: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(14 * 60 + 30),
            max_consecutive_errors: 3,
            minimum_deadline: Duration::from_secs(14 * 60 + 30),
        }
    }
}

/// Runs one job from submission to a terminal state.
///
/// Each [`JobPoller::run`] call owns its job; independent calls may run
/// concurrently against different queues.
#[derive(Clone)]
pub struct JobPoller<C>
where
    C: Clock + Send + Sync,
{
    config: PollerConfig,
    clock: Arc<C>,
}

impl<C> JobPoller<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a poller.
    #[must_use]
    pub const fn new(config: PollerConfig, clock: Arc<C>) -> Self {
        Self { config, clock }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Stages `payload` in a scratch file, submits it and polls until the
    /// job finishes.
    ///
    /// The scratch file is removed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InsufficientDeadline`] before submitting when the
    /// caller's deadline is too short, [`JobError::Submit`] or
    /// [`JobError::Parse`] when submission fails, and
    /// [`JobError::ConsecutiveErrors`], [`JobError::TimedOut`] or
    /// [`JobError::Cancelled`] when polling ends without success.
    pub async fn run(
        &self,
        ctx: &OperationContext,
        queue: &dyn JobQueue,
        payload: &str,
    ) -> Result<CompletedJob, JobError> {
        self.ensure_deadline(ctx)?;
        ctx.check().map_err(JobError::Context)?;

        let scratch = stage_payload(payload).await?;
        let output = queue
            .submit(ctx, scratch.path())
            .await
            .map_err(JobError::Submit)?;
        let job_id = parse_job_id(&output)?;
        info!(job_id = %job_id, "job submitted");

        let mut job = Job::submitted(job_id, &*self.clock);
        let outcome = self.poll(ctx, queue, &mut job).await;
        drop(scratch);
        outcome.map(|()| job.into_completed())
    }

    fn ensure_deadline(&self, ctx: &OperationContext) -> Result<(), JobError> {
        let required = self.config.minimum_deadline;
        match ctx.remaining() {
            Some(remaining) if remaining < required => {
                Err(JobError::InsufficientDeadline { remaining, required })
            }
            _ => Ok(()),
        }
    }

    async fn poll(
        &self,
        ctx: &OperationContext,
        queue: &dyn JobQueue,
        job: &mut Job,
    ) -> Result<(), JobError> {
        job.transition_to(JobStatus::Polling);
        let job_id = job.id().clone();
        let ceiling = tokio::time::sleep(self.config.timeout);
        tokio::pin!(ceiling);
        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut streak: Vec<JobError> = Vec::new();

        loop {
            tokio::select! {
                biased;
                reason = ctx.done() => return Err(cancel(job, reason)),
                () = &mut ceiling => return Err(self.time_out(job)),
                _ = ticker.tick() => {}
            }

            let read = tokio::select! {
                biased;
                reason = ctx.done() => return Err(cancel(job, reason)),
                () = &mut ceiling => return Err(self.time_out(job)),
                outcome = read_progress(ctx, queue, &job_id) => outcome,
            };

            match read {
                Ok(percent) => {
                    streak.clear();
                    job.record_progress(percent);
                    debug!(job_id = %job_id, percent, "job progress");
                    if job.status() == JobStatus::Succeeded {
                        info!(job_id = %job_id, "job completed");
                        return Ok(());
                    }
                }
                Err(JobError::Query(JobQueueError::Context(reason))) => {
                    return Err(cancel(job, reason));
                }
                Err(error) => {
                    let count = job.record_error();
                    warn!(
                        job_id = %job_id,
                        consecutive_errors = count,
                        error = %error,
                        "job status read failed"
                    );
                    streak.push(error);
                    if count >= self.config.max_consecutive_errors {
                        job.transition_to(JobStatus::Failed);
                        return Err(JobError::ConsecutiveErrors {
                            job_id: job_id.to_string(),
                            errors: streak,
                        });
                    }
                }
            }
        }
    }

    fn time_out(&self, job: &mut Job) -> JobError {
        job.transition_to(JobStatus::TimedOut);
        warn!(job_id = %job.id(), timeout = ?self.config.timeout, "job timed out");
        JobError::TimedOut {
            job_id: job.id().to_string(),
            timeout: self.config.timeout,
        }
    }
}

fn cancel(job: &mut Job, reason: ContextError) -> JobError {
    job.transition_to(JobStatus::Cancelled);
    JobError::Cancelled {
        job_id: job.id().to_string(),
        source: reason,
    }
}

async fn read_progress(
    ctx: &OperationContext,
    queue: &dyn JobQueue,
    job_id: &JobId,
) -> Result<u8, JobError> {
    let output = queue.status(ctx, job_id).await.map_err(JobError::Query)?;
    Ok(parse_percent_complete(&output)?)
}

async fn stage_payload(payload: &str) -> Result<NamedTempFile, JobError> {
    let scratch = NamedTempFile::new().map_err(JobError::scratch)?;
    tokio::fs::write(scratch.path(), payload)
        .await
        .map_err(JobError::scratch)?;
    Ok(scratch)
}
