//! Job aggregate and lifecycle states.

use super::ParseJobError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor job identifier: `JID_` followed by twelve characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Marker every identifier starts with.
    pub const PREFIX: &'static str = "JID_";

    /// Total identifier length including the prefix.
    pub const LENGTH: usize = 16;

    /// Validates and wraps an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ParseJobError::InvalidJobId`] when the value does not start
    /// with `JID_`, is not sixteen characters long or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ParseJobError> {
        let raw = value.into();
        let well_formed = raw.len() == Self::LENGTH
            && raw.starts_with(Self::PREFIX)
            && raw.chars().all(|ch| ch.is_ascii_graphic());
        if !well_formed {
            return Err(ParseJobError::InvalidJobId(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl TryFrom<String> for JobId {
    type Error = ParseJobError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(value: JobId) -> Self {
        value.0
    }
}

/// Lifecycle state of a vendor job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The job was accepted by the device.
    Submitted,
    /// Progress is being polled.
    Polling,
    /// The job reported 100 percent completion.
    Succeeded,
    /// Status queries failed too many times in a row.
    Failed,
    /// The poller's own time ceiling elapsed.
    TimedOut,
    /// The caller's context was cancelled or expired.
    Cancelled,
}

impl JobStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::TimedOut | Self::Cancelled
        )
    }

    /// Returns whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Submitted => matches!(next, Self::Polling | Self::Cancelled | Self::TimedOut),
            Self::Polling => next.is_terminal(),
            Self::Succeeded | Self::Failed | Self::TimedOut | Self::Cancelled => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// State of one submitted job, owned by the poll loop that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    percent_complete: u8,
    consecutive_errors: u32,
    submitted_at: DateTime<Utc>,
}

impl Job {
    /// Creates a freshly submitted job.
    #[must_use]
    pub fn submitted(id: JobId, clock: &impl Clock) -> Self {
        Self {
            id,
            status: JobStatus::Submitted,
            percent_complete: 0,
            consecutive_errors: 0,
            submitted_at: clock.utc(),
        }
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> &JobId {
        &self.id
    }

    /// Returns the current state.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the last reported progress.
    #[must_use]
    pub const fn percent_complete(&self) -> u8 {
        self.percent_complete
    }

    /// Returns the current run of failed status reads.
    #[must_use]
    pub const fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Returns when the job was submitted.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Moves the job to `next`. Illegal transitions are ignored and reported
    /// as `false`.
    pub fn transition_to(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    /// Records a successful progress read. Clears the error streak and marks
    /// the job succeeded once it reaches 100 percent.
    pub fn record_progress(&mut self, percent: u8) {
        self.consecutive_errors = 0;
        self.percent_complete = percent;
        if percent >= 100 {
            self.transition_to(JobStatus::Succeeded);
        }
    }

    /// Records a failed status read and returns the new streak length.
    pub const fn record_error(&mut self) -> u32 {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        self.consecutive_errors
    }

    /// Finishes the job, returning its summary.
    #[must_use]
    pub fn into_completed(self) -> CompletedJob {
        CompletedJob {
            id: self.id,
            status: self.status,
            percent_complete: self.percent_complete,
            submitted_at: self.submitted_at,
        }
    }
}

/// Summary of a job that reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    /// Vendor job identifier.
    pub id: JobId,
    /// Terminal state.
    pub status: JobStatus,
    /// Last reported progress.
    pub percent_complete: u8,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}
