//! Job identifiers, lifecycle and output parsing.

mod error;
mod job;
mod parse;

pub use error::{JobError, ParseJobError};
pub use job::{CompletedJob, Job, JobId, JobStatus};
pub use parse::{parse_job_id, parse_percent_complete};
