//! Submit and poll long-running vendor jobs.
//!
//! CLI drivers hand a configuration payload to [`services::JobPoller`], which
//! submits it through a [`ports::JobQueue`], extracts the job identifier and
//! polls progress until the job succeeds, fails, times out or the caller
//! cancels.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
