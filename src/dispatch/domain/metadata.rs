//! Per-call provenance.

use crate::driver::domain::DriverError;
use crate::registry::domain::DriverName;

/// A driver that was tried and failed.
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    /// Driver name.
    pub provider: DriverName,
    /// Why it failed.
    pub error: DriverError,
}

/// Which drivers a call tried, which one served it and why the others
/// failed.
///
/// A fresh value is produced for every top-level call. Callers log or
/// inspect it as they see fit.
#[derive(Debug, Clone, Default)]
pub struct ExecutionMetadata {
    /// Driver that produced the result.
    pub successful_provider: Option<DriverName>,
    /// Every driver invoked, in order.
    pub providers_attempted: Vec<DriverName>,
    /// Drivers whose session opened or closed cleanly.
    pub successful_connections: Vec<DriverName>,
    /// Failures in invocation order.
    pub failures: Vec<ProviderFailure>,
}

impl ExecutionMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first recorded failure for `provider`.
    #[must_use]
    pub fn failure_for(&self, provider: &str) -> Option<&DriverError> {
        self.failures
            .iter()
            .find(|failure| failure.provider.as_str() == provider)
            .map(|failure| &failure.error)
    }

    pub(crate) fn record_attempt(&mut self, provider: &DriverName) {
        self.providers_attempted.push(provider.clone());
    }

    pub(crate) fn record_success(&mut self, provider: &DriverName) {
        self.successful_provider = Some(provider.clone());
    }

    pub(crate) fn record_connection(&mut self, provider: &DriverName) {
        self.successful_connections.push(provider.clone());
    }

    pub(crate) fn record_failure(&mut self, provider: &DriverName, error: DriverError) {
        self.failures.push(ProviderFailure {
            provider: provider.clone(),
            error,
        });
    }
}
