//! Dispatch errors.

use super::ProviderFailure;
use crate::context::ContextError;
use crate::driver::domain::{Capability, DriverError};
use crate::registry::domain::{DriverName, RegistryError};
use thiserror::Error;

/// Errors returned by client operations.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// No registered driver advertises the capability.
    #[error("no compatible driver for {0}")]
    NoCompatibleDriver(Capability),

    /// The context ended before the next candidate was invoked.
    #[error("{capability} stopped: {source}")]
    Context {
        /// Requested capability.
        capability: Capability,
        /// Why the context ended.
        #[source]
        source: ContextError,
        /// Candidates that failed before the context ended.
        failures: Vec<ProviderFailure>,
    },

    /// A candidate failed in a way that forbids trying the rest.
    #[error("{capability} aborted by driver '{provider}': {source}")]
    Aborted {
        /// Requested capability.
        capability: Capability,
        /// Driver that failed.
        provider: DriverName,
        /// Its failure.
        #[source]
        source: DriverError,
    },

    /// Every candidate failed.
    #[error("all drivers failed for {capability}: {}", summarize(failures))]
    AllProvidersFailed {
        /// Requested capability.
        capability: Capability,
        /// One entry per candidate, in invocation order.
        failures: Vec<ProviderFailure>,
    },

    /// Opening or closing the registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl DispatchError {
    /// Returns the per-driver failures carried by this error.
    #[must_use]
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::Context { failures, .. } | Self::AllProvidersFailed { failures, .. } => failures,
            Self::Registry(RegistryError::NoDriversOpened { failures }) => failures,
            _ => &[],
        }
    }

    /// Returns whether the call was stopped by cancellation or a deadline.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Context { .. } | Self::Registry(RegistryError::Context(_)) => true,
            Self::Aborted { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}

fn summarize(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.provider, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}
