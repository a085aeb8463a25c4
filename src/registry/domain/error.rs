//! Registry errors.

use crate::context::ContextError;
use crate::dispatch::domain::ProviderFailure;
use crate::driver::domain::{Capability, DriverError};
use thiserror::Error;

/// Error returned while parsing a protocol name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown protocol: {0}")]
pub struct ParseProtocolError(pub String);

/// Errors returned while building, opening or closing a registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The driver name is empty or contains whitespace.
    #[error("invalid driver name '{0}'")]
    InvalidDriverName(String),

    /// The advertised capability tags do not match the handle's interfaces.
    #[error(
        "driver '{driver}' advertises {advertised_only:?} without implementing them and implements {unadvertised:?} without advertising them"
    )]
    CapabilityMismatch {
        /// Driver name.
        driver: String,
        /// Tags advertised but not implemented.
        advertised_only: Vec<Capability>,
        /// Interfaces implemented but not advertised.
        unadvertised: Vec<Capability>,
    },

    /// The context ended before every driver was tried.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Every driver failed to open.
    #[error("no drivers opened ({} failed)", failures.len())]
    NoDriversOpened {
        /// One entry per failed driver, in registration order.
        failures: Vec<ProviderFailure>,
    },

    /// At least one driver failed to close. The others were still closed.
    #[error("failed to close driver '{driver}': {source}")]
    CloseFailed {
        /// First driver that failed.
        driver: String,
        /// Its failure.
        #[source]
        source: DriverError,
    },
}
