//! Client construction from declarative settings.
//!
//! [`ClientConfig`] names one BMC, its login and the providers to try in
//! priority order. [`crate::dispatch::services::BmcClient::from_config`]
//! turns it into a client with one driver per listed provider. Nothing is
//! registered globally; every client owns its drivers.

mod builder;
mod settings;

pub use builder::ClientBuildError;
pub use settings::{ClientConfig, ParseProviderKindError, ProviderKind, RedfishOptions};
