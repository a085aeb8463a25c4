//! Provenance records and dispatch errors.

mod error;
mod metadata;

pub use error::DispatchError;
pub use metadata::{ExecutionMetadata, ProviderFailure};
