//! Priority fallback over the drivers that advertise a capability.

use crate::context::OperationContext;
use crate::dispatch::domain::{DispatchError, ExecutionMetadata, ProviderFailure};
use crate::driver::domain::{Capability, DriverError};
use crate::driver::ports::Driver;
use crate::registry::services::Registry;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by a capability method.
pub type DriverFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DriverError>> + Send + 'a>>;

/// Invokes the candidates for `capability` one at a time, in registration
/// order, until one succeeds.
///
/// `invoke` maps a driver to the future for the requested operation, or
/// `None` when the driver lacks the interface. The context is checked before
/// every candidate; once it has ended no further candidate is started. A
/// fatal driver failure (cancellation or timeout) stops the chain as well.
/// Every attempt, success and failure is written to `metadata`.
///
/// # Errors
///
/// Returns [`DispatchError::NoCompatibleDriver`] when no driver advertises
/// the capability, [`DispatchError::Context`] when the context ends,
/// [`DispatchError::Aborted`] on a fatal driver failure, and
/// [`DispatchError::AllProvidersFailed`] with one entry per candidate when
/// every candidate fails.
pub async fn dispatch<'a, T, F>(
    ctx: &OperationContext,
    registry: &'a Registry,
    capability: Capability,
    metadata: &mut ExecutionMetadata,
    mut invoke: F,
) -> Result<T, DispatchError>
where
    F: FnMut(&'a dyn Driver) -> Option<DriverFuture<'a, T>>,
{
    let mut candidates = registry.drivers_for(capability).peekable();
    if candidates.peek().is_none() {
        return Err(DispatchError::NoCompatibleDriver(capability));
    }

    let mut failures: Vec<ProviderFailure> = Vec::new();
    for descriptor in candidates {
        if let Err(reason) = ctx.check() {
            return Err(DispatchError::Context {
                capability,
                source: reason,
                failures,
            });
        }

        let name = descriptor.name();
        metadata.record_attempt(name);
        let outcome = match invoke(descriptor.handle()) {
            Some(operation) => operation.await,
            None => Err(DriverError::Unsupported(capability)),
        };

        match outcome {
            Ok(value) => {
                metadata.record_success(name);
                return Ok(value);
            }
            Err(error) if error.is_fatal() => {
                metadata.record_failure(name, error.clone());
                return Err(DispatchError::Aborted {
                    capability,
                    provider: name.clone(),
                    source: error,
                });
            }
            Err(error) => {
                metadata.record_failure(name, error.clone());
                failures.push(ProviderFailure {
                    provider: name.clone(),
                    error,
                });
            }
        }
    }

    Err(DispatchError::AllProvidersFailed {
        capability,
        failures,
    })
}
