//! Ordered driver collection with open and close.

use crate::context::OperationContext;
use crate::dispatch::domain::{ExecutionMetadata, ProviderFailure};
use crate::driver::domain::Capability;
use crate::registry::domain::{DriverDescriptor, Protocol, RegistryError};
use std::time::Duration;
use tracing::warn;

/// Budget for closing sessions left behind by an interrupted open.
const ROLLBACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Drivers in fallback priority order.
///
/// The registry is built once at startup and read by every dispatch. Opening
/// returns a new registry holding only the drivers whose session opened; the
/// declared registry is left untouched.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    drivers: Vec<DriverDescriptor>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Appends a driver. Duplicate names are allowed.
    pub fn register(&mut self, descriptor: DriverDescriptor) {
        self.drivers.push(descriptor);
    }

    /// Returns the drivers that advertise `capability`, in registration
    /// order.
    pub fn drivers_for(&self, capability: Capability) -> impl Iterator<Item = &DriverDescriptor> {
        self.drivers
            .iter()
            .filter(move |descriptor| descriptor.supports(capability))
    }

    /// Returns a registry holding only drivers of `protocol`, order kept.
    #[must_use]
    pub fn using(&self, protocol: Protocol) -> Self {
        self.drivers
            .iter()
            .filter(|descriptor| descriptor.protocol() == protocol)
            .cloned()
            .collect()
    }

    /// Returns every registered driver in order.
    #[must_use]
    pub fn drivers(&self) -> &[DriverDescriptor] {
        &self.drivers
    }

    /// Returns the number of registered drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Returns whether no drivers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Opens every driver session in order and returns the registry of
    /// drivers that opened.
    ///
    /// Drivers without a session interface are always kept. A failed open
    /// drops that driver from the result and is recorded in `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Context`] as soon as the context ends, after
    /// closing the sessions this call already opened, or
    /// [`RegistryError::NoDriversOpened`] when no driver opened.
    pub async fn open(
        &self,
        ctx: &OperationContext,
        metadata: &mut ExecutionMetadata,
    ) -> Result<Self, RegistryError> {
        let mut opened = Self::new();
        let mut failures = Vec::new();
        for descriptor in &self.drivers {
            if let Err(reason) = ctx.check() {
                opened.roll_back().await;
                return Err(reason.into());
            }
            let name = descriptor.name();
            let Some(connection) = descriptor.handle().connection() else {
                opened.register(descriptor.clone());
                continue;
            };
            metadata.record_attempt(name);
            match connection.open(ctx).await {
                Ok(()) => {
                    metadata.record_connection(name);
                    opened.register(descriptor.clone());
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
        if opened.is_empty() {
            return Err(RegistryError::NoDriversOpened { failures });
        }
        Ok(opened)
    }

    /// Closes sessions opened by an interrupted [`Registry::open`]. The
    /// caller's context has ended, so a fresh bounded one is used.
    async fn roll_back(&self) {
        let ctx = OperationContext::with_timeout(ROLLBACK_TIMEOUT);
        if let Err(error) = self.close(&ctx, &mut ExecutionMetadata::new()).await {
            warn!(error = %error, "closing sessions after an interrupted open failed");
        }
    }

    /// Closes every driver session, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CloseFailed`] for the first driver that
    /// failed to close, after every other driver has been closed.
    pub async fn close(
        &self,
        ctx: &OperationContext,
        metadata: &mut ExecutionMetadata,
    ) -> Result<(), RegistryError> {
        let mut first_failure = None;
        for descriptor in &self.drivers {
            let Some(connection) = descriptor.handle().connection() else {
                continue;
            };
            let name = descriptor.name();
            metadata.record_attempt(name);
            match connection.close(ctx).await {
                Ok(()) => metadata.record_connection(name),
                Err(error) => {
                    metadata.record_failure(name, error.clone());
                    if first_failure.is_none() {
                        first_failure = Some(RegistryError::CloseFailed {
                            driver: name.to_string(),
                            source: error,
                        });
                    }
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }
}

impl FromIterator<DriverDescriptor> for Registry {
    fn from_iter<I: IntoIterator<Item = DriverDescriptor>>(iter: I) -> Self {
        Self {
            drivers: iter.into_iter().collect(),
        }
    }
}
