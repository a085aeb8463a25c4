//! Registered driver entry.

use super::{DriverName, Protocol, RegistryError};
use crate::driver::domain::{Capability, CapabilitySet};
use crate::driver::ports::Driver;
use std::fmt;
use std::sync::Arc;

/// One registered driver: name, protocol, advertised capabilities and the
/// handle that implements them.
#[derive(Clone)]
pub struct DriverDescriptor {
    name: DriverName,
    protocol: Protocol,
    capabilities: CapabilitySet,
    handle: Arc<dyn Driver>,
}

impl DriverDescriptor {
    /// Creates a descriptor, checking that `capabilities` is exactly the set
    /// of interfaces `handle` exposes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapabilityMismatch`] when a tag is advertised
    /// without an interface or an interface is exposed without a tag.
    pub fn new(
        name: DriverName,
        protocol: Protocol,
        capabilities: CapabilitySet,
        handle: Arc<dyn Driver>,
    ) -> Result<Self, RegistryError> {
        let advertised_only: Vec<Capability> = capabilities
            .iter()
            .filter(|capability| !handle.exposes(*capability))
            .collect();
        let unadvertised: Vec<Capability> = Capability::ALL
            .into_iter()
            .filter(|capability| handle.exposes(*capability) && !capabilities.contains(*capability))
            .collect();
        if !advertised_only.is_empty() || !unadvertised.is_empty() {
            return Err(RegistryError::CapabilityMismatch {
                driver: name.to_string(),
                advertised_only,
                unadvertised,
            });
        }
        Ok(Self {
            name,
            protocol,
            capabilities,
            handle,
        })
    }

    /// Creates a descriptor whose capability tags are read from the handle.
    #[must_use]
    pub fn from_handle(name: DriverName, protocol: Protocol, handle: Arc<dyn Driver>) -> Self {
        let capabilities = Capability::ALL
            .into_iter()
            .filter(|capability| handle.exposes(*capability))
            .collect();
        Self {
            name,
            protocol,
            capabilities,
            handle,
        }
    }

    /// Returns the driver name.
    #[must_use]
    pub const fn name(&self) -> &DriverName {
        &self.name
    }

    /// Returns the protocol family.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the advertised capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Returns whether the driver advertises `capability`.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Returns the driver handle.
    #[must_use]
    pub fn handle(&self) -> &dyn Driver {
        self.handle.as_ref()
    }
}

impl fmt::Debug for DriverDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DriverDescriptor")
            .field("name", &self.name)
            .field("protocol", &self.protocol)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
