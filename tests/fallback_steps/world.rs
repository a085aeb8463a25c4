//! Shared world state for capability fallback scenarios.

use crate::support::{FakeDriver, describe};
use bmclink::dispatch::domain::{DispatchError, ExecutionMetadata};
use bmclink::dispatch::services::BmcClient;
use bmclink::driver::domain::PowerState;
use bmclink::registry::domain::{DriverName, Protocol};
use bmclink::registry::services::Registry;
use rstest::fixture;
use std::sync::Arc;

/// Scenario world for fallback behaviour tests.
#[derive(Default)]
pub struct FallbackWorld {
    /// Drivers declared so far, in priority order.
    pub registry: Registry,
    /// Handles kept so steps can inspect call counts.
    pub drivers: Vec<Arc<FakeDriver>>,
    /// Client built from the declared drivers.
    pub client: Option<BmcClient>,
    /// Metadata of the last client call.
    pub metadata: ExecutionMetadata,
    /// Result of the last power read.
    pub last_read: Option<Result<PowerState, DispatchError>>,
    /// Result of the last power action.
    pub last_action: Option<Result<(), DispatchError>>,
    /// Drivers reported by the last open.
    pub opened: Vec<DriverName>,
}

impl FallbackWorld {
    /// Declares `driver` under `name`.
    pub fn declare(
        &mut self,
        name: &str,
        protocol: &str,
        driver: FakeDriver,
    ) -> Result<(), eyre::Report> {
        let family = Protocol::try_from(protocol)?;
        let handle = Arc::new(driver);
        self.registry.register(describe(name, family, &handle)?);
        self.drivers.push(handle);
        Ok(())
    }

    /// Returns the declared driver registered as `name`.
    pub fn driver(&self, name: &str) -> Result<&Arc<FakeDriver>, eyre::Report> {
        self.registry
            .drivers()
            .iter()
            .zip(&self.drivers)
            .find(|(descriptor, _)| descriptor.name().as_str() == name)
            .map(|(_, driver)| driver)
            .ok_or_else(|| eyre::eyre!("no driver named '{name}' was declared"))
    }

    /// Returns the client, building it on first use.
    pub fn client(&mut self) -> &mut BmcClient {
        let registry = &self.registry;
        self.client
            .get_or_insert_with(|| BmcClient::new(registry.clone()))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> FallbackWorld {
    FallbackWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
