//! In-memory drivers shared by the integration suites.

use async_trait::async_trait;
use bmclink::context::OperationContext;
use bmclink::driver::domain::{DriverError, PowerAction, PowerState};
use bmclink::driver::ports::{
    Connection, Driver, DriverResult, PowerStateGetter, PowerStateSetter,
};
use bmclink::registry::domain::{DriverDescriptor, DriverName, Protocol};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Driver with session and power control whose results are fixed up front.
#[derive(Debug)]
pub struct FakeDriver {
    open_result: DriverResult<()>,
    power_result: DriverResult<PowerState>,
    calls: AtomicUsize,
    last_action: std::sync::Mutex<Option<PowerAction>>,
}

impl FakeDriver {
    /// A driver that opens and reports `state`.
    pub fn healthy(state: PowerState) -> Self {
        Self {
            open_result: Ok(()),
            power_result: Ok(state),
            calls: AtomicUsize::new(0),
            last_action: std::sync::Mutex::new(None),
        }
    }

    /// A driver whose power calls fail with `error`.
    pub fn broken(error: DriverError) -> Self {
        Self {
            power_result: Err(error),
            ..Self::healthy(PowerState::Unknown)
        }
    }

    /// A driver that cannot be opened.
    pub fn unreachable() -> Self {
        Self {
            open_result: Err(refused()),
            ..Self::broken(refused())
        }
    }

    /// Power calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Last power action applied.
    pub fn last_action(&self) -> Option<PowerAction> {
        self.last_action.lock().ok().and_then(|action| *action)
    }
}

impl Driver for FakeDriver {
    fn connection(&self) -> Option<&dyn Connection> {
        Some(self)
    }

    fn power_state_getter(&self) -> Option<&dyn PowerStateGetter> {
        Some(self)
    }

    fn power_state_setter(&self) -> Option<&dyn PowerStateSetter> {
        Some(self)
    }
}

#[async_trait]
impl Connection for FakeDriver {
    async fn open(&self, _ctx: &OperationContext) -> DriverResult<()> {
        self.open_result.clone()
    }

    async fn close(&self, _ctx: &OperationContext) -> DriverResult<()> {
        Ok(())
    }
}

#[async_trait]
impl PowerStateGetter for FakeDriver {
    async fn power_state(&self, _ctx: &OperationContext) -> DriverResult<PowerState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.power_result.clone()
    }
}

#[async_trait]
impl PowerStateSetter for FakeDriver {
    async fn set_power_state(&self, _ctx: &OperationContext, action: PowerAction) -> DriverResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_action.lock() {
            *last = Some(action);
        }
        self.power_result.clone().map(drop)
    }
}

/// Wraps `driver` in a descriptor advertising connection and power control.
pub fn describe(
    name: &str,
    protocol: Protocol,
    driver: &Arc<FakeDriver>,
) -> eyre::Result<DriverDescriptor> {
    let handle: Arc<dyn Driver> = Arc::clone(driver) as Arc<dyn Driver>;
    Ok(DriverDescriptor::from_handle(DriverName::new(name)?, protocol, handle))
}

/// Transport failure that lets the dispatcher try the next driver.
pub fn refused() -> DriverError {
    DriverError::transport(std::io::Error::other("connection refused"))
}
