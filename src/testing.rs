//! Scripted in-memory drivers shared by unit tests.

use crate::context::OperationContext;
use crate::driver::domain::{DriverError, PowerAction, PowerState};
use crate::driver::ports::{Connection, Driver, DriverResult, PowerStateGetter, PowerStateSetter};
use crate::registry::domain::{DriverDescriptor, DriverName, Protocol};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Driver exposing a session and power control with canned results.
#[derive(Debug)]
pub(crate) struct ScriptedDriver {
    session: bool,
    open_result: DriverResult<()>,
    close_result: DriverResult<()>,
    power_result: DriverResult<PowerState>,
    cancels_context: bool,
    cancels_on_open: bool,
    opens: AtomicUsize,
    closes: AtomicUsize,
    invocations: AtomicUsize,
}

impl ScriptedDriver {
    pub(crate) fn succeeding(state: PowerState) -> Self {
        Self {
            session: true,
            open_result: Ok(()),
            close_result: Ok(()),
            power_result: Ok(state),
            cancels_context: false,
            cancels_on_open: false,
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            invocations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(error: DriverError) -> Self {
        Self {
            power_result: Err(error),
            ..Self::succeeding(PowerState::Unknown)
        }
    }

    pub(crate) fn without_session(mut self) -> Self {
        self.session = false;
        self
    }

    pub(crate) fn failing_open(mut self, error: DriverError) -> Self {
        self.open_result = Err(error);
        self
    }

    pub(crate) fn failing_close(mut self, error: DriverError) -> Self {
        self.close_result = Err(error);
        self
    }

    /// Cancels the caller's context during the power call.
    pub(crate) fn cancelling_context(mut self) -> Self {
        self.cancels_context = true;
        self
    }

    /// Opens successfully, then cancels the caller's context.
    pub(crate) fn cancelling_on_open(mut self) -> Self {
        self.cancels_on_open = true;
        self
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn invoke(&self, ctx: &OperationContext) -> DriverResult<PowerState> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.cancels_context {
            ctx.cancel();
        }
        self.power_result.clone()
    }
}

impl Driver for ScriptedDriver {
    fn connection(&self) -> Option<&dyn Connection> {
        self.session.then_some(self as &dyn Connection)
    }

    fn power_state_getter(&self) -> Option<&dyn PowerStateGetter> {
        Some(self)
    }

    fn power_state_setter(&self) -> Option<&dyn PowerStateSetter> {
        Some(self)
    }
}

#[async_trait]
impl Connection for ScriptedDriver {
    async fn open(&self, ctx: &OperationContext) -> DriverResult<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.cancels_on_open {
            ctx.cancel();
        }
        self.open_result.clone()
    }

    async fn close(&self, _ctx: &OperationContext) -> DriverResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.close_result.clone()
    }
}

#[async_trait]
impl PowerStateGetter for ScriptedDriver {
    async fn power_state(&self, ctx: &OperationContext) -> DriverResult<PowerState> {
        self.invoke(ctx)
    }
}

#[async_trait]
impl PowerStateSetter for ScriptedDriver {
    async fn set_power_state(&self, ctx: &OperationContext, _action: PowerAction) -> DriverResult<()> {
        self.invoke(ctx).map(|_| ())
    }
}

/// Wraps `driver` in a descriptor whose tags come from its interfaces.
pub(crate) fn descriptor(
    raw_name: &str,
    protocol: Protocol,
    driver: &Arc<ScriptedDriver>,
) -> DriverDescriptor {
    let name = DriverName::new(raw_name).expect("test driver name should be valid");
    DriverDescriptor::from_handle(name, protocol, Arc::clone(driver) as Arc<dyn Driver>)
}

/// Transport failure that allows fallback.
pub(crate) fn refused() -> DriverError {
    DriverError::transport(std::io::Error::other("connection refused"))
}
