//! IPMI over LAN through the `ipmitool` binary.

use super::Credentials;
use super::status::ensure_exit;
use crate::context::OperationContext;
use crate::driver::domain::{
    BmcResetType, BootDevice, BootOptions, Capability, CapabilitySet, DriverError, PowerAction,
    PowerState,
};
use crate::driver::ports::{
    BmcResetter, BootDeviceSetter, Connection, Driver, DriverResult, PowerStateGetter,
    PowerStateSetter,
};
use crate::registry::domain::{DriverDescriptor, DriverName, Protocol, RegistryError};
use crate::transport::ports::CommandExecutor;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Registered driver name.
pub const NAME: &str = "ipmitool";
/// Protocol family.
pub const PROTOCOL: Protocol = Protocol::Ipmi;
/// Advertised capabilities.
pub const CAPABILITIES: [Capability; 5] = [
    Capability::Connection,
    Capability::PowerStateGet,
    Capability::PowerStateSet,
    Capability::BootDeviceSet,
    Capability::BmcReset,
];
/// RMCP+ port used when the credentials carry no override.
pub const DEFAULT_PORT: u16 = 623;

/// Driver that shells out to `ipmitool -I lanplus`.
pub struct Ipmitool {
    executor: Arc<dyn CommandExecutor>,
    credentials: Credentials,
}

impl Ipmitool {
    /// Creates the driver. `executor` must run the `ipmitool` binary.
    #[must_use]
    pub fn new(executor: Arc<dyn CommandExecutor>, credentials: Credentials) -> Self {
        Self {
            executor,
            credentials,
        }
    }

    /// Wraps the driver in a registry descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapabilityMismatch`] if the advertised tags
    /// drift from the implemented interfaces.
    pub fn descriptor(self) -> Result<DriverDescriptor, RegistryError> {
        DriverDescriptor::new(
            DriverName::new(NAME)?,
            PROTOCOL,
            CapabilitySet::new(CAPABILITIES),
            Arc::new(self),
        )
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "-I".to_owned(),
            "lanplus".to_owned(),
            "-H".to_owned(),
            self.credentials.host.clone(),
            "-p".to_owned(),
            self.credentials.port_or(DEFAULT_PORT).to_string(),
            "-U".to_owned(),
            self.credentials.username.clone(),
            "-P".to_owned(),
            self.credentials.password.clone(),
        ]
    }

    async fn execute(&self, ctx: &OperationContext, command: &[&str]) -> DriverResult<String> {
        let label = command.join(" ");
        let mut args = self.base_args();
        args.extend(command.iter().map(|part| (*part).to_owned()));
        debug!(host = %self.credentials.host, command = %label, "ipmitool call");
        let output = self.executor.run(ctx, &args).await?;
        ensure_exit(&label, &output)?;
        Ok(output.stdout)
    }
}

impl std::fmt::Debug for Ipmitool {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Ipmitool")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Reads `Chassis Power is on|off`.
fn parse_power_status(output: &str) -> DriverResult<PowerState> {
    let normalized = output.to_ascii_lowercase();
    if normalized.contains("is on") {
        Ok(PowerState::On)
    } else if normalized.contains("is off") {
        Ok(PowerState::Off)
    } else {
        Err(DriverError::Parse(format!(
            "no power state in ipmitool output: {}",
            output.trim()
        )))
    }
}

const fn boot_device_arg(device: BootDevice) -> &'static str {
    match device {
        BootDevice::Pxe => "pxe",
        BootDevice::Disk => "disk",
        BootDevice::Cdrom => "cdrom",
        BootDevice::BiosSetup => "bios",
        BootDevice::None => "none",
    }
}

const fn boot_options_arg(options: BootOptions) -> Option<&'static str> {
    match (options.persistent, options.efi) {
        (true, true) => Some("options=persistent,efiboot"),
        (true, false) => Some("options=persistent"),
        (false, true) => Some("options=efiboot"),
        (false, false) => None,
    }
}

impl Driver for Ipmitool {
    fn connection(&self) -> Option<&dyn Connection> {
        Some(self)
    }

    fn power_state_getter(&self) -> Option<&dyn PowerStateGetter> {
        Some(self)
    }

    fn power_state_setter(&self) -> Option<&dyn PowerStateSetter> {
        Some(self)
    }

    fn boot_device_setter(&self) -> Option<&dyn BootDeviceSetter> {
        Some(self)
    }

    fn bmc_resetter(&self) -> Option<&dyn BmcResetter> {
        Some(self)
    }
}

#[async_trait]
impl Connection for Ipmitool {
    /// Probes the controller with `mc info`; ipmitool keeps no session
    /// between calls.
    async fn open(&self, ctx: &OperationContext) -> DriverResult<()> {
        self.execute(ctx, &["mc", "info"]).await.map(drop)
    }

    async fn close(&self, _ctx: &OperationContext) -> DriverResult<()> {
        Ok(())
    }
}

#[async_trait]
impl PowerStateGetter for Ipmitool {
    async fn power_state(&self, ctx: &OperationContext) -> DriverResult<PowerState> {
        let output = self.execute(ctx, &["chassis", "power", "status"]).await?;
        parse_power_status(&output)
    }
}

#[async_trait]
impl PowerStateSetter for Ipmitool {
    async fn set_power_state(&self, ctx: &OperationContext, action: PowerAction) -> DriverResult<()> {
        self.execute(ctx, &["chassis", "power", action.as_str()])
            .await
            .map(drop)
    }
}

#[async_trait]
impl BootDeviceSetter for Ipmitool {
    async fn set_boot_device(&self, ctx: &OperationContext, options: BootOptions) -> DriverResult<()> {
        let mut command = vec!["chassis", "bootdev", boot_device_arg(options.device)];
        command.extend(boot_options_arg(options));
        self.execute(ctx, &command).await.map(drop)
    }
}

#[async_trait]
impl BmcResetter for Ipmitool {
    async fn reset_bmc(&self, ctx: &OperationContext, reset_type: BmcResetType) -> DriverResult<()> {
        self.execute(ctx, &["mc", "reset", reset_type.as_str()])
            .await
            .map(drop)
    }
}
