//! DMTF Redfish over HTTPS.

use super::status::{OK, SUCCESS, ensure_status};
use crate::context::OperationContext;
use crate::driver::domain::{
    BmcResetType, BootDevice, BootOptions, Capability, CapabilitySet, DriverError, FirmwareImage,
    PowerAction, PowerState, UserAccount, UserRecord, UserRole,
};
use crate::driver::ports::{
    BiosFirmwareUpdater, BiosVersionGetter, BmcFirmwareUpdater, BmcResetter, BmcVersionGetter,
    BootDeviceSetter, Connection, Driver, DriverResult, PowerStateGetter, PowerStateSetter,
    UserManager, UserReader,
};
use crate::registry::domain::{DriverDescriptor, DriverName, Protocol, RegistryError};
use crate::transport::ports::{HttpBody, HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;

/// Registered driver name.
pub const NAME: &str = "redfish";
/// Protocol family.
pub const PROTOCOL: Protocol = Protocol::Redfish;
/// Advertised capabilities.
pub const CAPABILITIES: [Capability; 11] = [
    Capability::Connection,
    Capability::PowerStateGet,
    Capability::PowerStateSet,
    Capability::UserManagement,
    Capability::UserRead,
    Capability::BootDeviceSet,
    Capability::BmcReset,
    Capability::BmcVersionGet,
    Capability::BmcFirmwareUpdate,
    Capability::BiosVersionGet,
    Capability::BiosFirmwareUpdate,
];
/// HTTPS port used when the credentials carry no override.
pub const DEFAULT_PORT: u16 = 443;

const SERVICE_ROOT: &str = "redfish/v1";
const ACCOUNTS: &str = "redfish/v1/AccountService/Accounts";
const UPDATE_SERVICE: &str = "redfish/v1/UpdateService";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ComputerSystem {
    power_state: Option<String>,
    bios_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Manager {
    firmware_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateService {
    http_push_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Collection {
    #[serde(default)]
    members: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@odata.id")]
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Account {
    id: String,
    #[serde(default)]
    user_name: String,
    role_id: Option<String>,
    #[serde(default)]
    enabled: bool,
}

/// Redfish driver bound to one system and one manager resource.
pub struct Redfish {
    transport: Arc<dyn HttpTransport>,
    system: String,
    manager: String,
}

impl Redfish {
    /// Creates the driver against `Systems/1` and `Managers/1`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            system: format!("{SERVICE_ROOT}/Systems/1"),
            manager: format!("{SERVICE_ROOT}/Managers/1"),
        }
    }

    /// Targets a different computer system resource.
    #[must_use]
    pub fn with_system(mut self, path: impl Into<String>) -> Self {
        self.system = path.into();
        self
    }

    /// Targets a different manager resource.
    #[must_use]
    pub fn with_manager(mut self, path: impl Into<String>) -> Self {
        self.manager = path.into();
        self
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

    async fn exchange(
        &self,
        ctx: &OperationContext,
        request: HttpRequest,
        expected: RangeInclusive<u16>,
    ) -> DriverResult<HttpResponse> {
        let endpoint = request.path.clone();
        debug!(method = ?request.method, endpoint = %endpoint, "redfish request");
        let response = self.transport.send(ctx, request).await?;
        ensure_status(&endpoint, &response, expected)?;
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, ctx: &OperationContext, path: &str) -> DriverResult<T> {
        let response = self.exchange(ctx, HttpRequest::get(path), OK).await?;
        response
            .json()
            .map_err(|err| DriverError::Protocol(format!("{path}: {err}")))
    }

    async fn accounts(&self, ctx: &OperationContext) -> DriverResult<Vec<Account>> {
        let collection: Collection = self.fetch(ctx, ACCOUNTS).await?;
        let mut accounts = Vec::with_capacity(collection.members.len());
        for member in collection.members {
            let account: Account = self.fetch(ctx, &member.id).await?;
            accounts.push(account);
        }
        Ok(accounts)
    }

    /// Returns the resource path of the account named `name`.
    async fn account_path(&self, ctx: &OperationContext, name: &str) -> DriverResult<String> {
        let collection: Collection = self.fetch(ctx, ACCOUNTS).await?;
        for member in collection.members {
            let account: Account = self.fetch(ctx, &member.id).await?;
            if account.user_name == name {
                return Ok(member.id);
            }
        }
        Err(DriverError::Protocol(format!("no account named '{name}'")))
    }

    async fn push_firmware(&self, ctx: &OperationContext, image: &FirmwareImage) -> DriverResult<()> {
        let service: UpdateService = self
            .fetch(ctx, UPDATE_SERVICE)
            .await
            .map_err(|err| err.in_step("discover update service"))?;
        let push_uri = service.http_push_uri.ok_or_else(|| {
            DriverError::Protocol("UpdateService has no HttpPushUri".to_owned())
                .in_step("discover update service")
        })?;
        debug!(endpoint = %push_uri, size = image.size(), "pushing firmware image");
        let body = HttpBody::Binary {
            content_type: "application/octet-stream".to_owned(),
            data: image.bytes(),
        };
        self.exchange(ctx, HttpRequest::post(push_uri, body), SUCCESS)
            .await
            .map_err(|err| err.in_step("push firmware image"))
            .map(drop)
    }
}

impl std::fmt::Debug for Redfish {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Redfish")
            .field("system", &self.system)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

const fn reset_type(action: PowerAction) -> &'static str {
    match action {
        PowerAction::On => "On",
        PowerAction::Off => "ForceOff",
        PowerAction::Soft => "GracefulShutdown",
        PowerAction::Reset => "ForceRestart",
        PowerAction::Cycle => "PowerCycle",
    }
}

const fn boot_target(device: BootDevice) -> &'static str {
    match device {
        BootDevice::Pxe => "Pxe",
        BootDevice::Disk => "Hdd",
        BootDevice::Cdrom => "Cd",
        BootDevice::BiosSetup => "BiosSetup",
        BootDevice::None => "None",
    }
}

const fn role_id(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Administrator",
        UserRole::User => "Operator",
    }
}

fn boot_override(options: BootOptions) -> serde_json::Value {
    let enabled = match (options.device, options.persistent) {
        (BootDevice::None, _) => "Disabled",
        (_, true) => "Continuous",
        (_, false) => "Once",
    };
    let mode = if options.efi { "UEFI" } else { "Legacy" };
    json!({
        "Boot": {
            "BootSourceOverrideEnabled": enabled,
            "BootSourceOverrideTarget": boot_target(options.device),
            "BootSourceOverrideMode": mode,
        }
    })
}

impl Driver for Redfish {
    fn connection(&self) -> Option<&dyn Connection> {
        Some(self)
    }

    fn power_state_getter(&self) -> Option<&dyn PowerStateGetter> {
        Some(self)
    }

    fn power_state_setter(&self) -> Option<&dyn PowerStateSetter> {
        Some(self)
    }

    fn user_manager(&self) -> Option<&dyn UserManager> {
        Some(self)
    }

    fn user_reader(&self) -> Option<&dyn UserReader> {
        Some(self)
    }

    fn boot_device_setter(&self) -> Option<&dyn BootDeviceSetter> {
        Some(self)
    }

    fn bmc_resetter(&self) -> Option<&dyn BmcResetter> {
        Some(self)
    }

    fn bmc_version_getter(&self) -> Option<&dyn BmcVersionGetter> {
        Some(self)
    }

    fn bmc_firmware_updater(&self) -> Option<&dyn BmcFirmwareUpdater> {
        Some(self)
    }

    fn bios_version_getter(&self) -> Option<&dyn BiosVersionGetter> {
        Some(self)
    }

    fn bios_firmware_updater(&self) -> Option<&dyn BiosFirmwareUpdater> {
        Some(self)
    }
}

#[async_trait]
impl Connection for Redfish {
    /// Reads the service root. Requests authenticate individually, so
    /// there is no session to tear down.
    async fn open(&self, ctx: &OperationContext) -> DriverResult<()> {
        self.exchange(ctx, HttpRequest::get(SERVICE_ROOT), OK)
            .await
            .map(drop)
    }

    async fn close(&self, _ctx: &OperationContext) -> DriverResult<()> {
        Ok(())
    }
}

#[async_trait]
impl PowerStateGetter for Redfish {
    async fn power_state(&self, ctx: &OperationContext) -> DriverResult<PowerState> {
        let system: ComputerSystem = self.fetch(ctx, &self.system).await?;
        match system.power_state.as_deref() {
            Some("On") => Ok(PowerState::On),
            Some("Off") => Ok(PowerState::Off),
            Some(_) => Ok(PowerState::Unknown),
            None => Err(DriverError::Protocol(format!(
                "{} has no PowerState",
                self.system
            ))),
        }
    }
}

#[async_trait]
impl PowerStateSetter for Redfish {
    async fn set_power_state(&self, ctx: &OperationContext, action: PowerAction) -> DriverResult<()> {
        let path = format!("{}/Actions/ComputerSystem.Reset", self.system);
        let body = HttpBody::Json(json!({ "ResetType": reset_type(action) }));
        self.exchange(ctx, HttpRequest::post(path, body), SUCCESS)
            .await
            .map(drop)
    }
}

#[async_trait]
impl BootDeviceSetter for Redfish {
    async fn set_boot_device(&self, ctx: &OperationContext, options: BootOptions) -> DriverResult<()> {
        let body = HttpBody::Json(boot_override(options));
        self.exchange(ctx, HttpRequest::patch(self.system.as_str(), body), SUCCESS)
            .await
            .map(drop)
    }
}

#[async_trait]
impl BmcResetter for Redfish {
    async fn reset_bmc(&self, ctx: &OperationContext, reset_type: BmcResetType) -> DriverResult<()> {
        let kind = match reset_type {
            BmcResetType::Warm => "GracefulRestart",
            BmcResetType::Cold => "ForceRestart",
        };
        let path = format!("{}/Actions/Manager.Reset", self.manager);
        let body = HttpBody::Json(json!({ "ResetType": kind }));
        self.exchange(ctx, HttpRequest::post(path, body), SUCCESS)
            .await
            .map(drop)
    }
}

#[async_trait]
impl BmcVersionGetter for Redfish {
    async fn bmc_version(&self, ctx: &OperationContext) -> DriverResult<String> {
        let manager: Manager = self.fetch(ctx, &self.manager).await?;
        manager
            .firmware_version
            .ok_or_else(|| DriverError::Protocol(format!("{} has no FirmwareVersion", self.manager)))
    }
}

#[async_trait]
impl BiosVersionGetter for Redfish {
    async fn bios_version(&self, ctx: &OperationContext) -> DriverResult<String> {
        let system: ComputerSystem = self.fetch(ctx, &self.system).await?;
        system
            .bios_version
            .ok_or_else(|| DriverError::Protocol(format!("{} has no BiosVersion", self.system)))
    }
}

#[async_trait]
impl BmcFirmwareUpdater for Redfish {
    async fn update_bmc_firmware(
        &self,
        ctx: &OperationContext,
        image: &FirmwareImage,
    ) -> DriverResult<()> {
        self.push_firmware(ctx, image).await
    }
}

#[async_trait]
impl BiosFirmwareUpdater for Redfish {
    async fn update_bios_firmware(
        &self,
        ctx: &OperationContext,
        image: &FirmwareImage,
    ) -> DriverResult<()> {
        self.push_firmware(ctx, image).await
    }
}

#[async_trait]
impl UserReader for Redfish {
    async fn read_users(&self, ctx: &OperationContext) -> DriverResult<Vec<UserRecord>> {
        let accounts = self.accounts(ctx).await?;
        Ok(accounts
            .into_iter()
            .filter(|account| !account.user_name.is_empty())
            .map(|account| UserRecord {
                id: account.id,
                name: account.user_name,
                role: account.role_id,
                enabled: account.enabled,
            })
            .collect())
    }
}

#[async_trait]
impl UserManager for Redfish {
    async fn create_user(&self, ctx: &OperationContext, account: &UserAccount) -> DriverResult<()> {
        let body = HttpBody::Json(json!({
            "UserName": account.name,
            "Password": account.password,
            "RoleId": role_id(account.role),
            "Enabled": true,
        }));
        self.exchange(ctx, HttpRequest::post(ACCOUNTS, body), SUCCESS)
            .await
            .map(drop)
    }

    async fn update_user(&self, ctx: &OperationContext, account: &UserAccount) -> DriverResult<()> {
        let path = self.account_path(ctx, &account.name).await?;
        let body = HttpBody::Json(json!({
            "Password": account.password,
            "RoleId": role_id(account.role),
        }));
        self.exchange(ctx, HttpRequest::patch(path, body), SUCCESS)
            .await
            .map(drop)
    }

    async fn delete_user(&self, ctx: &OperationContext, name: &str) -> DriverResult<()> {
        let path = self.account_path(ctx, name).await?;
        self.exchange(ctx, HttpRequest::delete(path), SUCCESS)
            .await
            .map(drop)
    }
}
