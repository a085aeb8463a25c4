//! One trait per capability, plus the [`Driver`] handle that exposes them.

use crate::context::OperationContext;
use crate::driver::domain::{
    BmcResetType, BootOptions, Capability, DriverError, FirmwareImage, HttpsCertAttributes,
    HttpsCertificate, LdapConfig, LdapGroupConfig, NetworkConfig, NtpConfig, PowerAction,
    PowerState, SyslogConfig, UserAccount, UserConfig, UserReconciliation, UserRecord,
};
use async_trait::async_trait;
use bytes::Bytes;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Opens and closes the driver's transport session.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Establishes the session.
    async fn open(&self, ctx: &OperationContext) -> DriverResult<()>;

    /// Tears the session down.
    async fn close(&self, ctx: &OperationContext) -> DriverResult<()>;
}

/// Reads chassis power state.
#[async_trait]
pub trait PowerStateGetter: Send + Sync {
    /// Returns the current power state.
    async fn power_state(&self, ctx: &OperationContext) -> DriverResult<PowerState>;
}

/// Changes chassis power state.
#[async_trait]
pub trait PowerStateSetter: Send + Sync {
    /// Applies `action`.
    async fn set_power_state(&self, ctx: &OperationContext, action: PowerAction)
    -> DriverResult<()>;
}

/// Creates, updates and deletes accounts.
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Creates a new account.
    async fn create_user(&self, ctx: &OperationContext, account: &UserAccount) -> DriverResult<()>;

    /// Updates the password and role of an existing account.
    async fn update_user(&self, ctx: &OperationContext, account: &UserAccount) -> DriverResult<()>;

    /// Deletes an account by name.
    async fn delete_user(&self, ctx: &OperationContext, name: &str) -> DriverResult<()>;
}

/// Lists accounts.
#[async_trait]
pub trait UserReader: Send + Sync {
    /// Returns every account configured on the device.
    async fn read_users(&self, ctx: &OperationContext) -> DriverResult<Vec<UserRecord>>;
}

/// Selects the boot device.
#[async_trait]
pub trait BootDeviceSetter: Send + Sync {
    /// Applies a boot override.
    async fn set_boot_device(&self, ctx: &OperationContext, options: BootOptions)
    -> DriverResult<()>;
}

/// Resets the BMC.
#[async_trait]
pub trait BmcResetter: Send + Sync {
    /// Resets the management controller.
    async fn reset_bmc(&self, ctx: &OperationContext, reset_type: BmcResetType)
    -> DriverResult<()>;
}

/// Reads the BMC firmware version.
#[async_trait]
pub trait BmcVersionGetter: Send + Sync {
    /// Returns the BMC firmware version string.
    async fn bmc_version(&self, ctx: &OperationContext) -> DriverResult<String>;
}

/// Flashes BMC firmware.
#[async_trait]
pub trait BmcFirmwareUpdater: Send + Sync {
    /// Uploads and applies `image`.
    async fn update_bmc_firmware(
        &self,
        ctx: &OperationContext,
        image: &FirmwareImage,
    ) -> DriverResult<()>;
}

/// Reads the BIOS firmware version.
#[async_trait]
pub trait BiosVersionGetter: Send + Sync {
    /// Returns the BIOS version string.
    async fn bios_version(&self, ctx: &OperationContext) -> DriverResult<String>;
}

/// Flashes BIOS firmware.
#[async_trait]
pub trait BiosFirmwareUpdater: Send + Sync {
    /// Uploads and applies `image`.
    async fn update_bios_firmware(
        &self,
        ctx: &OperationContext,
        image: &FirmwareImage,
    ) -> DriverResult<()>;
}

/// Applies a BIOS configuration document.
#[async_trait]
pub trait BiosConfigurator: Send + Sync {
    /// Applies `document` and waits for the vendor job to finish.
    async fn set_bios_configuration(
        &self,
        ctx: &OperationContext,
        document: &str,
    ) -> DriverResult<()>;
}

/// Applies configuration resources through a vendor API.
#[async_trait]
pub trait ResourceConfigurator: Send + Sync {
    /// Reconciles the device's accounts with `users`.
    ///
    /// A failure on one account is recorded in the returned
    /// [`UserReconciliation`] and processing continues with the next.
    async fn configure_users(
        &self,
        ctx: &OperationContext,
        users: &[UserConfig],
    ) -> DriverResult<UserReconciliation>;

    /// Applies remote syslog settings.
    async fn configure_syslog(&self, ctx: &OperationContext, config: &SyslogConfig)
    -> DriverResult<()>;

    /// Applies NTP servers and timezone.
    async fn configure_ntp(&self, ctx: &OperationContext, config: &NtpConfig) -> DriverResult<()>;

    /// Points the device at a directory server.
    async fn configure_ldap(&self, ctx: &OperationContext, config: &LdapConfig) -> DriverResult<()>;

    /// Maps directory groups onto device roles.
    async fn configure_ldap_groups(
        &self,
        ctx: &OperationContext,
        groups: &[LdapGroupConfig],
        ldap: &LdapConfig,
    ) -> DriverResult<()>;

    /// Applies management network switches. Returns whether the device
    /// needs a reset for them to take effect.
    async fn configure_network(
        &self,
        ctx: &OperationContext,
        config: &NetworkConfig,
    ) -> DriverResult<bool>;

    /// Installs a signed HTTPS certificate. Returns whether the device needs
    /// a reset for it to take effect.
    async fn upload_https_cert(
        &self,
        ctx: &OperationContext,
        certificate: &HttpsCertificate,
    ) -> DriverResult<bool>;

    /// Has the device generate a key pair and returns the signing request
    /// for `subject`.
    async fn generate_csr(
        &self,
        ctx: &OperationContext,
        subject: &HttpsCertAttributes,
    ) -> DriverResult<Bytes>;
}

/// Driver handle held by the registry.
///
/// Each accessor returns the interface for one capability, or `None` when
/// the driver does not implement it. Registration checks the accessors
/// against the advertised capability tags, so the two always agree.
pub trait Driver: Send + Sync {
    /// Session management.
    fn connection(&self) -> Option<&dyn Connection> {
        None
    }

    /// Power state reads.
    fn power_state_getter(&self) -> Option<&dyn PowerStateGetter> {
        None
    }

    /// Power state changes.
    fn power_state_setter(&self) -> Option<&dyn PowerStateSetter> {
        None
    }

    /// Account management.
    fn user_manager(&self) -> Option<&dyn UserManager> {
        None
    }

    /// Account listing.
    fn user_reader(&self) -> Option<&dyn UserReader> {
        None
    }

    /// Boot device selection.
    fn boot_device_setter(&self) -> Option<&dyn BootDeviceSetter> {
        None
    }

    /// BMC reset.
    fn bmc_resetter(&self) -> Option<&dyn BmcResetter> {
        None
    }

    /// BMC version reads.
    fn bmc_version_getter(&self) -> Option<&dyn BmcVersionGetter> {
        None
    }

    /// BMC firmware updates.
    fn bmc_firmware_updater(&self) -> Option<&dyn BmcFirmwareUpdater> {
        None
    }

    /// BIOS version reads.
    fn bios_version_getter(&self) -> Option<&dyn BiosVersionGetter> {
        None
    }

    /// BIOS firmware updates.
    fn bios_firmware_updater(&self) -> Option<&dyn BiosFirmwareUpdater> {
        None
    }

    /// BIOS configuration jobs.
    fn bios_configurator(&self) -> Option<&dyn BiosConfigurator> {
        None
    }

    /// Vendor resource configuration.
    fn resource_configurator(&self) -> Option<&dyn ResourceConfigurator> {
        None
    }

    /// Returns whether the driver exposes the interface for `capability`.
    fn exposes(&self, capability: Capability) -> bool {
        match capability {
            Capability::Connection => self.connection().is_some(),
            Capability::PowerStateGet => self.power_state_getter().is_some(),
            Capability::PowerStateSet => self.power_state_setter().is_some(),
            Capability::UserManagement => self.user_manager().is_some(),
            Capability::UserRead => self.user_reader().is_some(),
            Capability::BootDeviceSet => self.boot_device_setter().is_some(),
            Capability::BmcReset => self.bmc_resetter().is_some(),
            Capability::BmcVersionGet => self.bmc_version_getter().is_some(),
            Capability::BmcFirmwareUpdate => self.bmc_firmware_updater().is_some(),
            Capability::BiosVersionGet => self.bios_version_getter().is_some(),
            Capability::BiosFirmwareUpdate => self.bios_firmware_updater().is_some(),
            Capability::BiosConfiguration => self.bios_configurator().is_some(),
            Capability::ResourceConfiguration => self.resource_configurator().is_some(),
        }
    }
}
