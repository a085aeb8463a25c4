//! Capability-oriented BMC client.

use super::dispatcher::{DriverFuture, dispatch};
use crate::context::OperationContext;
use crate::dispatch::domain::{DispatchError, ExecutionMetadata};
use crate::driver::domain::{
    BmcResetType, BootOptions, Capability, FirmwareImage, HttpsCertAttributes, HttpsCertificate,
    LdapConfig, LdapGroupConfig, NetworkConfig, NtpConfig, PowerAction, PowerState, SyslogConfig,
    UserAccount, UserConfig, UserReconciliation, UserRecord,
};
use bytes::Bytes;
use crate::driver::ports::Driver;
use crate::registry::domain::{DriverName, Protocol};
use crate::registry::services::Registry;

/// One BMC reached through an ordered set of drivers.
///
/// Every operation accepts an optional metadata sink. When supplied it is
/// overwritten with the [`ExecutionMetadata`] of that call, success or
/// failure.
///
/// Until [`BmcClient::open`] runs, operations dispatch over every declared
/// driver. `open` narrows the set to the drivers that opened; it takes
/// `&mut self`, so it cannot race with in-flight operations.
#[derive(Debug, Clone)]
pub struct BmcClient {
    declared: Registry,
    active: Registry,
}

impl BmcClient {
    /// Creates a client over `registry`.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            active: registry.clone(),
            declared: registry,
        }
    }

    /// Returns every declared driver.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.declared
    }

    /// Returns the drivers operations currently dispatch over.
    #[must_use]
    pub const fn active(&self) -> &Registry {
        &self.active
    }

    /// Narrows the client to drivers of one protocol family.
    #[must_use]
    pub fn using(&self, protocol: Protocol) -> Self {
        Self::new(self.declared.using(protocol))
    }

    /// Opens every declared driver and keeps the ones that opened.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] when the context ends or no driver
    /// opens. The active set is left unchanged on error.
    pub async fn open(
        &mut self,
        ctx: &OperationContext,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<Vec<DriverName>, DispatchError> {
        let mut metadata = ExecutionMetadata::new();
        let result = self.declared.open(ctx, &mut metadata).await;
        deliver(sink, metadata);
        self.active = result?;
        Ok(self
            .active
            .drivers()
            .iter()
            .map(|descriptor| descriptor.name().clone())
            .collect())
    }

    /// Closes every active driver, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] naming the first driver that
    /// failed to close.
    pub async fn close(
        &self,
        ctx: &OperationContext,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        let mut metadata = ExecutionMetadata::new();
        let result = self.active.close(ctx, &mut metadata).await;
        deliver(sink, metadata);
        Ok(result?)
    }

    async fn run<'a, T, F>(
        &'a self,
        ctx: &OperationContext,
        capability: Capability,
        sink: Option<&mut ExecutionMetadata>,
        invoke: F,
    ) -> Result<T, DispatchError>
    where
        F: FnMut(&'a dyn Driver) -> Option<DriverFuture<'a, T>>,
    {
        let mut metadata = ExecutionMetadata::new();
        let result = dispatch(ctx, &self.active, capability, &mut metadata, invoke).await;
        deliver(sink, metadata);
        result
    }

    /// Reads chassis power state.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn power_state(
        &self,
        ctx: &OperationContext,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<PowerState, DispatchError> {
        self.run(ctx, Capability::PowerStateGet, sink, |driver| {
            driver
                .power_state_getter()
                .map(|getter| getter.power_state(ctx))
        })
        .await
    }

    /// Applies a power action.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn set_power_state(
        &self,
        ctx: &OperationContext,
        action: PowerAction,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::PowerStateSet, sink, |driver| {
            driver
                .power_state_setter()
                .map(|setter| setter.set_power_state(ctx, action))
        })
        .await
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn create_user(
        &self,
        ctx: &OperationContext,
        account: &UserAccount,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::UserManagement, sink, |driver| {
            driver
                .user_manager()
                .map(|manager| manager.create_user(ctx, account))
        })
        .await
    }

    /// Updates an account's password and role.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn update_user(
        &self,
        ctx: &OperationContext,
        account: &UserAccount,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::UserManagement, sink, |driver| {
            driver
                .user_manager()
                .map(|manager| manager.update_user(ctx, account))
        })
        .await
    }

    /// Deletes an account by name.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn delete_user(
        &self,
        ctx: &OperationContext,
        name: &str,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::UserManagement, sink, |driver| {
            driver
                .user_manager()
                .map(|manager| manager.delete_user(ctx, name))
        })
        .await
    }

    /// Lists accounts.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn read_users(
        &self,
        ctx: &OperationContext,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<Vec<UserRecord>, DispatchError> {
        self.run(ctx, Capability::UserRead, sink, |driver| {
            driver.user_reader().map(|reader| reader.read_users(ctx))
        })
        .await
    }

    /// Sets the boot device.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn set_boot_device(
        &self,
        ctx: &OperationContext,
        options: BootOptions,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::BootDeviceSet, sink, |driver| {
            driver
                .boot_device_setter()
                .map(|setter| setter.set_boot_device(ctx, options))
        })
        .await
    }

    /// Resets the BMC.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn reset_bmc(
        &self,
        ctx: &OperationContext,
        reset_type: BmcResetType,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::BmcReset, sink, |driver| {
            driver
                .bmc_resetter()
                .map(|resetter| resetter.reset_bmc(ctx, reset_type))
        })
        .await
    }

    /// Reads the BMC firmware version.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn bmc_version(
        &self,
        ctx: &OperationContext,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<String, DispatchError> {
        self.run(ctx, Capability::BmcVersionGet, sink, |driver| {
            driver
                .bmc_version_getter()
                .map(|getter| getter.bmc_version(ctx))
        })
        .await
    }

    /// Reads the BIOS version.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn bios_version(
        &self,
        ctx: &OperationContext,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<String, DispatchError> {
        self.run(ctx, Capability::BiosVersionGet, sink, |driver| {
            driver
                .bios_version_getter()
                .map(|getter| getter.bios_version(ctx))
        })
        .await
    }

    /// Flashes BMC firmware. Each candidate receives the whole image.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn update_bmc_firmware(
        &self,
        ctx: &OperationContext,
        image: &FirmwareImage,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::BmcFirmwareUpdate, sink, |driver| {
            driver
                .bmc_firmware_updater()
                .map(|updater| updater.update_bmc_firmware(ctx, image))
        })
        .await
    }

    /// Flashes BIOS firmware. Each candidate receives the whole image.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn update_bios_firmware(
        &self,
        ctx: &OperationContext,
        image: &FirmwareImage,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::BiosFirmwareUpdate, sink, |driver| {
            driver
                .bios_firmware_updater()
                .map(|updater| updater.update_bios_firmware(ctx, image))
        })
        .await
    }

    /// Applies a BIOS configuration document through a vendor job.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn set_bios_configuration(
        &self,
        ctx: &OperationContext,
        document: &str,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::BiosConfiguration, sink, |driver| {
            driver
                .bios_configurator()
                .map(|configurator| configurator.set_bios_configuration(ctx, document))
        })
        .await
    }

    /// Reconciles accounts with `users`. Per-account failures are reported
    /// in the returned [`UserReconciliation`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn configure_users(
        &self,
        ctx: &OperationContext,
        users: &[UserConfig],
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<UserReconciliation, DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.configure_users(ctx, users))
        })
        .await
    }

    /// Applies remote syslog settings.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn configure_syslog(
        &self,
        ctx: &OperationContext,
        config: &SyslogConfig,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.configure_syslog(ctx, config))
        })
        .await
    }

    /// Applies NTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn configure_ntp(
        &self,
        ctx: &OperationContext,
        config: &NtpConfig,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.configure_ntp(ctx, config))
        })
        .await
    }

    /// Points the BMC at a directory server.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn configure_ldap(
        &self,
        ctx: &OperationContext,
        config: &LdapConfig,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.configure_ldap(ctx, config))
        })
        .await
    }

    /// Maps directory groups onto BMC roles.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn configure_ldap_groups(
        &self,
        ctx: &OperationContext,
        groups: &[LdapGroupConfig],
        ldap: &LdapConfig,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<(), DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.configure_ldap_groups(ctx, groups, ldap))
        })
        .await
    }

    /// Applies management network switches. Returns whether a BMC reset is
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn configure_network(
        &self,
        ctx: &OperationContext,
        config: &NetworkConfig,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<bool, DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.configure_network(ctx, config))
        })
        .await
    }

    /// Installs an HTTPS certificate. Returns whether a BMC reset is needed.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn upload_https_cert(
        &self,
        ctx: &OperationContext,
        certificate: &HttpsCertificate,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<bool, DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.upload_https_cert(ctx, certificate))
        })
        .await
    }

    /// Asks the BMC for a certificate signing request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when no driver served the request.
    pub async fn generate_csr(
        &self,
        ctx: &OperationContext,
        subject: &HttpsCertAttributes,
        sink: Option<&mut ExecutionMetadata>,
    ) -> Result<Bytes, DispatchError> {
        self.run(ctx, Capability::ResourceConfiguration, sink, |driver| {
            driver
                .resource_configurator()
                .map(|configurator| configurator.generate_csr(ctx, subject))
        })
        .await
    }
}

fn deliver(sink: Option<&mut ExecutionMetadata>, metadata: ExecutionMetadata) {
    if let Some(target) = sink {
        *target = metadata;
    }
}
