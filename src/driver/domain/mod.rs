//! Domain model for driver capabilities and BMC operation values.
//!
//! These types carry no transport concerns: providers translate them into
//! CLI arguments, Redfish bodies or vendor query strings.

mod boot;
mod capability;
mod configuration;
mod error;
mod firmware;
mod power;
mod user;

pub use boot::{BootDevice, BootOptions};
pub use capability::{Capability, CapabilitySet, ParseCapabilityError};
pub use configuration::{
    HttpsCertAttributes, HttpsCertificate, LdapConfig, LdapGroupConfig, NetworkConfig, NtpConfig,
    SyslogConfig, UserConfig, UserFailure, UserReconciliation,
};
pub use error::DriverError;
pub use firmware::FirmwareImage;
pub use power::{BmcResetType, ParsePowerActionError, PowerAction, PowerState};
pub use user::{ParseUserRoleError, UserAccount, UserRecord, UserRole};
