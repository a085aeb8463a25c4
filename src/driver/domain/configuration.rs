//! Configuration resources applied by vendor configuration adapters.
//!
//! Each record validates its required fields locally. Adapters call
//! `validate` before issuing any request, so a missing field never reaches
//! the wire.

use super::{DriverError, UserRole};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Desired state of one BMC account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Login name.
    pub name: String,
    /// Password, required when `enable` is set.
    pub password: String,
    /// Privilege role.
    pub role: UserRole,
    /// Whether the account should exist and be enabled.
    pub enable: bool,
}

impl UserConfig {
    /// Creates an enabled account entry.
    #[must_use]
    pub fn enabled(name: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            role,
            enable: true,
        }
    }

    /// Creates an entry that disables an existing account.
    #[must_use]
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: String::new(),
            role: UserRole::User,
            enable: false,
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when the name is blank or an
    /// enabled account has no password.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.name.trim().is_empty() {
            return Err(DriverError::validation("user resource requires a name"));
        }
        if self.enable && self.password.is_empty() {
            return Err(DriverError::validation(format!(
                "user resource '{}' is enabled but declares no password",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserConfig")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("enable", &self.enable)
            .finish()
    }
}

/// One account the reconciliation could not apply.
#[derive(Debug, Clone)]
pub struct UserFailure {
    /// Account name from the desired list.
    pub name: String,
    /// Why the account was not applied.
    pub error: DriverError,
}

/// Outcome of a bulk user reconciliation.
///
/// Reconciliation keeps going past individual failures; callers inspect
/// `failures` to learn which entries were not applied.
#[derive(Debug, Clone, Default)]
pub struct UserReconciliation {
    /// Names applied successfully, in request order.
    pub applied: Vec<String>,
    /// Names that failed, in request order.
    pub failures: Vec<UserFailure>,
}

impl UserReconciliation {
    /// Returns whether every entry was applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Remote syslog target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyslogConfig {
    /// Syslog server host.
    pub server: String,
    /// Server port; 514 when unset.
    pub port: Option<u16>,
    /// Whether forwarding is enabled.
    pub enable: bool,
}

impl SyslogConfig {
    /// Default syslog port.
    pub const DEFAULT_PORT: u16 = 514;

    /// Returns the configured port or the syslog default.
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(Self::DEFAULT_PORT)
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when the server is blank.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.server.trim().is_empty() {
            return Err(DriverError::validation(
                "syslog resource requires parameter: server",
            ));
        }
        Ok(())
    }
}

/// NTP servers and timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtpConfig {
    /// Whether NTP synchronisation is enabled.
    pub enable: bool,
    /// Primary server.
    pub server1: String,
    /// Secondary server.
    #[serde(default)]
    pub server2: String,
    /// Tertiary server.
    #[serde(default)]
    pub server3: String,
    /// Timezone name, for example `CET`.
    pub timezone: String,
}

impl NtpConfig {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when `server1` or `timezone` is
    /// blank.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.server1.trim().is_empty() {
            return Err(DriverError::validation(
                "NTP resource requires parameter: server1",
            ));
        }
        if self.timezone.trim().is_empty() {
            return Err(DriverError::validation(
                "NTP resource requires parameter: timezone",
            ));
        }
        Ok(())
    }
}

/// Directory service settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LdapConfig {
    /// LDAP server host.
    pub server: String,
    /// LDAP server port.
    pub port: Option<u16>,
    /// Base DN for user lookups.
    pub base_dn: String,
    /// Attribute holding the login name.
    pub user_attribute: String,
    /// Attribute holding group membership.
    pub group_attribute: String,
    /// Optional bind DN.
    pub bind_dn: Option<String>,
    /// User search filter.
    pub search_filter: String,
}

impl LdapConfig {
    /// Checks the fields needed to point the BMC at a directory server.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when the server or search filter is
    /// blank.
    pub fn validate_server(&self) -> Result<(), DriverError> {
        if self.server.trim().is_empty() {
            return Err(DriverError::validation(
                "LDAP resource parameter \"server\" required but not declared",
            ));
        }
        if self.search_filter.trim().is_empty() {
            return Err(DriverError::validation(
                "LDAP resource parameter \"search_filter\" required but not declared",
            ));
        }
        Ok(())
    }

    /// Checks the fields needed to map directory groups onto BMC roles and
    /// returns the validated port.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when the port, base DN, user
    /// attribute or group attribute is missing.
    pub fn validate_group_mapping(&self) -> Result<u16, DriverError> {
        let port = self
            .port
            .filter(|port| *port != 0)
            .ok_or_else(|| DriverError::validation("LDAP resource parameter \"port\" is required"))?;
        let required = [
            ("base_dn", &self.base_dn),
            ("user_attribute", &self.user_attribute),
            ("group_attribute", &self.group_attribute),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DriverError::validation(format!(
                    "LDAP resource parameter \"{field}\" is required"
                )));
            }
        }
        Ok(port)
    }
}

/// Mapping of one directory group onto a BMC role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapGroupConfig {
    /// Group RDN, for example `cn=admins`.
    pub group: String,
    /// Base DN the group lives under.
    pub group_base_dn: String,
    /// Role name; `admin` or `user`. Blank entries are skipped.
    pub role: String,
    /// Disabled groups are skipped.
    pub enable: bool,
}

/// Management network switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Take DNS settings from DHCP.
    pub dns_from_dhcp: bool,
    /// Enable IPMI over LAN.
    pub ipmi_enable: bool,
    /// Enable serial over LAN.
    pub sol_enable: bool,
}

/// Signed x509 certificate for the BMC web server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpsCertificate {
    /// File name sent with the upload.
    pub file_name: String,
    /// PEM encoded certificate.
    pub data: Bytes,
}

impl HttpsCertificate {
    /// Creates a certificate payload.
    #[must_use]
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when the certificate is empty.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.data.is_empty() {
            return Err(DriverError::validation("HTTPS certificate payload is empty"));
        }
        Ok(())
    }
}

/// Subject fields for a certificate signing request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpsCertAttributes {
    /// Subject common name, usually the BMC host name.
    pub common_name: String,
    /// Organisation.
    pub organization_name: String,
    /// Organisational unit.
    pub organization_unit: String,
    /// City or locality.
    pub locality: String,
    /// State or province.
    pub state_name: String,
    /// Two-letter ISO country code.
    pub country_code: String,
    /// Contact address.
    pub email: String,
    /// Subject alternative name.
    pub subject_alt_name: String,
}

impl HttpsCertAttributes {
    /// Subject fields in the order signing requests list them.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("common_name", &self.common_name),
            ("organization_name", &self.organization_name),
            ("organization_unit", &self.organization_unit),
            ("locality", &self.locality),
            ("state_name", &self.state_name),
            ("country_code", &self.country_code),
            ("email", &self.email),
            ("subject_alt_name", &self.subject_alt_name),
        ]
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when the common name is blank,
    /// the country code is not two letters, or a field contains a comma.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.common_name.trim().is_empty() {
            return Err(DriverError::validation(
                "certificate attribute \"common_name\" is required",
            ));
        }
        let country = self.country_code.as_bytes();
        if country.len() != 2 || !country.iter().all(u8::is_ascii_alphabetic) {
            return Err(DriverError::validation(format!(
                "certificate country code '{}' must be two letters",
                self.country_code
            )));
        }
        if let Some((field, _)) = self.fields().into_iter().find(|(_, value)| value.contains(',')) {
            return Err(DriverError::validation(format!(
                "certificate attribute \"{field}\" must not contain ','"
            )));
        }
        Ok(())
    }
}
