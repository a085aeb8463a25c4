//! Serde model for client settings.

use crate::job::services::PollerConfig;
use crate::providers::Credentials;
use crate::registry::domain::Protocol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Built-in provider selectable in [`ClientConfig::providers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `ipmitool` over IPMI LAN.
    Ipmitool,
    /// DMTF Redfish over HTTPS.
    Redfish,
    /// Dell `racadm` CLI.
    Racadm,
    /// Dell iDRAC8 web API.
    Idrac8,
}

impl ProviderKind {
    /// Every built-in provider in the default fallback order.
    pub const DEFAULT_ORDER: [Self; 4] = [Self::Ipmitool, Self::Idrac8, Self::Racadm, Self::Redfish];

    /// Returns the registered driver name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipmitool => crate::providers::ipmitool::NAME,
            Self::Redfish => crate::providers::redfish::NAME,
            Self::Racadm => crate::providers::racadm::NAME,
            Self::Idrac8 => crate::providers::idrac8::NAME,
        }
    }

    /// Returns the protocol family the provider speaks.
    #[must_use]
    pub const fn protocol(self) -> Protocol {
        match self {
            Self::Ipmitool => crate::providers::ipmitool::PROTOCOL,
            Self::Redfish => crate::providers::redfish::PROTOCOL,
            Self::Racadm => crate::providers::racadm::PROTOCOL,
            Self::Idrac8 => crate::providers::idrac8::PROTOCOL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider name is not built in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct ParseProviderKindError(pub String);

impl FromStr for ProviderKind {
    type Err = ParseProviderKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::DEFAULT_ORDER
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseProviderKindError(value.to_owned()))
    }
}

/// HTTP settings shared by the Redfish and iDRAC8 providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedfishOptions {
    /// Accept self-signed controller certificates.
    pub insecure_tls: bool,
    /// Per-request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for RedfishOptions {
    fn default() -> Self {
        Self {
            insecure_tls: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Settings for one BMC client.
///
/// ```
/// use bmclink::config::{ClientConfig, ProviderKind};
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{
///         "host": "10.0.0.5",
///         "username": "root",
///         "password": "calvin",
///         "providers": ["redfish", "ipmitool"],
///         "job_poller": { "interval": "10s" }
///     }"#,
/// )
/// .expect("valid settings");
///
/// assert_eq!(config.providers, [ProviderKind::Redfish, ProviderKind::Ipmitool]);
/// assert_eq!(config.job_poller.interval, std::time::Duration::from_secs(10));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host name or IP address of the controller.
    pub host: String,
    /// Port override applied to every provider; each falls back to its
    /// protocol default when unset.
    pub port: Option<u16>,
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Providers in fallback priority order.
    pub providers: Vec<ProviderKind>,
    /// Path or name of the `ipmitool` binary.
    pub ipmitool_path: PathBuf,
    /// Path or name of the `racadm` binary.
    pub racadm_path: PathBuf,
    /// HTTP provider settings.
    pub redfish: RedfishOptions,
    /// Job poller timing for job-based providers.
    pub job_poller: PollerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            username: String::new(),
            password: String::new(),
            providers: ProviderKind::DEFAULT_ORDER.to_vec(),
            ipmitool_path: PathBuf::from("ipmitool"),
            racadm_path: PathBuf::from("racadm"),
            redfish: RedfishOptions::default(),
            job_poller: PollerConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates settings for `host` with every built-in provider.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Replaces the provider order.
    #[must_use]
    pub fn with_providers(mut self, providers: impl IntoIterator<Item = ProviderKind>) -> Self {
        self.providers = providers.into_iter().collect();
        self
    }

    /// Returns the address and login handed to every provider.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("providers", &self.providers)
            .field("ipmitool_path", &self.ipmitool_path)
            .field("racadm_path", &self.racadm_path)
            .field("redfish", &self.redfish)
            .field("job_poller", &self.job_poller)
            .finish()
    }
}
