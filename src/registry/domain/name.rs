//! Driver names and protocol families.

use super::{ParseProtocolError, RegistryError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable driver name, for example `ipmitool` or `idrac8`.
///
/// Names need not be unique; two drivers of one protocol family may share
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverName(String);

impl DriverName {
    /// Creates a validated driver name. The input is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDriverName`] when the value is empty
    /// after trimming or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidDriverName(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DriverName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DriverName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Transport family a driver speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// IPMI over LAN.
    Ipmi,
    /// DMTF Redfish.
    Redfish,
    /// Vendor-specific HTTP API.
    VendorApi,
    /// Vendor command line tool.
    Cli,
}

impl Protocol {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipmi => "ipmi",
            Self::Redfish => "redfish",
            Self::VendorApi => "vendorapi",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Protocol {
    type Error = ParseProtocolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ipmi" => Ok(Self::Ipmi),
            "redfish" => Ok(Self::Redfish),
            "vendorapi" => Ok(Self::VendorApi),
            "cli" => Ok(Self::Cli),
            _ => Err(ParseProtocolError(value.to_owned())),
        }
    }
}
