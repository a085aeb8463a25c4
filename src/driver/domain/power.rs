//! Power state, power action and BMC reset values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Chassis power state reported by a BMC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Machine is powered on.
    On,
    /// Machine is powered off.
    Off,
    /// The BMC answered but the state could not be classified.
    Unknown,
}

impl PowerState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Requested chassis power change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    /// Power on.
    On,
    /// Hard power off.
    Off,
    /// ACPI soft shutdown.
    Soft,
    /// Hard reset.
    Reset,
    /// Power off then on.
    Cycle,
}

impl PowerAction {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Soft => "soft",
            Self::Reset => "reset",
            Self::Cycle => "cycle",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned while parsing a power action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown power action: {0}")]
pub struct ParsePowerActionError(pub String);

impl TryFrom<&str> for PowerAction {
    type Error = ParsePowerActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "soft" => Ok(Self::Soft),
            "reset" => Ok(Self::Reset),
            "cycle" => Ok(Self::Cycle),
            _ => Err(ParsePowerActionError(value.to_owned())),
        }
    }
}

/// Kind of BMC reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmcResetType {
    /// Restart the management controller firmware only.
    Warm,
    /// Full controller reset.
    Cold,
}

impl BmcResetType {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for BmcResetType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
