//! Capability tags and capability sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A named operation family a driver may implement.
///
/// Drivers advertise their tags at registration; the dispatcher selects
/// candidates by set membership and never invokes a capability a driver did
/// not advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Open and close a transport session.
    Connection,
    /// Read chassis power state.
    PowerStateGet,
    /// Change chassis power state.
    PowerStateSet,
    /// Create, update and delete BMC user accounts.
    UserManagement,
    /// List BMC user accounts.
    UserRead,
    /// Select the next boot device.
    BootDeviceSet,
    /// Reset the BMC itself.
    BmcReset,
    /// Read the BMC firmware version.
    BmcVersionGet,
    /// Flash BMC firmware.
    BmcFirmwareUpdate,
    /// Read the BIOS firmware version.
    BiosVersionGet,
    /// Flash BIOS firmware.
    BiosFirmwareUpdate,
    /// Apply a BIOS configuration document through a vendor job.
    BiosConfiguration,
    /// Apply user, syslog, NTP, LDAP, network and certificate resources.
    ResourceConfiguration,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Connection,
        Self::PowerStateGet,
        Self::PowerStateSet,
        Self::UserManagement,
        Self::UserRead,
        Self::BootDeviceSet,
        Self::BmcReset,
        Self::BmcVersionGet,
        Self::BmcFirmwareUpdate,
        Self::BiosVersionGet,
        Self::BiosFirmwareUpdate,
        Self::BiosConfiguration,
        Self::ResourceConfiguration,
    ];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::PowerStateGet => "power_state_get",
            Self::PowerStateSet => "power_state_set",
            Self::UserManagement => "user_management",
            Self::UserRead => "user_read",
            Self::BootDeviceSet => "boot_device_set",
            Self::BmcReset => "bmc_reset",
            Self::BmcVersionGet => "bmc_version_get",
            Self::BmcFirmwareUpdate => "bmc_firmware_update",
            Self::BiosVersionGet => "bios_version_get",
            Self::BiosFirmwareUpdate => "bios_firmware_update",
            Self::BiosConfiguration => "bios_configuration",
            Self::ResourceConfiguration => "resource_configuration",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned while parsing a capability tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown capability: {0}")]
pub struct ParseCapabilityError(pub String);

impl TryFrom<&str> for Capability {
    type Error = ParseCapabilityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == normalized)
            .ok_or_else(|| ParseCapabilityError(value.to_owned()))
    }
}

/// Set of capabilities advertised by one driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Creates a set from the given tags. Duplicates collapse.
    #[must_use]
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self(capabilities.into_iter().collect())
    }

    /// Returns whether `capability` is advertised.
    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Returns whether no capability is advertised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of advertised capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the advertised capabilities in tag order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&[Capability]> for CapabilitySet {
    fn from(capabilities: &[Capability]) -> Self {
        Self::new(capabilities.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("power_state_get", Capability::PowerStateGet)]
    #[case(" BMC_RESET ", Capability::BmcReset)]
    #[case("resource_configuration", Capability::ResourceConfiguration)]
    fn parses_canonical_names(#[case] raw: &str, #[case] expected: Capability) {
        assert_eq!(Capability::try_from(raw), Ok(expected));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            Capability::try_from("teleport"),
            Err(ParseCapabilityError("teleport".to_owned()))
        );
    }

    #[test]
    fn every_tag_round_trips_through_its_name() {
        for capability in Capability::ALL {
            assert_eq!(Capability::try_from(capability.as_str()), Ok(capability));
        }
    }

    #[test]
    fn set_collapses_duplicates() {
        let set = CapabilitySet::new([
            Capability::PowerStateGet,
            Capability::PowerStateGet,
            Capability::BmcReset,
        ]);

        assert_eq!(set.len(), 2);
        assert!(set.contains(Capability::BmcReset));
        assert!(!set.contains(Capability::UserRead));
    }
}
