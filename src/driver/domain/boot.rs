//! Boot device selection values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Boot device for the next (or every) boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootDevice {
    /// Network boot (PXE).
    Pxe,
    /// Local disk.
    Disk,
    /// CD/DVD or virtual media.
    Cdrom,
    /// Firmware setup screen.
    BiosSetup,
    /// Clear any override.
    None,
}

impl BootDevice {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pxe => "pxe",
            Self::Disk => "disk",
            Self::Cdrom => "cdrom",
            Self::BiosSetup => "bios",
            Self::None => "none",
        }
    }
}

impl fmt::Display for BootDevice {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Boot override request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootOptions {
    /// Target device.
    pub device: BootDevice,
    /// Keep the override for every subsequent boot instead of the next only.
    pub persistent: bool,
    /// Boot in UEFI mode.
    pub efi: bool,
}

impl BootOptions {
    /// Creates a one-time, legacy-mode override for `device`.
    #[must_use]
    pub const fn once(device: BootDevice) -> Self {
        Self {
            device,
            persistent: false,
            efi: false,
        }
    }

    /// Makes the override persistent.
    #[must_use]
    pub const fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Requests UEFI boot mode.
    #[must_use]
    pub const fn efi(mut self) -> Self {
        self.efi = true;
        self
    }
}
