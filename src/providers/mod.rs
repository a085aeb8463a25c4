//! Built-in driver adapters.
//!
//! Each provider wraps one transport port and exposes a fixed capability
//! list:
//!
//! - [`ipmitool`]: IPMI over LAN through the `ipmitool` binary
//! - [`redfish`]: DMTF Redfish over HTTPS
//! - [`racadm`]: Dell `racadm` CLI, BIOS configuration through vendor jobs
//! - [`idrac8`]: iDRAC8 web API for configuration resources
//!
//! Providers export `NAME`, `PROTOCOL` and `CAPABILITIES` constants and a
//! `descriptor` constructor that registers them with those tags.

mod credentials;
pub mod idrac8;
pub mod ipmitool;
pub mod racadm;
pub mod redfish;
mod status;

pub use credentials::Credentials;

#[cfg(test)]
mod tests;
