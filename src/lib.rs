//! bmclink: out-of-band management for baseboard management controllers.
//!
//! A [`dispatch::services::BmcClient`] reaches one BMC through an ordered set
//! of drivers. Each driver speaks one protocol (IPMI, Redfish, a vendor CLI
//! or a vendor web API) and advertises the capabilities it implements. A
//! client operation tries every driver that advertises the requested
//! capability, in registration order, and returns the first success.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal layering:
//!
//! - **Domain**: value types, validation and error taxonomies
//! - **Ports**: async trait contracts for drivers, job queues and transports
//! - **Adapters**: subprocess and HTTP transports
//! - **Services**: the registry, the fallback dispatcher and the job poller
//!
//! # Modules
//!
//! - [`context`]: cancellation and deadlines for every operation
//! - [`driver`]: capabilities, driver traits and operation payloads
//! - [`registry`]: ordered driver descriptors and session lifecycle
//! - [`dispatch`]: the fallback chain and the public client
//! - [`job`]: submit-then-poll handling for vendor jobs
//! - [`transport`]: command and HTTP transports
//! - [`providers`]: `ipmitool`, Redfish, `racadm` and iDRAC8 drivers
//! - [`config`]: client construction from settings

pub mod config;
pub mod context;
pub mod dispatch;
pub mod driver;
pub mod job;
pub mod providers;
pub mod registry;
pub mod transport;

#[cfg(test)]
mod testing;
