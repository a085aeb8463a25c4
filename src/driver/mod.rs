//! Driver adapter contract shared by every BMC transport.
//!
//! A driver wraps one transport (a CLI tool, an HTTP API, an IPMI session)
//! and exposes a fixed set of capability interfaces. The module follows the
//! same hexagonal split as the rest of the crate:
//!
//! - Capability tags, value types and errors in [`domain`]
//! - Capability traits and the [`ports::Driver`] handle in [`ports`]

pub mod domain;
pub mod ports;
