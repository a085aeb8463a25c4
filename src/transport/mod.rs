//! Subprocess and HTTP transports used by driver adapters.

pub mod adapters;
pub mod ports;
