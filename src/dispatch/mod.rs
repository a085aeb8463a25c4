//! Capability-ordered fallback dispatch and the public client surface.
//!
//! [`services::dispatch`] is the one implementation of the fallback chain;
//! every [`services::BmcClient`] operation is a call to it with a capability
//! tag and the per-driver method to invoke.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
