//! Ordered driver registry.
//!
//! Registration order is fallback priority. Each descriptor carries the
//! capability tags its handle implements, checked once at registration so
//! lookups are plain set membership.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
