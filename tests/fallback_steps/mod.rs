//! Step definitions for capability fallback scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
