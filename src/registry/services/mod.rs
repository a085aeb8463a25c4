//! Registry construction and session management.

mod registry;

pub use registry::Registry;
