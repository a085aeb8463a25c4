//! Unit tests for registry construction, lookup and sessions.

mod descriptor_tests;
mod registry_tests;
