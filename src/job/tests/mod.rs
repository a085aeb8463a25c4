//! Unit tests for job lifecycle and polling.
