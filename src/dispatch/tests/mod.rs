//! Unit tests for fallback dispatch and the client surface.

mod dispatcher_tests;
