//! Provider adapter tests against mocked command and HTTP transports.

mod racadm_tests;

use crate::providers::Credentials;

fn credentials() -> Credentials {
    Credentials::new("10.0.0.5", "root", "calvin")
}

/// Returns whether `args` ends with `tail`.
fn ends_with(args: &[String], tail: &[&str]) -> bool {
    args.len() >= tail.len()
        && args
            .iter()
            .skip(args.len() - tail.len())
            .map(String::as_str)
            .eq(tail.iter().copied())
}
