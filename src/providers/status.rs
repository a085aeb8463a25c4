//! Transport error mapping and status code checks shared by providers.

use crate::driver::domain::DriverError;
use crate::driver::ports::DriverResult;
use crate::transport::ports::{CommandError, CommandOutput, HttpError, HttpResponse};
use std::ops::RangeInclusive;

/// Accepts exactly 200.
pub(crate) const OK: RangeInclusive<u16> = 200..=200;
/// Accepts exactly 201.
pub(crate) const CREATED: RangeInclusive<u16> = 201..=201;
/// Accepts any 2xx.
pub(crate) const SUCCESS: RangeInclusive<u16> = 200..=299;

/// Fails with [`DriverError::UnexpectedStatus`] unless the response status
/// lies in `expected`.
pub(crate) fn ensure_status(
    endpoint: &str,
    response: &HttpResponse,
    expected: RangeInclusive<u16>,
) -> DriverResult<()> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    let accepted = if expected.start() == expected.end() {
        expected.start().to_string()
    } else {
        format!("{}-{}", expected.start(), expected.end())
    };
    Err(DriverError::UnexpectedStatus {
        endpoint: endpoint.to_owned(),
        status: response.status,
        expected: accepted,
    })
}

/// Fails with [`DriverError::UnexpectedStatus`] when the command exited
/// non-zero. The exit code stands in for the status; a signal reports 0.
pub(crate) fn ensure_exit(command: &str, output: &CommandOutput) -> DriverResult<()> {
    if output.succeeded() {
        return Ok(());
    }
    let code = output
        .status
        .and_then(|status| u16::try_from(status).ok())
        .unwrap_or_default();
    Err(DriverError::UnexpectedStatus {
        endpoint: format!("{command}: {}", output.stderr.trim()),
        status: code,
        expected: "0".to_owned(),
    })
}

impl From<HttpError> for DriverError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Context(context) => Self::Context(context),
            HttpError::InvalidRequest(message) => Self::Validation(message),
            HttpError::Transport(source) => Self::Transport(source),
        }
    }
}

impl From<CommandError> for DriverError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Context(context) => Self::Context(context),
            spawn @ CommandError::Spawn { .. } => Self::transport(spawn),
        }
    }
}
