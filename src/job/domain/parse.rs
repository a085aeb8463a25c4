//! Extraction of job identifiers and progress from CLI output.

use super::{JobId, ParseJobError};

const PROGRESS_MARKER: &str = "Percent Complete=[";

/// Finds the job identifier in submission output.
///
/// The identifier starts at the first `JID_` occurrence and spans sixteen
/// characters, so it is found inside quoted command hints such as
/// `racadm jobqueue view -i JID_000123456789`.
///
/// # Errors
///
/// Returns [`ParseJobError::MissingJobId`] when no `JID_` marker is present,
/// or [`ParseJobError::InvalidJobId`] when the token after it is truncated.
pub fn parse_job_id(output: &str) -> Result<JobId, ParseJobError> {
    let start = output
        .find(JobId::PREFIX)
        .ok_or(ParseJobError::MissingJobId)?;
    let tail = output.get(start..).unwrap_or_default();
    let token = tail
        .get(..JobId::LENGTH)
        .ok_or_else(|| ParseJobError::InvalidJobId(tail.trim().to_owned()))?;
    JobId::new(token)
}

/// Reads the `Percent Complete=[N]` value from job status output.
///
/// # Errors
///
/// Returns [`ParseJobError::MissingProgress`] when no progress line exists,
/// or [`ParseJobError::InvalidProgress`] when the bracketed value is not an
/// integer between 0 and 100.
pub fn parse_percent_complete(output: &str) -> Result<u8, ParseJobError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(PROGRESS_MARKER))
        .ok_or(ParseJobError::MissingProgress)?;
    let rest = line.strip_prefix(PROGRESS_MARKER).unwrap_or_default();
    let (digits, _) = rest
        .split_once(']')
        .ok_or_else(|| ParseJobError::InvalidProgress(rest.to_owned()))?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseJobError::InvalidProgress(digits.to_owned()));
    }
    digits
        .parse::<u8>()
        .ok()
        .filter(|percent| *percent <= 100)
        .ok_or_else(|| ParseJobError::InvalidProgress(digits.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SUBMIT_OUTPUT: &str = "RAC977: Import configuration XML file operation job created.\n\
         Use the \"racadm jobqueue view -i JID_000123456789\" command to view the status of the job.";

    #[test]
    fn job_id_is_found_inside_command_hint() {
        let id = parse_job_id(SUBMIT_OUTPUT).expect("job id should parse");

        assert_eq!(id.as_str(), "JID_000123456789");
    }

    #[test]
    fn missing_job_id_is_an_error() {
        assert_eq!(
            parse_job_id("ERROR: RAC1017 configuration failed"),
            Err(ParseJobError::MissingJobId)
        );
    }

    #[test]
    fn truncated_job_id_is_an_error() {
        assert!(matches!(
            parse_job_id("created JID_1234"),
            Err(ParseJobError::InvalidJobId(_))
        ));
    }

    #[rstest]
    #[case("Status=[Running]\nPercent Complete=[42]\n", 42)]
    #[case("  Percent Complete=[100]  ", 100)]
    #[case("Percent Complete=[0]", 0)]
    fn progress_is_parsed(#[case] output: &str, #[case] expected: u8) {
        assert_eq!(parse_percent_complete(output), Ok(expected));
    }

    #[test]
    fn missing_progress_line_is_an_error() {
        assert_eq!(
            parse_percent_complete("Job Name=[Configure: Import]\nStatus=[Running]"),
            Err(ParseJobError::MissingProgress)
        );
    }

    #[rstest]
    #[case("Percent Complete=[invalid]")]
    #[case("Percent Complete=[]")]
    #[case("Percent Complete=[101]")]
    #[case("Percent Complete=[-5]")]
    #[case("Percent Complete=[50")]
    fn malformed_progress_is_an_error(#[case] output: &str) {
        assert!(matches!(
            parse_percent_complete(output),
            Err(ParseJobError::InvalidProgress(_))
        ));
    }
}
