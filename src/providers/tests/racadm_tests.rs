//! BIOS configuration through the racadm job queue.

use super::credentials;
use crate::context::{ContextError, OperationContext};
use crate::dispatch::domain::{DispatchError, ExecutionMetadata};
use crate::dispatch::services::BmcClient;
use crate::driver::domain::DriverError;
use crate::driver::ports::Driver;
use crate::job::domain::JobError;
use crate::job::ports::JobQueueError;
use crate::job::services::{JobPoller, PollerConfig};
use crate::providers::racadm::{self, Racadm};
use crate::registry::services::Registry;
use crate::transport::ports::{CommandError, CommandExecutor, CommandOutput, MockCommandExecutor};
use mockable::DefaultClock;
use mockall::Sequence;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_test::traced_test;

const DOCUMENT: &str = "<SystemConfiguration><Component FQDD=\"BIOS.Setup.1-1\">\
    <Attribute Name=\"BootMode\">Uefi</Attribute></Component></SystemConfiguration>";
const SUBMITTED: &str =
    "RAC977: Import configuration XML file operation initiated.\n\
     Use the \"racadm jobqueue view -i JID_000123456789\" command to view the status\n";

fn poller() -> JobPoller<DefaultClock> {
    JobPoller::new(
        PollerConfig {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
            max_consecutive_errors: 2,
            minimum_deadline: Duration::ZERO,
        },
        Arc::new(DefaultClock),
    )
}

fn progress(percent: u8) -> CommandOutput {
    CommandOutput::success(format!(
        "Job ID=[JID_000123456789]\nStatus=[Running]\nPercent Complete=[{percent}]\n"
    ))
}

fn is_status_query(args: &[String]) -> bool {
    super::ends_with(args, &["jobqueue", "view", "-i", "JID_000123456789"])
}

fn driver(executor: MockCommandExecutor) -> Racadm<DefaultClock> {
    Racadm::new(Arc::new(executor), credentials().with_port(8443), poller())
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn bios_document_is_submitted_and_polled_to_completion() {
    let staged = Arc::new(Mutex::new(None::<(Vec<String>, String)>));
    let seen = Arc::clone(&staged);
    let mut sequence = Sequence::new();
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_run()
        .withf(|_, args| args.iter().any(|arg| arg == "set"))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(move |_, args| {
            let path = args.last().cloned().unwrap_or_default();
            let payload = std::fs::read_to_string(&path).unwrap_or_default();
            *seen.lock().expect("staging lock") = Some((args.to_vec(), payload));
            Ok(CommandOutput::success(SUBMITTED))
        });
    executor
        .expect_run()
        .withf(|_, args| is_status_query(args))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(progress(40)));
    executor
        .expect_run()
        .withf(|_, args| is_status_query(args))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(progress(100)));

    driver(executor)
        .bios_configurator()
        .expect("configurator")
        .set_bios_configuration(&OperationContext::new(), DOCUMENT)
        .await
        .expect("job completes");

    let (args, payload) = staged
        .lock()
        .expect("staging lock")
        .clone()
        .expect("set was called");
    let prefix: Vec<&str> = args.iter().take(11).map(String::as_str).collect();
    assert_eq!(
        prefix,
        [
            "-r", "10.0.0.5:8443", "-u", "root", "-p", "calvin", "--nocertwarn", "set", "-t",
            "xml", "-f",
        ]
    );
    assert_eq!(payload, DOCUMENT);
    assert!(logs_contain("BIOS configuration applied"));
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_never_polls() {
    let mut executor = MockCommandExecutor::new();
    executor.expect_run().times(1).returning(|_, _| {
        Ok(CommandOutput {
            status: Some(2),
            stdout: String::new(),
            stderr: "ERROR: Unable to connect to RAC at specified IP address.".to_owned(),
        })
    });

    let error = driver(executor)
        .bios_configurator()
        .expect("configurator")
        .set_bios_configuration(&OperationContext::new(), DOCUMENT)
        .await
        .expect_err("submission rejected");

    let DriverError::Job(JobError::Submit(JobQueueError::Rejected(reason))) = &error else {
        panic!("expected a rejected submission, got {error:?}");
    };
    assert!(reason.contains("Unable to connect"));
    assert!(!error.is_fatal());
}

#[tokio::test(start_paused = true)]
async fn failing_status_reads_fail_the_job() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_run()
        .withf(|_, args| args.iter().any(|arg| arg == "set"))
        .times(1)
        .returning(|_, _| Ok(CommandOutput::success(SUBMITTED)));
    executor
        .expect_run()
        .withf(|_, args| is_status_query(args))
        .times(2)
        .returning(|_, _| {
            Ok(CommandOutput {
                status: Some(1),
                stdout: "ERROR: RAC1017: Unable to retrieve the job queue.".to_owned(),
                stderr: String::new(),
            })
        });

    let error = driver(executor)
        .bios_configurator()
        .expect("configurator")
        .set_bios_configuration(&OperationContext::new(), DOCUMENT)
        .await
        .expect_err("two failed reads");

    assert!(matches!(
        error,
        DriverError::Job(JobError::ConsecutiveErrors { ref errors, .. }) if errors.len() == 2
    ));
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_submission_aborts_the_client_call() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_run()
        .times(1)
        .returning(|_, _| Err(CommandError::Context(ContextError::Cancelled)));
    let mut registry = Registry::default();
    registry.register(driver(executor).descriptor().expect("descriptor"));
    let client = BmcClient::new(registry);
    let mut metadata = ExecutionMetadata::new();

    let error = client
        .set_bios_configuration(&OperationContext::new(), DOCUMENT, Some(&mut metadata))
        .await
        .expect_err("submission was interrupted");

    assert!(error.is_cancellation());
    let DispatchError::Aborted { provider, source, .. } = &error else {
        panic!("expected an aborted dispatch, got {error:?}");
    };
    assert_eq!(provider.as_str(), racadm::NAME);
    assert!(matches!(
        source,
        DriverError::Job(JobError::Submit(JobQueueError::Context(ContextError::Cancelled)))
    ));
    assert!(metadata.successful_provider.is_none());
}

#[test]
fn descriptor_advertises_bios_configuration_only() {
    let descriptor = driver(MockCommandExecutor::new())
        .descriptor()
        .expect("capabilities match the implemented interfaces");

    assert_eq!(descriptor.name().as_str(), racadm::NAME);
    assert_eq!(descriptor.capabilities().len(), racadm::CAPABILITIES.len());
}

#[cfg(unix)]
#[tokio::test]
async fn executor_pins_the_locale() {
    let executor = racadm::executor("env");

    let output = executor
        .run(&OperationContext::new(), &[])
        .await
        .expect("env runs");

    assert!(output.stdout.lines().any(|line| line == "LC_ALL=C.UTF-8"));
}
