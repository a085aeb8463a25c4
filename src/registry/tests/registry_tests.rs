//! Lookup order, protocol filtering, open and close.

use crate::context::OperationContext;
use crate::dispatch::domain::ExecutionMetadata;
use crate::driver::domain::{Capability, PowerState};
use crate::registry::domain::{Protocol, RegistryError};
use crate::registry::services::Registry;
use crate::testing::{ScriptedDriver, descriptor, refused};
use std::sync::Arc;

fn names(registry: &Registry) -> Vec<String> {
    registry
        .drivers()
        .iter()
        .map(|entry| entry.name().to_string())
        .collect()
}

#[test]
fn drivers_for_keeps_registration_order() {
    let first = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let second = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let registry: Registry = [
        descriptor("redfish", Protocol::Redfish, &first),
        descriptor("ipmitool", Protocol::Ipmi, &second),
        descriptor("redfish", Protocol::Redfish, &second),
    ]
    .into_iter()
    .collect();

    let candidates: Vec<String> = registry
        .drivers_for(Capability::PowerStateGet)
        .map(|entry| entry.name().to_string())
        .collect();

    assert_eq!(candidates, ["redfish", "ipmitool", "redfish"]);
    assert_eq!(registry.drivers_for(Capability::BmcReset).count(), 0);
    assert_eq!(registry.len(), 3);
}

#[test]
fn using_filters_by_protocol() {
    let driver = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let registry: Registry = [
        descriptor("ipmitool", Protocol::Ipmi, &driver),
        descriptor("redfish", Protocol::Redfish, &driver),
        descriptor("racadm", Protocol::Cli, &driver),
    ]
    .into_iter()
    .collect();

    let redfish_only = registry.using(Protocol::Redfish);

    assert_eq!(names(&redfish_only), ["redfish"]);
    assert_eq!(registry.len(), 3);
}

#[tokio::test]
async fn open_drops_drivers_that_fail() {
    let healthy = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let broken = Arc::new(ScriptedDriver::succeeding(PowerState::On).failing_open(refused()));
    let sessionless = Arc::new(ScriptedDriver::succeeding(PowerState::On).without_session());
    let registry: Registry = [
        descriptor("broken", Protocol::VendorApi, &broken),
        descriptor("healthy", Protocol::Ipmi, &healthy),
        descriptor("sessionless", Protocol::Cli, &sessionless),
    ]
    .into_iter()
    .collect();
    let mut metadata = ExecutionMetadata::new();

    let opened = registry
        .open(&OperationContext::new(), &mut metadata)
        .await
        .expect("one driver opens");

    assert_eq!(names(&opened), ["healthy", "sessionless"]);
    assert_eq!(registry.len(), 3);
    assert_eq!(metadata.successful_connections.len(), 1);
    assert!(metadata.failure_for("broken").is_some());
}

#[tokio::test]
async fn open_with_no_survivors_is_an_error() {
    let broken = Arc::new(ScriptedDriver::succeeding(PowerState::On).failing_open(refused()));
    let registry: Registry = [
        descriptor("first", Protocol::Ipmi, &broken),
        descriptor("second", Protocol::Redfish, &broken),
    ]
    .into_iter()
    .collect();

    let error = registry
        .open(&OperationContext::new(), &mut ExecutionMetadata::new())
        .await
        .expect_err("nothing opened");

    assert!(matches!(
        error,
        RegistryError::NoDriversOpened { ref failures } if failures.len() == 2
    ));
}

#[tokio::test]
async fn open_stops_when_context_is_cancelled() {
    let driver = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let registry: Registry = [descriptor("ipmitool", Protocol::Ipmi, &driver)]
        .into_iter()
        .collect();
    let ctx = OperationContext::new();
    ctx.cancel();

    let error = registry
        .open(&ctx, &mut ExecutionMetadata::new())
        .await
        .expect_err("context is cancelled");

    assert!(matches!(error, RegistryError::Context(_)));
    assert_eq!(driver.opens(), 0);
}

#[tokio::test]
async fn interrupted_open_closes_the_sessions_it_opened() {
    let first = Arc::new(ScriptedDriver::succeeding(PowerState::On).cancelling_on_open());
    let second = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let registry: Registry = [
        descriptor("idrac8", Protocol::VendorApi, &first),
        descriptor("redfish", Protocol::Redfish, &second),
    ]
    .into_iter()
    .collect();
    let mut metadata = ExecutionMetadata::new();

    let error = registry
        .open(&OperationContext::new(), &mut metadata)
        .await
        .expect_err("context ends after the first open");

    assert!(matches!(error, RegistryError::Context(_)));
    assert_eq!(first.closes(), 1);
    assert_eq!(second.opens(), 0);
    assert_eq!(second.closes(), 0);
    assert_eq!(metadata.successful_connections.len(), 1);
}

#[tokio::test]
async fn close_continues_past_failures_and_reports_the_first() {
    let failing = Arc::new(ScriptedDriver::succeeding(PowerState::On).failing_close(refused()));
    let also_failing =
        Arc::new(ScriptedDriver::succeeding(PowerState::On).failing_close(refused()));
    let healthy = Arc::new(ScriptedDriver::succeeding(PowerState::On));
    let registry: Registry = [
        descriptor("first", Protocol::Ipmi, &failing),
        descriptor("second", Protocol::Redfish, &healthy),
        descriptor("third", Protocol::Cli, &also_failing),
    ]
    .into_iter()
    .collect();
    let mut metadata = ExecutionMetadata::new();

    let error = registry
        .close(&OperationContext::new(), &mut metadata)
        .await
        .expect_err("two drivers fail to close");

    assert!(matches!(
        error,
        RegistryError::CloseFailed { ref driver, .. } if driver == "first"
    ));
    assert_eq!(healthy.closes(), 1);
    assert_eq!(also_failing.closes(), 1);
    assert_eq!(metadata.failures.len(), 2);
}
