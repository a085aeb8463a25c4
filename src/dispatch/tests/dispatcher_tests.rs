//! Fallback ordering, cancellation and aggregation.

use crate::context::{ContextError, OperationContext};
use crate::dispatch::domain::{DispatchError, ExecutionMetadata};
use crate::dispatch::services::dispatch;
use crate::driver::domain::{BmcResetType, Capability, DriverError, PowerState};
use crate::registry::domain::Protocol;
use crate::registry::services::Registry;
use crate::testing::{ScriptedDriver, descriptor, refused};
use rstest::{fixture, rstest};
use std::sync::Arc;

struct Chain {
    registry: Registry,
    a: Arc<ScriptedDriver>,
    b: Arc<ScriptedDriver>,
    c: Arc<ScriptedDriver>,
}

fn chain(first: ScriptedDriver, second: ScriptedDriver, third: ScriptedDriver) -> Chain {
    let (a, b, c) = (Arc::new(first), Arc::new(second), Arc::new(third));
    let registry = [
        descriptor("a", Protocol::Ipmi, &a),
        descriptor("b", Protocol::Redfish, &b),
        descriptor("c", Protocol::VendorApi, &c),
    ]
    .into_iter()
    .collect();
    Chain { registry, a, b, c }
}

#[fixture]
fn a_fails_b_and_c_succeed() -> Chain {
    chain(
        ScriptedDriver::failing(refused()),
        ScriptedDriver::succeeding(PowerState::On),
        ScriptedDriver::succeeding(PowerState::Off),
    )
}

async fn power_state(
    ctx: &OperationContext,
    registry: &Registry,
    metadata: &mut ExecutionMetadata,
) -> Result<PowerState, DispatchError> {
    dispatch(ctx, registry, Capability::PowerStateGet, metadata, |driver| {
        driver
            .power_state_getter()
            .map(|getter| getter.power_state(ctx))
    })
    .await
}

#[rstest]
#[tokio::test]
async fn first_success_wins_and_later_candidates_are_not_invoked(a_fails_b_and_c_succeed: Chain) {
    let Chain { registry, a, b, c } = a_fails_b_and_c_succeed;
    let mut metadata = ExecutionMetadata::new();

    let state = power_state(&OperationContext::new(), &registry, &mut metadata)
        .await
        .expect("b succeeds");

    assert_eq!(state, PowerState::On);
    assert_eq!((a.invocations(), b.invocations(), c.invocations()), (1, 1, 0));
    assert_eq!(
        metadata.successful_provider.as_ref().map(|name| name.as_str()),
        Some("b")
    );
    assert_eq!(metadata.providers_attempted.len(), 2);
    assert!(metadata.failure_for("a").is_some());
}

#[rstest]
#[tokio::test]
async fn cancelled_context_invokes_no_candidate(a_fails_b_and_c_succeed: Chain) {
    let Chain { registry, a, b, c } = a_fails_b_and_c_succeed;
    let ctx = OperationContext::new();
    ctx.cancel();

    let error = power_state(&ctx, &registry, &mut ExecutionMetadata::new())
        .await
        .expect_err("context is cancelled");

    assert!(matches!(
        error,
        DispatchError::Context {
            source: ContextError::Cancelled,
            ..
        }
    ));
    assert_eq!(a.invocations() + b.invocations() + c.invocations(), 0);
}

#[tokio::test]
async fn cancellation_between_candidates_stops_the_chain() {
    let Chain { registry, b, c, .. } = chain(
        ScriptedDriver::failing(refused()).cancelling_context(),
        ScriptedDriver::succeeding(PowerState::On),
        ScriptedDriver::succeeding(PowerState::On),
    );

    let error = power_state(&OperationContext::new(), &registry, &mut ExecutionMetadata::new())
        .await
        .expect_err("context cancelled by the first candidate");

    assert!(error.is_cancellation());
    assert_eq!(error.failures().len(), 1);
    assert_eq!(b.invocations() + c.invocations(), 0);
}

#[tokio::test]
async fn every_failure_is_reported_once_per_candidate() {
    let Chain { registry, .. } = chain(
        ScriptedDriver::failing(refused()),
        ScriptedDriver::failing(DriverError::Protocol("missing PowerState".to_owned())),
        ScriptedDriver::failing(DriverError::UnexpectedStatus {
            endpoint: "data?get=pwState".to_owned(),
            status: 503,
            expected: "200".to_owned(),
        }),
    );
    let mut metadata = ExecutionMetadata::new();

    let error = power_state(&OperationContext::new(), &registry, &mut metadata)
        .await
        .expect_err("all candidates fail");

    let DispatchError::AllProvidersFailed { capability, failures } = &error else {
        panic!("unexpected error: {error}");
    };
    let providers: Vec<&str> = failures.iter().map(|failure| failure.provider.as_str()).collect();
    assert_eq!(*capability, Capability::PowerStateGet);
    assert_eq!(providers, ["a", "b", "c"]);
    assert!(metadata.successful_provider.is_none());
    assert!(error.to_string().contains("missing PowerState"));
}

#[tokio::test]
async fn fatal_failure_aborts_fallback() {
    let Chain { registry, b, .. } = chain(
        ScriptedDriver::failing(DriverError::Timeout("job ceiling".to_owned())),
        ScriptedDriver::succeeding(PowerState::On),
        ScriptedDriver::succeeding(PowerState::On),
    );

    let error = power_state(&OperationContext::new(), &registry, &mut ExecutionMetadata::new())
        .await
        .expect_err("timeout is fatal");

    assert!(matches!(
        error,
        DispatchError::Aborted { ref provider, .. } if provider.as_str() == "a"
    ));
    assert!(!error.is_cancellation());
    assert_eq!(b.invocations(), 0);
}

#[tokio::test]
async fn missing_capability_is_reported_without_invoking_anything() {
    let Chain { registry, a, .. } = chain(
        ScriptedDriver::succeeding(PowerState::On),
        ScriptedDriver::succeeding(PowerState::On),
        ScriptedDriver::succeeding(PowerState::On),
    );

    let ctx = OperationContext::new();

    let error = dispatch(
        &ctx,
        &registry,
        Capability::BmcReset,
        &mut ExecutionMetadata::new(),
        |driver| {
            driver
                .bmc_resetter()
                .map(|resetter| resetter.reset_bmc(&ctx, BmcResetType::Warm))
        },
    )
    .await
    .expect_err("no driver resets the BMC");

    assert!(matches!(
        error,
        DispatchError::NoCompatibleDriver(Capability::BmcReset)
    ));
    assert_eq!(a.invocations(), 0);
}
