//! When steps for capability fallback scenarios.

use super::world::{FallbackWorld, run_async};
use bmclink::context::OperationContext;
use bmclink::dispatch::domain::ExecutionMetadata;
use bmclink::driver::domain::PowerAction;
use rstest_bdd_macros::when;

#[when("the power state is read")]
fn read_power_state(world: &mut FallbackWorld) {
    let mut metadata = ExecutionMetadata::new();
    let result = run_async(
        world
            .client()
            .power_state(&OperationContext::new(), Some(&mut metadata)),
    );
    world.metadata = metadata;
    world.last_read = Some(result);
}

#[when("the client is opened")]
fn open_client(world: &mut FallbackWorld) -> Result<(), eyre::Report> {
    let mut metadata = ExecutionMetadata::new();
    let opened = run_async(
        world
            .client()
            .open(&OperationContext::new(), Some(&mut metadata)),
    )
    .map_err(|err| eyre::eyre!("open failed: {err}"))?;
    world.metadata = metadata;
    world.opened = opened;
    Ok(())
}

#[when("the power is cycled")]
fn cycle_power(world: &mut FallbackWorld) {
    let mut metadata = ExecutionMetadata::new();
    let result = run_async(world.client().set_power_state(
        &OperationContext::new(),
        PowerAction::Cycle,
        Some(&mut metadata),
    ));
    world.metadata = metadata;
    world.last_action = Some(result);
}
