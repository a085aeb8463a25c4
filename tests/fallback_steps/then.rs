//! Then steps for capability fallback scenarios.

use super::world::FallbackWorld;
use bmclink::dispatch::domain::DispatchError;
use rstest_bdd_macros::then;

#[then(r#"the power state is "{state}""#)]
fn power_state_is(world: &FallbackWorld, state: String) -> Result<(), eyre::Report> {
    let read = world
        .last_read
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no power read in scenario world"))?;
    match read {
        Ok(power) if power.as_str() == state => Ok(()),
        other => Err(eyre::eyre!("expected power '{state}', got {other:?}")),
    }
}

#[then(r#"the request was served by "{name}""#)]
fn served_by(world: &FallbackWorld, name: String) -> Result<(), eyre::Report> {
    let served = world
        .metadata
        .successful_provider
        .as_ref()
        .map(|provider| provider.as_str());
    if served != Some(name.as_str()) {
        return Err(eyre::eyre!("expected '{name}' to serve, got {served:?}"));
    }
    Ok(())
}

#[then(r#"a failure is recorded for "{name}""#)]
fn failure_recorded(world: &FallbackWorld, name: String) -> Result<(), eyre::Report> {
    if world.metadata.failure_for(&name).is_none() {
        return Err(eyre::eyre!("no failure recorded for '{name}'"));
    }
    Ok(())
}

#[then("the read fails with {count:usize} driver failures")]
fn read_fails_with(world: &FallbackWorld, count: usize) -> Result<(), eyre::Report> {
    let read = world
        .last_read
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no power read in scenario world"))?;
    let Err(DispatchError::AllProvidersFailed { failures, .. }) = read else {
        return Err(eyre::eyre!("expected every driver to fail, got {read:?}"));
    };
    if failures.len() != count {
        return Err(eyre::eyre!(
            "expected {count} failures, found {}",
            failures.len()
        ));
    }
    Ok(())
}

#[then(r#"only "{name}" is active"#)]
fn only_active(world: &mut FallbackWorld, name: String) -> Result<(), eyre::Report> {
    let opened: Vec<&str> = world.opened.iter().map(|driver| driver.as_str()).collect();
    if opened != [name.as_str()] {
        return Err(eyre::eyre!("expected only '{name}' to open, got {opened:?}"));
    }
    let active = world.client().active().len();
    if active != 1 {
        return Err(eyre::eyre!("expected one active driver, found {active}"));
    }
    Ok(())
}

#[then(r#""{name}" applied "{action}""#)]
fn applied(world: &FallbackWorld, name: String, action: String) -> Result<(), eyre::Report> {
    match world.last_action.as_ref() {
        Some(Ok(())) => {}
        other => return Err(eyre::eyre!("expected the action to succeed, got {other:?}")),
    }
    let applied = world.driver(&name)?.last_action();
    if applied.map(|power| power.as_str()) != Some(action.as_str()) {
        return Err(eyre::eyre!("expected '{name}' to apply '{action}', got {applied:?}"));
    }
    Ok(())
}

#[then(r#""{name}" was never called"#)]
fn never_called(world: &FallbackWorld, name: String) -> Result<(), eyre::Report> {
    let calls = world.driver(&name)?.calls();
    if calls != 0 {
        return Err(eyre::eyre!("expected no calls to '{name}', found {calls}"));
    }
    Ok(())
}
