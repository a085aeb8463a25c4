//! Given steps for capability fallback scenarios.

use super::world::FallbackWorld;
use crate::support::{FakeDriver, refused};
use bmclink::driver::domain::PowerState;
use rstest_bdd_macros::given;

#[given(r#"a driver "{name}" speaking "{protocol}" whose power calls fail"#)]
fn failing_driver(
    world: &mut FallbackWorld,
    name: String,
    protocol: String,
) -> Result<(), eyre::Report> {
    world.declare(&name, &protocol, FakeDriver::broken(refused()))
}

#[given(r#"a driver "{name}" speaking "{protocol}" reporting power "{state}""#)]
fn healthy_driver(
    world: &mut FallbackWorld,
    name: String,
    protocol: String,
    state: String,
) -> Result<(), eyre::Report> {
    let power = match state.as_str() {
        "on" => PowerState::On,
        "off" => PowerState::Off,
        other => return Err(eyre::eyre!("unknown power state '{other}'")),
    };
    world.declare(&name, &protocol, FakeDriver::healthy(power))
}

#[given(r#"an unreachable driver "{name}" speaking "{protocol}""#)]
fn unreachable_driver(
    world: &mut FallbackWorld,
    name: String,
    protocol: String,
) -> Result<(), eyre::Report> {
    world.declare(&name, &protocol, FakeDriver::unreachable())
}
