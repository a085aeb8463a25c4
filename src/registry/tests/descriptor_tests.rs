//! Driver names, protocols and capability checks.

use crate::driver::domain::{Capability, CapabilitySet, PowerState};
use crate::driver::ports::Driver;
use crate::registry::domain::{DriverDescriptor, DriverName, Protocol, RegistryError};
use crate::testing::ScriptedDriver;
use rstest::rstest;
use std::sync::Arc;

fn handle() -> Arc<dyn Driver> {
    Arc::new(ScriptedDriver::succeeding(PowerState::On))
}

fn name() -> DriverName {
    DriverName::new("ipmitool").expect("valid name")
}

#[rstest]
#[case("  idrac8 ", Some("idrac8"))]
#[case("", None)]
#[case("   ", None)]
#[case("two words", None)]
fn driver_name_validation(#[case] raw: &str, #[case] expected: Option<&str>) {
    let parsed = DriverName::new(raw).ok();

    assert_eq!(parsed.as_ref().map(DriverName::as_str), expected);
}

#[rstest]
#[case("ipmi", Protocol::Ipmi)]
#[case("Redfish", Protocol::Redfish)]
#[case("vendorapi", Protocol::VendorApi)]
#[case("cli", Protocol::Cli)]
fn protocol_parsing(#[case] raw: &str, #[case] expected: Protocol) {
    assert_eq!(Protocol::try_from(raw), Ok(expected));
}

#[test]
fn exact_capability_set_is_accepted() {
    let capabilities = CapabilitySet::new([
        Capability::Connection,
        Capability::PowerStateGet,
        Capability::PowerStateSet,
    ]);

    let descriptor = DriverDescriptor::new(name(), Protocol::Ipmi, capabilities, handle())
        .expect("tags match the interfaces");

    assert!(descriptor.supports(Capability::PowerStateGet));
    assert!(!descriptor.supports(Capability::BmcReset));
}

#[test]
fn advertised_but_missing_interface_is_rejected() {
    let capabilities = CapabilitySet::new([
        Capability::Connection,
        Capability::PowerStateGet,
        Capability::PowerStateSet,
        Capability::BmcReset,
    ]);

    let error = DriverDescriptor::new(name(), Protocol::Ipmi, capabilities, handle())
        .expect_err("bmc reset is not implemented");

    match error {
        RegistryError::CapabilityMismatch {
            advertised_only,
            unadvertised,
            ..
        } => {
            assert_eq!(advertised_only, vec![Capability::BmcReset]);
            assert!(unadvertised.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn implemented_but_unadvertised_interface_is_rejected() {
    let capabilities = CapabilitySet::new([Capability::Connection, Capability::PowerStateGet]);

    let error = DriverDescriptor::new(name(), Protocol::Ipmi, capabilities, handle())
        .expect_err("power set is implemented but not advertised");

    assert!(matches!(
        error,
        RegistryError::CapabilityMismatch { unadvertised, .. }
            if unadvertised == vec![Capability::PowerStateSet]
    ));
}

#[test]
fn tags_read_from_handle_match_interfaces() {
    let descriptor = DriverDescriptor::from_handle(name(), Protocol::Ipmi, handle());

    assert_eq!(descriptor.capabilities().len(), 3);
    assert!(descriptor.supports(Capability::Connection));
}
