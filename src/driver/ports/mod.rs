//! Capability interfaces implemented by driver adapters.

mod capabilities;

pub use capabilities::{
    BiosConfigurator, BiosFirmwareUpdater, BiosVersionGetter, BmcFirmwareUpdater, BmcResetter,
    BmcVersionGetter, BootDeviceSetter, Connection, Driver, DriverResult, PowerStateGetter,
    PowerStateSetter, ResourceConfigurator, UserManager, UserReader,
};
