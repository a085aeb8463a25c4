//! Registry value types.

mod descriptor;
mod error;
mod name;

pub use descriptor::DriverDescriptor;
pub use error::{ParseProtocolError, RegistryError};
pub use name::{DriverName, Protocol};
