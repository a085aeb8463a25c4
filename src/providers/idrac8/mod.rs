//! Dell iDRAC8 web API for configuration resources.
//!
//! The iDRAC8 UI talks to the controller through `data?set=key:value,...`
//! query calls and a handful of JSON `configgroup` endpoints. Those calls
//! need a logged-in session, so the driver's [`Connection`] is the UI
//! login: it stores the `ST1`/`ST2` tokens returned by `data/login` and
//! sends `ST2` as a header on every later request.
//!
//! Values embedded in `set=` strings use `=` and `,` as delimiters, so
//! distinguished names and filters pass through [`escape_ldap`] first.

mod configure;
mod session;
mod users;

use super::Credentials;
use super::status::ensure_status;
use crate::context::OperationContext;
use crate::driver::domain::{Capability, CapabilitySet};
use crate::driver::ports::{Connection, Driver, DriverResult, ResourceConfigurator};
use crate::registry::domain::{DriverDescriptor, DriverName, Protocol, RegistryError};
use crate::transport::ports::{HttpRequest, HttpResponse, HttpTransport};
use session::Session;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Registered driver name.
pub const NAME: &str = "idrac8";
/// Protocol family.
pub const PROTOCOL: Protocol = Protocol::VendorApi;
/// Advertised capabilities.
pub const CAPABILITIES: [Capability; 2] =
    [Capability::Connection, Capability::ResourceConfiguration];

/// Percent-escapes the `set=` delimiters in `value`.
///
/// `=` becomes `%5C%3D` and `,` becomes `%5C%2C`; every other character is
/// kept as is.
///
/// ```
/// use bmclink::providers::idrac8::escape_ldap;
///
/// assert_eq!(escape_ldap("cn=admins,dc=example"), "cn%5C%3Dadmins%5C%2Cdc%5C%3Dexample");
/// ```
#[must_use]
pub fn escape_ldap(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '=' => escaped.push_str("%5C%3D"),
            ',' => escaped.push_str("%5C%2C"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// iDRAC8 configuration driver.
pub struct Idrac8 {
    transport: Arc<dyn HttpTransport>,
    credentials: Credentials,
    session: RwLock<Option<Session>>,
}

impl Idrac8 {
    /// Creates the driver. `transport` should keep cookies between
    /// requests; the login sets a session cookie alongside the tokens.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            session: RwLock::new(None),
        }
    }

    /// Wraps the driver in a registry descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapabilityMismatch`] if the advertised tags
    /// drift from the implemented interfaces.
    pub fn descriptor(self) -> Result<DriverDescriptor, RegistryError> {
        DriverDescriptor::new(
            DriverName::new(NAME)?,
            PROTOCOL,
            CapabilitySet::new(CAPABILITIES),
            Arc::new(self),
        )
    }

    /// Sends `request` with the session header and checks the status.
    async fn call(
        &self,
        ctx: &OperationContext,
        mut request: HttpRequest,
        expected: RangeInclusive<u16>,
    ) -> DriverResult<HttpResponse> {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.st2.clone());
        if let Some(st2) = token {
            request = request.header("ST2", st2);
        }
        let endpoint = request.path.clone();
        debug!(
            host = %self.credentials.host,
            method = ?request.method,
            endpoint = %endpoint,
            "iDRAC8 request"
        );
        let response = self.transport.send(ctx, request).await?;
        ensure_status(&endpoint, &response, expected)?;
        Ok(response)
    }
}

impl std::fmt::Debug for Idrac8 {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Idrac8")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Driver for Idrac8 {
    fn connection(&self) -> Option<&dyn Connection> {
        Some(self)
    }

    fn resource_configurator(&self) -> Option<&dyn ResourceConfigurator> {
        Some(self)
    }
}
