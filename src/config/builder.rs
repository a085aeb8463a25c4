//! Provider wiring for [`BmcClient::from_config`].

use super::{ClientConfig, ProviderKind};
use crate::dispatch::services::BmcClient;
use crate::job::services::JobPoller;
use crate::providers::idrac8::Idrac8;
use crate::providers::ipmitool::Ipmitool;
use crate::providers::racadm::{self, Racadm};
use crate::providers::redfish::{self, Redfish};
use crate::registry::domain::{DriverDescriptor, RegistryError};
use crate::registry::services::Registry;
use crate::transport::adapters::{HttpOptions, ProcessExecutor, ReqwestTransport};
use crate::transport::ports::HttpError;
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned while building a client from settings.
#[derive(Debug, Clone, Error)]
pub enum ClientBuildError {
    /// A required setting is blank.
    #[error("client setting \"{0}\" is required")]
    MissingSetting(&'static str),

    /// No provider is listed.
    #[error("at least one provider must be configured")]
    NoProviders,

    /// An HTTP provider's client could not be created.
    #[error("failed to build the {provider} HTTP client: {source}")]
    Http {
        /// Provider whose transport failed.
        provider: ProviderKind,
        /// Underlying failure.
        #[source]
        source: HttpError,
    },

    /// A provider descriptor was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ClientConfig {
    fn validate(&self) -> Result<(), ClientBuildError> {
        let required = [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ];
        for (setting, value) in required {
            if value.trim().is_empty() {
                return Err(ClientBuildError::MissingSetting(setting));
            }
        }
        if self.providers.is_empty() {
            return Err(ClientBuildError::NoProviders);
        }
        Ok(())
    }

    fn http_transport(
        &self,
        provider: ProviderKind,
        basic_auth: bool,
        cookies: bool,
    ) -> Result<Arc<ReqwestTransport>, ClientBuildError> {
        let options = HttpOptions {
            base_url: format!(
                "https://{}:{}",
                self.host,
                self.port.unwrap_or(redfish::DEFAULT_PORT)
            ),
            basic_auth: basic_auth.then(|| (self.username.clone(), self.password.clone())),
            insecure_tls: self.redfish.insecure_tls,
            timeout: self.redfish.request_timeout,
            cookies,
        };
        ReqwestTransport::new(options)
            .map(Arc::new)
            .map_err(|source| ClientBuildError::Http { provider, source })
    }

    fn descriptor(&self, provider: ProviderKind) -> Result<DriverDescriptor, ClientBuildError> {
        let credentials = self.credentials();
        let descriptor = match provider {
            ProviderKind::Ipmitool => {
                let executor = ProcessExecutor::new(self.ipmitool_path.clone());
                Ipmitool::new(Arc::new(executor), credentials).descriptor()
            }
            ProviderKind::Racadm => {
                let executor = racadm::executor(self.racadm_path.clone());
                let poller = JobPoller::new(self.job_poller.clone(), Arc::new(DefaultClock));
                Racadm::new(Arc::new(executor), credentials, poller).descriptor()
            }
            ProviderKind::Redfish => {
                Redfish::new(self.http_transport(provider, true, false)?).descriptor()
            }
            ProviderKind::Idrac8 => {
                Idrac8::new(self.http_transport(provider, false, true)?, credentials).descriptor()
            }
        };
        Ok(descriptor?)
    }
}

impl BmcClient {
    /// Builds a client with one driver per configured provider, in the
    /// configured order.
    ///
    /// No connection is made; call [`BmcClient::open`] to probe the
    /// controller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::MissingSetting`] or
    /// [`ClientBuildError::NoProviders`] for incomplete settings, and
    /// [`ClientBuildError::Http`] when an HTTP client cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientBuildError> {
        config.validate()?;
        let mut registry = Registry::new();
        for provider in &config.providers {
            registry.register(config.descriptor(*provider)?);
        }
        Ok(Self::new(registry))
    }
}
