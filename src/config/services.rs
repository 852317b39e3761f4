//! Service address configuration.

use serde::Deserialize;

use crate::service::{Service, ServiceEndpoint, ServiceEndpoints};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("No address configured for {0} service")]
    MissingAddress(Service),

    #[error("Invalid address '{address}' for {service} service: {reason}")]
    InvalidAddress {
        service: Service,
        address: String,
        reason: String,
    },
}

/// Base addresses of the services under test (e.g. `http://car:8080`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceAddresses {
    /// Saga orchestrator REST address.
    pub alpha: String,
    /// Car participant address.
    pub car: String,
    /// Hotel participant address.
    pub hotel: String,
    /// Booking front door address.
    pub booking: String,
}

impl ServiceAddresses {
    pub fn address(&self, service: Service) -> &str {
        match service {
            Service::Alpha => &self.alpha,
            Service::Car => &self.car,
            Service::Hotel => &self.hotel,
            Service::Booking => &self.booking,
        }
    }

    /// Validate every address.
    pub fn endpoints(&self) -> Result<ServiceEndpoints, ConfigError> {
        let endpoint = |service| ServiceEndpoint::parse(service, self.address(service));
        Ok(ServiceEndpoints::new(
            endpoint(Service::Alpha)?,
            endpoint(Service::Car)?,
            endpoint(Service::Hotel)?,
            endpoint(Service::Booking)?,
        ))
    }
}
