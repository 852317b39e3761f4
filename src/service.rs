//! Services under test and their base addresses.

use std::fmt;

use reqwest::Url;

use crate::config::ConfigError;

/// One of the services the harness talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Saga orchestrator recording start/end events.
    Alpha,
    /// Car rental participant.
    Car,
    /// Hotel reservation participant.
    Hotel,
    /// Booking front door that starts a saga.
    Booking,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Alpha,
        Service::Car,
        Service::Hotel,
        Service::Booking,
    ];

    /// Resource holding the state the service accumulates during a saga.
    ///
    /// The booking front door holds none.
    pub fn state_resource(self) -> Option<&'static str> {
        match self {
            Service::Alpha => Some("events"),
            Service::Car | Service::Hotel => Some("bookings"),
            Service::Booking => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Service::Alpha => "alpha",
            Service::Car => "car",
            Service::Hotel => "hotel",
            Service::Booking => "booking",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base URL of one service.
///
/// Validated at construction so that path segments can always be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    service: Service,
    base: Url,
}

impl ServiceEndpoint {
    pub fn parse(service: Service, address: &str) -> Result<Self, ConfigError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ConfigError::MissingAddress(service));
        }

        let base = Url::parse(address).map_err(|e| ConfigError::InvalidAddress {
            service,
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidAddress {
                service,
                address: address.to_string(),
                reason: "address cannot carry a path".to_string(),
            });
        }

        Ok(Self { service, base })
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base address.
    ///
    /// Segments are percent-encoded; a trailing `/` on the base is ignored.
    pub fn url<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.service, self.base)
    }
}

/// The four endpoints a test run targets. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    alpha: ServiceEndpoint,
    car: ServiceEndpoint,
    hotel: ServiceEndpoint,
    booking: ServiceEndpoint,
}

impl ServiceEndpoints {
    pub fn new(
        alpha: ServiceEndpoint,
        car: ServiceEndpoint,
        hotel: ServiceEndpoint,
        booking: ServiceEndpoint,
    ) -> Self {
        Self {
            alpha,
            car,
            hotel,
            booking,
        }
    }

    pub fn get(&self, service: Service) -> &ServiceEndpoint {
        match service {
            Service::Alpha => &self.alpha,
            Service::Car => &self.car,
            Service::Hotel => &self.hotel,
            Service::Booking => &self.booking,
        }
    }
}
