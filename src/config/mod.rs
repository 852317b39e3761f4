//! Harness configuration.
//!
//! Aggregates service addresses, HTTP client settings and verification
//! policy into a single `HarnessConfig` that can be loaded from YAML files
//! or environment variables.

mod client;
mod services;

pub use client::{HttpConfig, VerifyConfig};
pub use services::{ConfigError, ServiceAddresses};

use serde::Deserialize;

use crate::service::{Service, ServiceEndpoints};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "acceptance.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "SAGA_ACCEPTANCE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "SAGA_ACCEPTANCE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "SAGA_ACCEPTANCE_LOG";

/// Environment variable for the orchestrator REST address.
pub const ALPHA_ADDRESS_ENV_VAR: &str = "ALPHA_REST_ADDRESS";
/// Environment variable for the car service address.
pub const CAR_ADDRESS_ENV_VAR: &str = "CAR_SERVICE_ADDRESS";
/// Environment variable for the hotel service address.
pub const HOTEL_ADDRESS_ENV_VAR: &str = "HOTEL_SERVICE_ADDRESS";
/// Environment variable for the booking service address.
pub const BOOKING_ADDRESS_ENV_VAR: &str = "BOOKING_SERVICE_ADDRESS";

/// Per-service address variables and the config keys they override.
const ADDRESS_ENV_VARS: [(Service, &str); 4] = [
    (Service::Alpha, ALPHA_ADDRESS_ENV_VAR),
    (Service::Car, CAR_ADDRESS_ENV_VAR),
    (Service::Hotel, HOTEL_ADDRESS_ENV_VAR),
    (Service::Booking, BOOKING_ADDRESS_ENV_VAR),
];

/// Main harness configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base addresses of the services under test.
    pub services: ServiceAddresses,
    /// HTTP client settings.
    pub http: HttpConfig,
    /// Eventual-consistency policy for verification steps.
    pub verify: VerifyConfig,
}

impl HarnessConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `acceptance.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. Per-service address variables (`ALPHA_REST_ADDRESS`, ...)
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        for (service, var) in ADDRESS_ENV_VARS {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(format!("services.{}", service.name()), value)?;
        }

        let config: HarnessConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Config pointing every service at the given addresses.
    pub fn with_addresses(services: ServiceAddresses) -> Self {
        Self {
            services,
            ..Self::default()
        }
    }

    /// Validate the configured addresses into endpoints.
    pub fn endpoints(&self) -> Result<ServiceEndpoints, ConfigError> {
        self.services.endpoints()
    }
}
