//! Harness error types.

use reqwest::{StatusCode, Url};

use crate::config::ConfigError;
use crate::service::Service;
use crate::table::{TableDiff, TableError};

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that fail a scenario or a cleanup pass.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("{service} service unreachable at {url}: {source}")]
    UnreachableService {
        service: Service,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} service returned {status} for {url}, expected 200 OK: {body}")]
    UnexpectedStatus {
        service: Service,
        url: Url,
        status: StatusCode,
        body: String,
    },

    #[error("{service} service state does not match expectation\n{diff}")]
    StateMismatch { service: Service, diff: TableDiff },

    #[error("Failed to decode {service} response from {url}: {reason}")]
    Decode {
        service: Service,
        url: Url,
        reason: String,
    },

    #[error("{0} service exposes no state to fetch or clean")]
    NoStateResource(Service),

    #[error("Cleanup failed, services may hold state from this scenario: {}", summarize(.failures))]
    CleanupFailure { failures: Vec<HarnessError> },

    #[error("Step panicked: {0}")]
    Panicked(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid expected table: {0}")]
    InvalidTable(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HarnessError {
    /// State mismatches may resolve once a saga settles; nothing else does.
    pub fn is_state_mismatch(&self) -> bool {
        matches!(self, HarnessError::StateMismatch { .. })
    }

    pub fn service(&self) -> Option<Service> {
        match self {
            HarnessError::UnreachableService { service, .. }
            | HarnessError::UnexpectedStatus { service, .. }
            | HarnessError::StateMismatch { service, .. }
            | HarnessError::Decode { service, .. }
            | HarnessError::NoStateResource(service) => Some(*service),
            _ => None,
        }
    }
}

fn summarize(failures: &[HarnessError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
