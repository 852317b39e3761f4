//! Calls the harness makes against the services under test.
//!
//! `SagaGateway` is the seam between scenario control and transport. The
//! HTTP implementation talks to live services; tests substitute in-memory
//! gateways to exercise the lifecycle without a network.

pub mod http;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::service::Service;
use crate::table::Row;

/// A booking submitted through the front door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub username: String,
    pub rooms: u32,
    pub cars: u32,
}

impl BookingRequest {
    pub fn new(username: impl Into<String>, rooms: u32, cars: u32) -> Self {
        Self {
            username: username.into(),
            rooms,
            cars,
        }
    }

    /// Path segments below the booking service: `booking/{name}/{rooms}/{cars}`.
    pub fn path_segments(&self) -> [String; 4] {
        [
            "booking".to_string(),
            self.username.clone(),
            self.rooms.to_string(),
            self.cars.to_string(),
        ]
    }
}

impl fmt::Display for BookingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} booking {} cars and {} rooms",
            self.username, self.cars, self.rooms
        )
    }
}

/// Operations against the saga services.
///
/// Every call either fully succeeds or returns the error that fails the
/// scenario; implementations never retry.
#[async_trait]
pub trait SagaGateway: Send + Sync {
    /// Check that `service` answers its health endpoint.
    async fn probe(&self, service: Service) -> Result<()>;

    /// Submit a booking to the front door. Does not wait for the saga.
    async fn submit_booking(&self, request: &BookingRequest) -> Result<()>;

    /// Read the records `service` currently holds.
    async fn fetch_rows(&self, service: Service) -> Result<Vec<Row>>;

    /// Delete every record `service` holds.
    async fn purge(&self, service: Service) -> Result<()>;
}
