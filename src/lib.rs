//! Saga Acceptance - end-to-end harness for saga booking workflows
//!
//! Drives an orchestrator ("Alpha") and its participants ("Car", "Hotel")
//! through the booking front door, then checks the eventually consistent
//! state each service exposes against expected tables.

pub mod config;
pub mod error;
pub mod gateway;
pub mod scenario;
pub mod service;
pub mod table;
pub mod utils;

pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use gateway::{http::HttpGateway, BookingRequest, SagaGateway};
pub use scenario::{ScenarioController, ScenarioReport, Step, StepFailure};
pub use service::{Service, ServiceEndpoint, ServiceEndpoints};
pub use table::{diff, ColumnProjection, ExpectedTable, Row, TableDiff};
