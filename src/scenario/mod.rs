//! Scenario lifecycle: ordered steps, fail-fast, guaranteed cleanup.
//!
//! A scenario probes services, submits a booking and verifies the state
//! each service ends up with. Steps run strictly in order and the first
//! failure ends the scenario. Cleanup runs exactly once afterwards whatever
//! happened, so the next scenario starts from empty services.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use backon::Retryable;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::config::VerifyConfig;
use crate::error::{HarnessError, Result};
use crate::gateway::{BookingRequest, SagaGateway};
use crate::service::Service;
use crate::table::{ColumnProjection, ExpectedTable, Row};
use crate::utils::retry::verify_backoff;

/// Services emptied after every scenario, in order.
///
/// The booking front door keeps no saga state and is left alone.
pub const CLEANUP_ORDER: [Service; 3] = [Service::Car, Service::Hotel, Service::Alpha];

/// One step of a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Require a service to report healthy.
    Probe(Service),
    /// Submit a booking through the front door.
    Book(BookingRequest),
    /// Require a service's records to equal the expected table.
    Verify {
        service: Service,
        expected: ExpectedTable,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Probe(service) => write!(f, "{service} service is up and running"),
            Step::Book(request) => write!(f, "{request}"),
            Step::Verify { service, expected } => {
                write!(f, "{service} service holds {} expected rows", expected.len())
            }
        }
    }
}

/// The step that ended a scenario and why.
#[derive(Debug, thiserror::Error)]
#[error("Step {number} ({step}) failed: {error}")]
pub struct StepFailure {
    /// Position of the failing step, starting at 1.
    pub number: usize,
    /// Description of the failing step.
    pub step: String,
    #[source]
    pub error: HarnessError,
}

/// Everything that happened in one scenario run.
///
/// The verdict comes from the steps alone. A failed cleanup is reported
/// beside it and never flips it.
#[derive(Debug)]
pub struct ScenarioReport {
    /// Steps attempted, including a failing one.
    pub steps_run: usize,
    pub outcome: std::result::Result<(), StepFailure>,
    pub cleanup: Result<()>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Services may still hold state from this scenario.
    pub fn cleanup_failed(&self) -> bool {
        self.cleanup.is_err()
    }

    /// Split into the step verdict and the cleanup error, if any.
    pub fn into_result(self) -> (std::result::Result<(), StepFailure>, Option<HarnessError>) {
        (self.outcome, self.cleanup.err())
    }
}

/// Runs scenario steps against a gateway.
#[derive(Debug, Clone)]
pub struct ScenarioController<G> {
    gateway: G,
    verify: VerifyConfig,
}

impl<G: SagaGateway> ScenarioController<G> {
    /// Controller that verifies state exactly once per step.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            verify: VerifyConfig::single_shot(),
        }
    }

    /// Re-read state while it is still settling, per `verify`.
    pub fn with_verify(mut self, verify: VerifyConfig) -> Self {
        self.verify = verify;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn probe(&self, service: Service) -> Result<()> {
        self.gateway.probe(service).await
    }

    pub async fn book(&self, request: &BookingRequest) -> Result<()> {
        self.gateway.submit_booking(request).await
    }

    pub async fn snapshot(&self, service: Service) -> Result<Vec<Row>> {
        self.gateway.fetch_rows(service).await
    }

    /// Compare the records `service` holds with `expected`.
    ///
    /// Orchestrator events are projected onto the expected columns first;
    /// participant bookings are compared over every column they carry.
    pub async fn verify(&self, service: Service, expected: &ExpectedTable) -> Result<()> {
        let projection = (service == Service::Alpha).then(|| ColumnProjection::onto(expected));
        let projection = projection.as_ref();
        let gateway = &self.gateway;

        let attempt = move || async move {
            let rows = gateway.fetch_rows(service).await?;
            expected
                .diff(&rows, projection)
                .into_result()
                .map_err(|diff| HarnessError::StateMismatch { service, diff })
        };

        attempt
            .retry(verify_backoff(&self.verify))
            .when(HarnessError::is_state_mismatch)
            .notify(|err: &HarnessError, delay: Duration| {
                warn!(%service, delay = ?delay, error = %err, "State not settled yet, retrying");
            })
            .await
    }

    /// Empty every stateful service.
    ///
    /// All services are attempted even after one fails; every failure is
    /// reported.
    pub async fn cleanup(&self) -> Result<()> {
        info!("Cleaning up services");

        let mut failures = Vec::new();
        for service in CLEANUP_ORDER {
            if let Err(e) = self.gateway.purge(service).await {
                error!(%service, error = %e, "Failed to clean up service");
                failures.push(e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::CleanupFailure { failures })
        }
    }

    pub async fn execute(&self, step: &Step) -> Result<()> {
        match step {
            Step::Probe(service) => self.probe(*service).await,
            Step::Book(request) => self.book(request).await,
            Step::Verify { service, expected } => self.verify(*service, expected).await,
        }
    }

    /// Run `steps` in order, stop at the first failure, then clean up.
    pub async fn run(&self, steps: &[Step]) -> ScenarioReport {
        let (steps_run, outcome) = self.run_steps(steps).await;
        if let Err(failure) = &outcome {
            error!(error = %failure, "Scenario failed");
        }

        let cleanup = self.cleanup().await;
        if let Err(e) = &cleanup {
            error!(
                passed = outcome.is_ok(),
                error = %e,
                "Cleanup failed, next scenario may not start from empty services"
            );
        }

        ScenarioReport {
            steps_run,
            outcome,
            cleanup,
        }
    }

    async fn run_steps(&self, steps: &[Step]) -> (usize, std::result::Result<(), StepFailure>) {
        for (index, step) in steps.iter().enumerate() {
            info!(step = index + 1, %step, "Running step");

            let result = match AssertUnwindSafe(self.execute(step)).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(HarnessError::Panicked(panic_message(panic))),
            };

            if let Err(error) = result {
                let failure = StepFailure {
                    number: index + 1,
                    step: step.to_string(),
                    error,
                };
                return (index + 1, Err(failure));
            }
        }
        (steps.len(), Ok(()))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
    }
}
