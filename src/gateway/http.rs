//! HTTP gateway backed by `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, Url};
use tracing::{debug, info};

use super::{BookingRequest, SagaGateway};
use crate::config::{HarnessConfig, HttpConfig};
use crate::error::{HarnessError, Result};
use crate::service::{Service, ServiceEndpoints};
use crate::table::Row;

/// Health endpoint every service exposes.
pub const INFO_PATH: &str = "info";

/// Response bodies quoted in errors are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 200;

/// Talks to the services over HTTP, one shared client per run.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl HttpGateway {
    pub fn new(endpoints: ServiceEndpoints, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(http.timeout())
            .connect_timeout(http.connect_timeout())
            .build()
            .map_err(HarnessError::Client)?;

        Ok(Self { client, endpoints })
    }

    /// Build from configuration, validating every address.
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let endpoints = config.endpoints()?;
        Self::new(endpoints, &config.http)
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    fn state_url(&self, service: Service) -> Result<Url> {
        let resource = service
            .state_resource()
            .ok_or(HarnessError::NoStateResource(service))?;
        Ok(self.endpoints.get(service).url(&[resource]))
    }

    /// Send a body-less request and require `200 OK`.
    async fn call(&self, service: Service, method: Method, url: Url) -> Result<Response> {
        let response = self
            .client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|source| HarnessError::UnreachableService {
                service,
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(HarnessError::UnexpectedStatus {
            service,
            url,
            status,
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        })
    }
}

#[async_trait]
impl SagaGateway for HttpGateway {
    async fn probe(&self, service: Service) -> Result<()> {
        let endpoint = self.endpoints.get(service);
        info!(%service, address = %endpoint.base(), "Connecting to service");

        self.call(service, Method::GET, endpoint.url(&[INFO_PATH]))
            .await?;
        Ok(())
    }

    async fn submit_booking(&self, request: &BookingRequest) -> Result<()> {
        info!(
            user = %request.username,
            cars = request.cars,
            rooms = request.rooms,
            "Received request to book cars and rooms"
        );

        let url = self
            .endpoints
            .get(Service::Booking)
            .url(&request.path_segments());
        self.call(Service::Booking, Method::POST, url).await?;
        Ok(())
    }

    async fn fetch_rows(&self, service: Service) -> Result<Vec<Row>> {
        let url = self.state_url(service)?;
        let response = self.call(service, Method::GET, url.clone()).await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| HarnessError::UnreachableService {
                service,
                url: url.clone(),
                source,
            })?;

        let rows = Row::decode_all(&body).map_err(|e| HarnessError::Decode {
            service,
            url,
            reason: e.to_string(),
        })?;

        info!(%service, rows = rows.len(), "Retrieved data from service");
        for row in &rows {
            debug!(%service, %row, "Retrieved row");
        }
        Ok(rows)
    }

    async fn purge(&self, service: Service) -> Result<()> {
        let url = self.state_url(service)?;
        self.call(service, Method::DELETE, url).await?;
        debug!(%service, "Purged service state");
        Ok(())
    }
}
