//! In-process fakes of the saga services.
//!
//! Each service runs as its own axum server on a random port, all sharing one
//! ledger. The booking front door runs a two-step saga: reserve cars, then
//! reserve hotel rooms. A hotel request above capacity aborts and compensates
//! the car reservation, mirroring what the real orchestrator records.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use saga_acceptance::config::ServiceAddresses;
use saga_acceptance::{HarnessConfig, Service};

/// Rooms the hotel accepts per booking before the saga compensates.
pub const DEFAULT_HOTEL_CAPACITY: u32 = 2;

/// Records held by the fake services.
#[derive(Debug, Default)]
struct Ledger {
    events: Vec<Value>,
    car_bookings: Vec<Value>,
    hotel_bookings: Vec<Value>,
    next_saga: u64,
}

impl Ledger {
    fn records(&self, service: Service) -> Vec<Value> {
        match service {
            Service::Alpha => self.events.clone(),
            Service::Car => self.car_bookings.clone(),
            Service::Hotel => self.hotel_bookings.clone(),
            Service::Booking => Vec::new(),
        }
    }

    fn purge(&mut self, service: Service) {
        match service {
            Service::Alpha => self.events.clear(),
            Service::Car => self.car_bookings.clear(),
            Service::Hotel => self.hotel_bookings.clear(),
            Service::Booking => {}
        }
    }

    fn event(&mut self, service: &str, kind: &str, global_tx: &str, local_tx: Option<&str>) {
        let id = self.events.len() + 1;
        let compensation = match (service, kind) {
            ("car", "TxStartedEvent") => "cancelCar",
            ("hotel", "TxStartedEvent") => "cancelHotel",
            _ => "",
        };
        self.events.push(json!({
            "id": id,
            "serviceName": service,
            "instanceId": format!("{service}-1"),
            "globalTxId": global_tx,
            "localTxId": local_tx.unwrap_or(global_tx),
            "parentTxId": local_tx.map(|_| global_tx),
            "type": kind,
            "compensationMethod": compensation,
        }));
    }

    fn reserve(bookings: &mut Vec<Value>, name: &str, amount: u32) -> usize {
        let id = bookings.len() + 1;
        bookings.push(json!({
            "id": id,
            "name": name,
            "amount": amount,
            "confirmed": true,
            "cancelled": false,
        }));
        id - 1
    }

    fn run_saga(&mut self, name: &str, rooms: u32, cars: u32, hotel_capacity: u32) {
        self.next_saga += 1;
        let global_tx = format!("saga-{}", self.next_saga);
        let car_tx = format!("{global_tx}-car");
        let hotel_tx = format!("{global_tx}-hotel");

        self.event("booking", "SagaStartedEvent", &global_tx, None);

        self.event("car", "TxStartedEvent", &global_tx, Some(&car_tx));
        let car = Self::reserve(&mut self.car_bookings, name, cars);
        self.event("car", "TxEndedEvent", &global_tx, Some(&car_tx));

        self.event("hotel", "TxStartedEvent", &global_tx, Some(&hotel_tx));
        if rooms > hotel_capacity {
            self.event("hotel", "TxAbortedEvent", &global_tx, Some(&hotel_tx));
            self.car_bookings[car]["confirmed"] = json!(false);
            self.car_bookings[car]["cancelled"] = json!(true);
            self.event("car", "TxCompensatedEvent", &global_tx, Some(&car_tx));
        } else {
            Self::reserve(&mut self.hotel_bookings, name, rooms);
            self.event("hotel", "TxEndedEvent", &global_tx, Some(&hotel_tx));
        }

        self.event("booking", "SagaEndedEvent", &global_tx, None);
    }
}

#[derive(Debug)]
struct ClusterState {
    ledger: RwLock<Ledger>,
    unhealthy: RwLock<HashSet<Service>>,
    failing_purges: RwLock<HashSet<Service>>,
    hotel_capacity: RwLock<u32>,
    settle_delay: RwLock<Duration>,
}

/// Handler state: the shared cluster plus the service a server plays.
#[derive(Clone)]
struct Node {
    cluster: Arc<ClusterState>,
    service: Service,
}

/// Four fake services on random local ports.
pub struct FakeCluster {
    state: Arc<ClusterState>,
    alpha: SocketAddr,
    car: SocketAddr,
    hotel: SocketAddr,
    booking: SocketAddr,
    _handles: Vec<JoinHandle<()>>,
}

impl FakeCluster {
    pub async fn start() -> Self {
        let state = Arc::new(ClusterState {
            ledger: RwLock::new(Ledger::default()),
            unhealthy: RwLock::new(HashSet::new()),
            failing_purges: RwLock::new(HashSet::new()),
            hotel_capacity: RwLock::new(DEFAULT_HOTEL_CAPACITY),
            settle_delay: RwLock::new(Duration::ZERO),
        });

        let mut handles = Vec::new();
        let serve = |service: Service, router: Router<Node>| {
            let state = state.clone();
            async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind fake service");
                let addr = listener.local_addr().expect("Failed to get local address");
                let app = router.route("/info", get(info)).with_state(Node {
                    cluster: state,
                    service,
                });
                let handle = tokio::spawn(async move {
                    axum::serve(listener, app)
                        .await
                        .expect("Fake service failed");
                });
                (addr, handle)
            }
        };

        let (alpha, h) = serve(
            Service::Alpha,
            Router::new().route("/events", get(list_records).delete(purge_records)),
        )
        .await;
        handles.push(h);
        let (car, h) = serve(
            Service::Car,
            Router::new().route("/bookings", get(list_records).delete(purge_records)),
        )
        .await;
        handles.push(h);
        let (hotel, h) = serve(
            Service::Hotel,
            Router::new().route("/bookings", get(list_records).delete(purge_records)),
        )
        .await;
        handles.push(h);
        let (booking, h) = serve(
            Service::Booking,
            Router::new().route("/booking/:name/:rooms/:cars", post(book)),
        )
        .await;
        handles.push(h);

        Self {
            state,
            alpha,
            car,
            hotel,
            booking,
            _handles: handles,
        }
    }

    pub fn url(&self, service: Service) -> String {
        let addr = match service {
            Service::Alpha => self.alpha,
            Service::Car => self.car,
            Service::Hotel => self.hotel,
            Service::Booking => self.booking,
        };
        format!("http://{addr}")
    }

    pub fn addresses(&self) -> ServiceAddresses {
        ServiceAddresses {
            alpha: self.url(Service::Alpha),
            car: self.url(Service::Car),
            hotel: self.url(Service::Hotel),
            booking: self.url(Service::Booking),
        }
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::with_addresses(self.addresses())
    }

    /// Make `service` answer 503 on every route, or restore it.
    pub async fn set_healthy(&self, service: Service, healthy: bool) {
        let mut unhealthy = self.state.unhealthy.write().await;
        if healthy {
            unhealthy.remove(&service);
        } else {
            unhealthy.insert(service);
        }
    }

    /// Make deletes against `service` answer 500.
    pub async fn fail_purges(&self, service: Service) {
        self.state.failing_purges.write().await.insert(service);
    }

    pub async fn set_hotel_capacity(&self, rooms: u32) {
        *self.state.hotel_capacity.write().await = rooms;
    }

    /// Apply bookings this long after the front door has answered.
    pub async fn set_settle_delay(&self, delay: Duration) {
        *self.state.settle_delay.write().await = delay;
    }

    pub async fn record_count(&self, service: Service) -> usize {
        self.state.ledger.read().await.records(service).len()
    }

    /// Run a booking saga directly, bypassing HTTP.
    pub async fn seed_booking(&self, name: &str, rooms: u32, cars: u32) {
        let capacity = *self.state.hotel_capacity.read().await;
        self.state
            .ledger
            .write()
            .await
            .run_saga(name, rooms, cars, capacity);
    }
}

async fn is_unhealthy(node: &Node) -> bool {
    node.cluster.unhealthy.read().await.contains(&node.service)
}

fn unavailable(service: Service) -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!("{service} is unavailable"),
    )
}

async fn info(State(node): State<Node>) -> (StatusCode, String) {
    if is_unhealthy(&node).await {
        return unavailable(node.service);
    }
    (StatusCode::OK, format!("{} is up", node.service))
}

async fn list_records(
    State(node): State<Node>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    if is_unhealthy(&node).await {
        return Err(unavailable(node.service));
    }
    Ok(Json(node.cluster.ledger.read().await.records(node.service)))
}

async fn purge_records(State(node): State<Node>) -> (StatusCode, String) {
    if is_unhealthy(&node).await {
        return unavailable(node.service);
    }
    if node.cluster.failing_purges.read().await.contains(&node.service) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} refused to purge", node.service),
        );
    }
    node.cluster.ledger.write().await.purge(node.service);
    (StatusCode::OK, String::new())
}

async fn book(
    State(node): State<Node>,
    Path((name, rooms, cars)): Path<(String, u32, u32)>,
) -> (StatusCode, String) {
    if is_unhealthy(&node).await {
        return unavailable(node.service);
    }

    let capacity = *node.cluster.hotel_capacity.read().await;
    let delay = *node.cluster.settle_delay.read().await;
    let cluster = node.cluster.clone();
    let saga = async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        cluster
            .ledger
            .write()
            .await
            .run_saga(&name, rooms, cars, capacity);
    };

    if delay.is_zero() {
        saga.await;
    } else {
        tokio::spawn(saga);
    }
    (StatusCode::OK, "OK".to_string())
}
