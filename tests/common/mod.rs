//! Shared utilities for integration tests.
//!
//! Every relay here runs against a `MemoryLedger`, so tests can switch the
//! node offline or script the OTPs it hands out.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use otp_relay::config::{LedgerMode, RelayConfig};
use otp_relay::contract::OtpContract;
use otp_relay::ledger::MemoryLedger;
use otp_relay::lifecycle::{app_state, Services, Shutdown};
use otp_relay::HttpServer;

/// Defaults, memory ledger, fixture artifact, ephemeral port.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.ledger.mode = LedgerMode::Memory;
    config.contract.artifact_path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/OTPAuthentication.json"
    )
    .to_string();
    config
}

/// Router plus the fake ledger behind it.
pub fn test_router(config: &RelayConfig) -> (Router, Arc<MemoryLedger>) {
    let contract = Arc::new(OtpContract::load(&config.contract).unwrap());
    let ledger = Arc::new(MemoryLedger::new(contract.clone()));
    let services = Services::new(contract, ledger.clone(), &config.ledger);
    let router = HttpServer::build_router(config, app_state(config, &services));
    (router, ledger)
}

/// A relay served on a real socket.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub ledger: Arc<MemoryLedger>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestRelay {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

pub async fn start_relay(config: RelayConfig) -> TestRelay {
    let contract = Arc::new(OtpContract::load(&config.contract).unwrap());
    let ledger = Arc::new(MemoryLedger::new(contract.clone()));
    let services = Services::new(contract, ledger.clone(), &config.ledger);
    let state = app_state(&config, &services);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestRelay {
        addr,
        ledger,
        shutdown,
        handle,
    }
}

/// Send one request through the router and decode the JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_session(mut request: Request<Body>, session_id: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-session-id", session_id.parse().unwrap());
    request
}
