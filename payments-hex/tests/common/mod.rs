//! Shared setup for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use http_body_util::BodyExt;

use payment_providers::{ProviderSettings, SimulatedBehavior, simulated_providers};
use payments_hex::{EventBus, PaymentService, ProviderRegistry, inbound::HttpServer};
use payments_repo::InMemoryRepo;

/// Stripe approves, Paypal declines.
pub fn deterministic_settings() -> ProviderSettings {
    ProviderSettings {
        stripe: SimulatedBehavior::AlwaysApprove,
        paypal: SimulatedBehavior::AlwaysDecline,
        ..Default::default()
    }
}

pub fn service(bus: EventBus) -> Arc<PaymentService<InMemoryRepo>> {
    let registry = ProviderRegistry::new(simulated_providers(&deterministic_settings())).unwrap();
    Arc::new(PaymentService::new(InMemoryRepo::new(), registry, bus))
}

pub fn server(requests_per_minute: u32) -> HttpServer<InMemoryRepo> {
    HttpServer::with_rate_limit(service(EventBus::new()), requests_per_minute)
}

pub fn create_payment_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/payments")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
