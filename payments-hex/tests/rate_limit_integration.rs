//! Integration tests for rate limiting middleware.
//!
//! These tests verify the HTTP-level behavior of rate limiting,
//! including 429 responses and proper integration with the middleware stack.

mod common;

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use common::{get_request, json_body, server, service};
use payments_hex::{EventBus, inbound::HttpServer, inbound::RateLimiterState};

/// Provider listing as seen from one peer address.
fn api_request(peer: [u8; 4]) -> Request<Body> {
    Request::builder()
        .uri("/api/providers")
        .extension(ConnectInfo(SocketAddr::from((peer, 40_000))))
        .body(Body::empty())
        .unwrap()
}

/// Same, with an `X-Forwarded-For` header attached.
fn forwarded_request(peer: [u8; 4], forwarded_for: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/providers")
        .header("X-Forwarded-For", forwarded_for)
        .extension(ConnectInfo(SocketAddr::from((peer, 40_000))))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    // Create server with only 3 requests allowed per minute
    let app = server(3).router();

    for i in 1..=3 {
        let response = app.clone().oneshot(api_request([198, 51, 100, 1])).await.unwrap();
        assert_ne!(
            response.status(),
            StatusCode::TOO_MANY_REQUESTS,
            "Request {} should not be rate limited (quota not yet exceeded)",
            i
        );
    }

    // 4th request should be rate limited
    let response = app.clone().oneshot(api_request([198, 51, 100, 1])).await.unwrap();

    assert_eq!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS,
        "Request should be rate limited after exceeding quota"
    );

    let json = json_body(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded")
    );
    let retry_after = json["retry_after_seconds"].as_u64().unwrap();
    assert!((1..=60).contains(&retry_after));
}

#[tokio::test]
async fn test_rate_limiting_health_endpoint_bypassed() {
    let app = server(1).router();

    // Health endpoint bypasses rate limiting entirely
    for _ in 0..10 {
        let response = app.clone().oneshot(get_request("/health")).await.unwrap();

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Health endpoint should not be rate limited"
        );
    }
}

#[tokio::test]
async fn test_rate_limiting_per_client_isolation() {
    let app = server(1).router();

    let response = app.clone().oneshot(api_request([198, 51, 100, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Client A request 1 should succeed");

    let response = app.clone().oneshot(api_request([198, 51, 100, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Client B has its own quota
    let response = app.clone().oneshot(api_request([198, 51, 100, 2])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Client B should have its own quota");
}

#[tokio::test]
async fn test_rotating_forwarded_header_does_not_bypass_limit() {
    let app = server(2).router();

    let mut allowed = 0;
    for i in 0..20 {
        let response = app
            .clone()
            .oneshot(forwarded_request([198, 51, 100, 7], &format!("10.0.0.{}", i)))
            .await
            .unwrap();
        if response.status() == StatusCode::OK {
            allowed += 1;
        }
    }

    assert_eq!(allowed, 2);
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_address() {
    let limiter = RateLimiterState::new(1, std::time::Duration::from_secs(60))
        .with_trusted_proxies(["10.0.0.1".parse().unwrap()]);
    let app = HttpServer::with_rate_limiter(service(EventBus::new()), limiter).router();

    let first = app
        .clone()
        .oneshot(forwarded_request([10, 0, 0, 1], "203.0.113.1"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let repeat = app
        .clone()
        .oneshot(forwarded_request([10, 0, 0, 1], "203.0.113.1"))
        .await
        .unwrap();
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_client = app
        .clone()
        .oneshot(forwarded_request([10, 0, 0, 1], "203.0.113.2"))
        .await
        .unwrap();
    assert_eq!(other_client.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_requests_without_peer_share_quota() {
    let app = server(1).router();

    let first = app.clone().oneshot(get_request("/api/providers")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(get_request("/api/providers")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // Verify headers
    let content_type = second.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("application/json"));
}
