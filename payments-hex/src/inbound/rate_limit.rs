//! Rate limiting middleware using Governor.
//!
//! Implements per-client rate limiting with a token bucket algorithm. Clients
//! are told apart by their peer address. `X-Forwarded-For` is honoured only
//! when the peer is a configured trusted proxy.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    DefaultKeyedRateLimiter, Quota, RateLimiter,
    clock::{Clock, DefaultClock},
};
use serde_json::json;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

/// Bucket shared by requests that carry no peer address.
const UNKNOWN_PEER: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
    trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state.
    ///
    /// # Arguments
    /// * `requests` - Number of requests allowed per period
    /// * `period` - Time period for the quota
    ///
    /// A zero `requests` or `period` is clamped to one.
    pub fn new(requests: u32, period: Duration) -> Self {
        let period = period.max(Duration::from_nanos(1));
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period / burst.get())
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::dashmap(quota),
            clock: DefaultClock::default(),
            trusted_proxies: Vec::new(),
        }
    }

    /// Peers allowed to report the client address in `X-Forwarded-For`.
    pub fn with_trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies = proxies.into_iter().collect();
        self
    }

    /// Checks one request from `client`.
    ///
    /// Returns `Err(retry_after)` when the client is over its quota.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Drops buckets that have fully refilled.
    pub fn evict_idle(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Resolves the client address for a request arriving from `peer`.
    ///
    /// Behind a trusted proxy the right-most untrusted `X-Forwarded-For`
    /// entry wins; otherwise the peer itself is the client.
    pub fn client_ip(&self, peer: Option<IpAddr>, headers: &HeaderMap) -> IpAddr {
        let Some(peer) = peer else {
            return UNKNOWN_PEER;
        };
        if !self.trusted_proxies.contains(&peer) {
            return peer;
        }

        headers
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|value| {
                value
                    .rsplit(',')
                    .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
                    .find(|ip| !self.trusted_proxies.contains(ip))
            })
            .unwrap_or(peer)
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = limiter.client_ip(peer, request.headers());

    if let Err(retry_after) = limiter.check(client) {
        let retry_after_seconds = retry_after.as_secs().max(1);
        tracing::warn!(%client, retry_after_seconds, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": retry_after_seconds
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", value.parse().unwrap());
        headers
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded_header() {
        let limiter = RateLimiterState::default();

        let client = limiter.client_ip(Some(ip("198.51.100.9")), &forwarded("10.0.0.1"));

        assert_eq!(client, ip("198.51.100.9"));
    }

    #[test]
    fn test_trusted_proxy_uses_rightmost_untrusted_hop() {
        let limiter =
            RateLimiterState::default().with_trusted_proxies([ip("10.0.0.1"), ip("10.0.0.2")]);

        let client = limiter.client_ip(
            Some(ip("10.0.0.1")),
            &forwarded("203.0.113.50, 203.0.113.7, 10.0.0.2"),
        );

        assert_eq!(client, ip("203.0.113.7"));
    }

    #[test]
    fn test_trusted_proxy_without_usable_header_is_the_client() {
        let limiter = RateLimiterState::default().with_trusted_proxies([ip("10.0.0.1")]);

        assert_eq!(
            limiter.client_ip(Some(ip("10.0.0.1")), &HeaderMap::new()),
            ip("10.0.0.1")
        );
        assert_eq!(
            limiter.client_ip(Some(ip("10.0.0.1")), &forwarded("not-an-ip")),
            ip("10.0.0.1")
        );
    }

    #[test]
    fn test_missing_peer_shares_one_bucket() {
        let limiter = RateLimiterState::default();

        assert_eq!(limiter.client_ip(None, &forwarded("203.0.113.7")), UNKNOWN_PEER);
    }

    #[test]
    fn test_quota_exhausted_per_key() {
        let limiter = RateLimiterState::new(2, Duration::from_secs(60));

        assert!(limiter.check(ip("192.0.2.1")).is_ok());
        assert!(limiter.check(ip("192.0.2.1")).is_ok());
        let retry_after = limiter.check(ip("192.0.2.1")).unwrap_err();
        assert!(retry_after > Duration::ZERO);
        assert!(limiter.check(ip("192.0.2.2")).is_ok());
    }

    #[test]
    fn test_idle_clients_are_evicted() {
        let limiter = RateLimiterState::new(1, Duration::from_millis(10));
        limiter.check(ip("192.0.2.1")).unwrap();
        limiter.check(ip("192.0.2.2")).unwrap();
        assert_eq!(limiter.tracked_clients(), 2);

        std::thread::sleep(Duration::from_millis(50));
        limiter.evict_idle();

        assert_eq!(limiter.tracked_clients(), 0);
    }
}
