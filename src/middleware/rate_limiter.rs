use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use axum::{
    middleware::Next,
    response::{IntoResponse, Response},
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
};
use crate::utils::api_response::ResponseBuilder;
use crate::config::AppState;

/// Sliding-window limiter keyed by client address.
pub struct RateLimiter {
    requests: RwLock<HashMap<String, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub async fn check_rate_limit(&self, identifier: &str) -> bool {
        let mut requests = self.requests.write().await;
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window).unwrap_or(now);

        // Drop clients whose whole history has aged out
        requests.retain(|_, hits| hits.last().is_some_and(|&t| t > cutoff));

        let hits = requests.entry(identifier.to_string()).or_default();
        hits.retain(|&t| t > cutoff);

        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push(now);
        true
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let identifier = client_identifier(&request, state.config.trust_forwarded_for);

    if !state.rate_limiter.check_rate_limit(&identifier).await {
        tracing::debug!(client = %identifier, "rate limit exceeded");
        return ResponseBuilder::error::<()>(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT_EXCEEDED",
            "Too many requests. Please try again later.",
        ).into_response();
    }

    next.run(request).await
}

/// Peer address of the connection, or the first `X-Forwarded-For` hop when
/// the deployment sits behind a trusted proxy.
fn client_identifier(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(client) = forwarded {
            return client.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(forwarded: Option<&str>, peer: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(addr) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        }
        request
    }

    #[test]
    fn ignores_forwarded_header_unless_trusted() {
        let req = request(Some("9.9.9.9, 10.0.0.1"), Some("203.0.113.7:5000"));
        assert_eq!(client_identifier(&req, false), "203.0.113.7");
        assert_eq!(client_identifier(&req, true), "9.9.9.9");
    }

    #[test]
    fn falls_back_to_peer_then_unknown() {
        let req = request(None, Some("203.0.113.7:5000"));
        assert_eq!(client_identifier(&req, true), "203.0.113.7");
        assert_eq!(client_identifier(&request(None, None), false), "unknown");
    }

    #[tokio::test]
    async fn blocks_after_max_requests() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check_rate_limit("1.2.3.4").await);
        assert!(limiter.check_rate_limit("1.2.3.4").await);
        assert!(!limiter.check_rate_limit("1.2.3.4").await);
        assert!(limiter.check_rate_limit("5.6.7.8").await);
    }

    #[tokio::test]
    async fn window_expiry_frees_slots() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check_rate_limit("a").await);
        assert!(!limiter.check_rate_limit("a").await);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.check_rate_limit("a").await);
    }
}
