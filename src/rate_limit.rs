//! Per-IP quota enforced before any handler runs: 50 requests per
//! 10-second window, counted in Redis. The window key is created with
//! its TTL already set (SET NX EX) and incremented in the same
//! pipeline, so a dropped connection cannot leave a counter that never
//! expires. Over-quota requests are rejected with 429, never queued.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{error::AppError, state::AppState};

pub const MAX_REQUESTS_PER_WINDOW: i64 = 50;
pub const WINDOW_SECS: i64 = 10;

pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(request.headers(), peer);
    let key = window_key(&ip);

    let mut conn = state.cache.connection();
    let (count,): (i64,) = window_pipeline(&key).query_async(&mut conn).await?;

    if count > MAX_REQUESTS_PER_WINDOW {
        warn!("Rate limit exceeded for IP: {ip}");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}

/// First hop of `x-forwarded-for` when present (the service sits behind
/// a reverse proxy), otherwise the peer address.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

fn window_key(ip: &str) -> String {
    format!("ratelimit:{ip}")
}

/// `SET key 0 NX EX window` then `INCR`, packed together. The key gets
/// its expiry at creation, before the count can ever exceed the quota.
fn window_pipeline(key: &str) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.cmd("SET")
        .arg(key)
        .arg(0)
        .arg("NX")
        .arg("EX")
        .arg(WINDOW_SECS)
        .ignore()
        .incr(key, 1);
    pipe
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.1.2.3:55000".parse().unwrap()
    }

    #[test]
    fn forwarded_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        assert_eq!(client_ip(&headers, peer()), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_peer_address() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "10.1.2.3");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&headers, peer()), "10.1.2.3");
    }

    #[test]
    fn window_keys_are_scoped_per_ip() {
        assert_eq!(window_key("203.0.113.9"), "ratelimit:203.0.113.9");
        assert_ne!(window_key("203.0.113.9"), window_key("203.0.113.10"));
    }

    #[test]
    fn counter_expiry_is_set_before_increment() {
        let packed = window_pipeline("ratelimit:203.0.113.9").get_packed_pipeline();
        let wire = String::from_utf8_lossy(&packed);

        let set = wire.find("SET").unwrap();
        let incr = wire.find("INCRBY").unwrap();
        assert!(set < incr);
        assert!(wire.contains("NX"));
        assert!(wire.contains("EX"));
    }
}
