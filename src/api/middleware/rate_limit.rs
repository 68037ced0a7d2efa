//! Per-client rate limiting middleware

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, HeaderValue, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::types::ApiError;
use crate::infrastructure::observability::record_rate_limited;
use crate::infrastructure::rate_limiter::{RateLimitResult, RateLimiter};

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Key used when the peer address is not available
const UNKNOWN_CLIENT: &str = "unknown";

/// Reject clients that exceeded their request budget with 429
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&request);
    let result = limiter.check_and_record(&client).await;

    let mut response = if result.allowed {
        next.run(request).await
    } else {
        warn!(client = %client, limit = result.limit, "Rate limit exceeded");
        record_rate_limited();

        let mut response =
            ApiError::rate_limited("Too many requests from this IP, please try again later.")
                .into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(result.reset_in_seconds));
        response
    };

    apply_rate_limit_headers(response.headers_mut(), &result);
    response
}

/// Peer IP from the connection, without the port
fn client_key(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn apply_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(result.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(result.remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(result.reset_in_seconds));
}
