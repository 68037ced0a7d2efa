//! Security headers middleware

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};

/// CSP for JSON API responses
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

/// CSP for the static browser UI, which loads Mermaid and its styles from a
/// CDN and web fonts from Google Fonts
const UI_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
     style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
     img-src 'self' data: https:; \
     font-src 'self' https://fonts.gstatic.com; \
     connect-src 'self'; \
     object-src 'none'; \
     media-src 'self'; \
     frame-src 'none'; \
     frame-ancestors 'none'";

/// Add security headers to every response
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let is_api_path = is_api_path(request.uri().path());
    let mut response = next.run(request).await;

    apply_security_headers(response.headers_mut(), is_api_path);

    response
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn apply_security_headers(headers: &mut HeaderMap, is_api_path: bool) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let csp = if is_api_path { API_CSP } else { UI_CSP };
    headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(csp));

    // API responses reflect the live index and must not be cached.
    if is_api_path && !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        );
    }
}
