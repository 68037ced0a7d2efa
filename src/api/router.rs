use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, handler::HandlerWithoutStateExt, http::HeaderMap, middleware, routing::get};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::infrastructure::observability::{PrometheusMetrics, create_metrics_router};
use crate::infrastructure::rate_limiter::RateLimiter;
use super::catalog;
use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, rate_limit_middleware, security_headers_middleware,
};
use super::state::AppState;
use super::types::{ApiError, LenientQuery};
use super::ui::{self, IndexParams};

/// Optional parts of the HTTP surface
#[derive(Default)]
pub struct RouterOptions {
    /// Directory served for every path no route matches
    pub static_dir: Option<PathBuf>,
    /// Prometheus handle and the path to expose it on
    pub metrics: Option<(PrometheusMetrics, String)>,
    /// Per-client limiter applied to `/api` routes
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

/// Create the API router without static files, metrics or rate limiting
pub fn create_router_with_state(state: AppState) -> Router {
    create_router(state, RouterOptions::default())
}

/// Create the full application router
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let mut api = catalog::create_catalog_router();
    if let Some(limiter) = options.rate_limiter {
        api = api.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api", api);

    let router = match options.static_dir {
        Some(dir) => {
            let index_dir = dir.clone();
            router
                .route(
                    "/",
                    get(
                        move |LenientQuery(params): LenientQuery<IndexParams>, headers: HeaderMap| {
                            ui::index_page(index_dir.clone(), params, headers)
                        },
                    ),
                )
                .fallback_service(
                    ServeDir::new(dir)
                        .call_fallback_on_method_not_allowed(true)
                        .not_found_service(not_found.into_service()),
                )
        }
        None => router.fallback(not_found),
    };

    let mut router = router
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    if let Some((metrics, path)) = options.metrics {
        router = router.merge(create_metrics_router(metrics, &path));
    }

    router
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
