use crate::handlers::{auth_handler, auth_handler::AppState, jwks_handler};
use crate::middleware::http_metrics_middleware;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Build the service router.
///
/// Method routing is exact: `/auth` only accepts POST and the JWKS path only
/// accepts GET. Any other method gets 405 Method Not Allowed from the router
/// without reaching a handler.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let app_routes = Router::new()
        .route("/auth", post(auth_handler::handle_auth))
        // JWKS endpoint (RFC 8414 well-known path)
        .route("/.well-known/jwks.json", get(jwks_handler::handle_get_jwks))
        .with_state(state);

    let ops_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        );

    app_routes
        .merge(ops_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}

async fn health_check() -> &'static str {
    "OK"
}
