use crate::handlers::{self, AppState};
use crate::openapi::{serve_openapi_spec, serve_swagger_ui};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Maximum accepted request body: human payloads are tiny.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the full HTTP application.
///
/// Inbound requests are rate limited per client IP (10 req/s, burst 20);
/// the health check bypasses the limiter.
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    let protected_routes = Router::new()
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        // Human records
        .route(
            "/humans",
            get(handlers::get_humans)
                .post(handlers::add_human)
                .patch(handlers::update_human)
                .delete(handlers::delete_human),
        )
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}
