//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::{generate, health, study, upload};
use crate::middleware::logging::{log_request, REQUEST_ID_HEADER, TRACE_ID_HEADER};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.settings.max_upload_bytes;

    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness))
        .route("/liveness", get(health::liveness));

    // Uploads get their own body limit; axum's 2 MB default applies elsewhere
    let upload_routes = Router::new()
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));

    let api_routes = Router::new()
        .route("/generate", post(generate::generate))
        .route("/study", post(study::study))
        .route("/learning-styles", get(study::learning_styles))
        .merge(upload_routes);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        // Apply middleware layers (last added = outermost = runs first)
        .layer(create_cors_layer())
        // Custom request logging with trace IDs
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Create CORS layer with permissive settings for the browser front end
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(TRACE_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}
