//! HTTP routes and router assembly

pub mod health;
pub mod upload;

use std::any::Any;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::{ServerConfig, SharedState};
use crate::utils::{BenchError, Result};

/// Build the application router with tracing, CORS, panic recovery and the
/// upload body limit
pub fn build_router(state: SharedState) -> Result<Router> {
    let cors = cors_layer(&state.config)?;
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let app = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/upload", post(upload::upload_model))
        .route("/upload/", post(upload::upload_model))
        .layer(body_limit)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}

/// Turn a handler panic into the usual 400 `{"detail": ...}` body
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unexpected error while handling request".to_string()
    };

    tracing::error!("Handler panicked: {}", message);
    BenchError::processing(message).into_response()
}

/// Credentialed CORS for the configured origins.
///
/// Methods and request headers are mirrored back since wildcards cannot be
/// combined with credentials.
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(String::as_str)
        .map(parse_origin)
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(config.cors_max_age_secs)))
}

fn parse_origin(origin: &str) -> Result<HeaderValue> {
    let origin = origin.trim();
    if origin == "*" {
        return Err(BenchError::Config(
            "wildcard origin cannot be used with credentials".to_string(),
        ));
    }
    HeaderValue::from_str(origin)
        .map_err(|e| BenchError::Config(format!("invalid origin '{}': {}", origin, e)))
}
