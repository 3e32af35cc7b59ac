//! Error Handling Module
//!
//! Defines the error type for benchmark requests and startup configuration.
//! Uses thiserror for ergonomic error definitions, and renders request errors
//! as `{"detail": ...}` JSON bodies.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for model benchmark operations
#[derive(Error, Debug)]
pub enum BenchError {
    /// Container format has no entry in the spec table
    #[error("Unsupported model type: {0}")]
    UnsupportedFormat(String),

    /// Any other failure while handling an upload; message passed through as-is
    #[error("{0}")]
    Processing(String),

    /// IO error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Invalid spec table or server configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Spec table file could not be read
    #[error("Failed to read spec table at '{0}': {1}")]
    SpecTableLoad(PathBuf, String),
}

impl BenchError {
    /// Create a processing error from any displayable message
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }

    /// HTTP status for this error.
    ///
    /// Every failure a request can hit is reported as a client error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::Processing(_) | Self::Io(_) => "processing_error",
            Self::Config(_) | Self::SpecTableLoad(..) => "config_error",
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for BenchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();

        tracing::warn!(kind = self.kind(), error = %detail, "Upload rejected");

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Convenience Result type for model benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;
