//! Application state for the benchmark server
//!
//! Holds configuration, the spec table and the jitter source. Everything here
//! is read-only once the server starts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::benchmark::{JitterSource, RandomJitter, SpecTable};

/// Origins allowed by default (local frontend dev servers)
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3001",
    "http://127.0.0.1:58249",
    "http://127.0.0.1:58803",
];

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime (seconds)
    pub cors_max_age_secs: u64,
    /// Directory for temporary upload files
    pub upload_dir: PathBuf,
    /// Largest accepted request body (bytes)
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            cors_max_age_secs: 3600,
            upload_dir: std::env::temp_dir(),
            max_upload_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Model spec lookup table
    pub specs: SpecTable,
    /// Latency variance source
    pub jitter: Arc<dyn JitterSource>,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, specs: SpecTable) -> Self {
        Self {
            config,
            specs,
            jitter: Arc::new(RandomJitter),
            started_at: Instant::now(),
        }
    }

    /// Replace the jitter source
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
