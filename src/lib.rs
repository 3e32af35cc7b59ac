//! # Model Bench
//!
//! HTTP service that accepts an uploaded model file and returns a
//! synthesized benchmark report. Nothing is loaded or executed: the format is
//! taken from the file extension, the numbers come from a static spec table,
//! and the latency gets a little random jitter.
//!
//! ## Modules
//!
//! - [`benchmark`]: spec table, filename parsing and report synthesis
//! - [`routes`]: axum handlers and router assembly
//! - [`state`]: server configuration and shared state
//! - [`utils`]: errors, logging and unit helpers

pub mod benchmark;
pub mod routes;
pub mod state;
pub mod utils;

pub use benchmark::{synthesize, BenchmarkResult, JitterSource, ModelSpec, SpecTable};
pub use routes::build_router;
pub use state::{AppState, ServerConfig, SharedState};
pub use utils::{BenchError, Result};
