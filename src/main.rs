//! Model Benchmark Server
//!
//! HTTP API that accepts model uploads and returns synthesized benchmark
//! reports.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use model_bench::benchmark::{SeededJitter, SpecTable};
use model_bench::routes::build_router;
use model_bench::state::{AppState, ServerConfig};
use model_bench::utils::logging::{init_logging, LogConfig, LogLevel};

/// Model Benchmark Server
#[derive(Parser, Debug)]
#[command(name = "model-bench-server")]
#[command(version)]
#[command(about = "HTTP API returning synthetic benchmark reports for uploaded models")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "MODEL_BENCH_PORT", default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "MODEL_BENCH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Origins allowed for cross-origin requests (comma separated)
    #[arg(long, env = "MODEL_BENCH_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Option<Vec<String>>,

    /// Directory for temporary upload files
    #[arg(long, env = "MODEL_BENCH_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Maximum upload size in megabytes
    #[arg(long, env = "MODEL_BENCH_MAX_UPLOAD_MB", default_value = "1024")]
    max_upload_mb: usize,

    /// JSON file replacing the built-in spec table
    #[arg(long, env = "MODEL_BENCH_SPEC_TABLE")]
    spec_table: Option<PathBuf>,

    /// Seed the latency jitter for reproducible reports
    #[arg(long)]
    seed: Option<u64>,

    /// Log level
    #[arg(long, env = "MODEL_BENCH_LOG_LEVEL", value_enum, ignore_case = true, default_value = "info")]
    log_level: LogLevel,

    /// Plain log output without colors
    #[arg(long, default_value = "false")]
    plain: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        let base = if cli.plain {
            LogConfig::production()
        } else {
            LogConfig::default()
        };
        LogConfig {
            level: cli.log_level,
            ..base
        }
    };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    // Build configuration
    let mut config = ServerConfig {
        host: cli.host,
        port: cli.port,
        max_upload_bytes: cli.max_upload_mb.saturating_mul(1024 * 1024),
        ..ServerConfig::default()
    };

    if let Some(origins) = cli.allowed_origins {
        config.allowed_origins = origins;
    }

    if let Some(upload_dir) = cli.upload_dir {
        config.upload_dir = upload_dir;
    }

    let specs = match &cli.spec_table {
        Some(path) => SpecTable::from_json_file(path)
            .with_context(|| format!("loading spec table {:?}", path))?,
        None => SpecTable::builtin(),
    };

    info!("Model Benchmark Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Upload dir:      {:?}", config.upload_dir);
    info!("  Max upload:      {} MB", cli.max_upload_mb);
    info!("  Allowed origins: {}", config.allowed_origins.join(", "));
    info!("  Formats:         {}", specs.formats().collect::<Vec<_>>().join(", "));

    if !config.upload_dir.is_dir() {
        warn!(
            "Upload directory {:?} does not exist. Uploads will fail.",
            config.upload_dir
        );
    }

    let mut state = AppState::new(config.clone(), specs);
    if let Some(seed) = cli.seed {
        info!("  Jitter seed:     {}", seed);
        state = state.with_jitter(Arc::new(SeededJitter::new(seed)));
    }

    let app = build_router(Arc::new(state))?;

    // Start server
    let listener = bind_listener(&config.host, config.port).await?;
    info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Bind a host name or IP literal (IPv6 unbracketed) and port
async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding {}:{}", host, port))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsed_by_clap() {
        let cli = Cli::try_parse_from(["model-bench-server", "--log-level", "DEBUG"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);

        let cli = Cli::try_parse_from(["model-bench-server", "--log-level", "warning"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(Cli::try_parse_from(["model-bench-server", "--log-level", "loud"]).is_err());
    }

    #[tokio::test]
    async fn test_bind_accepts_host_names() {
        let listener = bind_listener("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());

        let listener = bind_listener("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
