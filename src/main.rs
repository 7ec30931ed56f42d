//! ViewPost entry point.
//!
//! Parses arguments, loads configuration, initializes tracing, builds the router
//! around the host metrics collector and starts the HTTP server.

use clap::Parser;

use viewpost::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER, LISTEN_HELP};
use viewpost::http::start_server;
use viewpost::logging::init_logging;
use viewpost::{create_router, AppState};

/// ViewPost: host health reporting and synthetic load for load balancer tests
#[derive(Parser, Debug)]
#[command(name = "viewpost", version, about, after_help = LISTEN_HELP)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "viewpost=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the listen port from the configuration file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration before logging so the log file destination is known
    let mut config = AppConfig::load_or_default(&args.config)?;
    if let Some(port) = args.port {
        config.http.port = port;
        config.validate()?;
    }

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let _log_guard = init_logging(&config, &log_filter)?;

    tracing::info!(
        config = %args.config,
        cpu_sample_ms = config.metrics.cpu_sample_ms,
        disk_mount = %config.metrics.disk_mount,
        check_disk = config.health.check_disk,
        testing = config.app.testing,
        "Loaded configuration"
    );

    if config.app.uses_default_secret() && !config.app.testing {
        tracing::warn!("SECRET_KEY not set; using the built-in development key");
    }

    let state = AppState::new(config.clone());
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
