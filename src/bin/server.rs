// Subscription API server entry point.

use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use subscriptions::db;
use subscriptions::server::config::ServerConfig;
use subscriptions::version::VERSION;
use subscriptions::web::{AppState, create_axum_router};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info,sea_orm=warn` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C.");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to listen for SIGTERM."),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Manually check for --version before full parsing to keep the output to a single line.
    if std::env::args().any(|arg| arg == "--version") {
        println!("Server version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();

    // --- Server Config Setup ---
    let server_config = ServerConfig::load(args.config.as_deref())?;

    init_logging(&server_config.log_dir);
    info!("Starting subscription server, version: {}", VERSION);

    // --- Database Setup ---
    let store = match db::connect_store(&server_config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to connect to the subscription store.");
            return Err(e.into());
        }
    };

    // --- HTTP Server Setup ---
    let app_state = Arc::new(AppState::new(store, &server_config));
    let app = create_axum_router(app_state);

    let listener = TcpListener::bind(server_config.listen_addr.as_str()).await?;
    info!(addr = %server_config.listen_addr, "HTTP server listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}
