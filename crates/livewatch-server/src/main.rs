use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use livewatch_server::app;
use livewatch_server::config::ServerConfig;
use livewatch_server::pipeline;
use livewatch_server::state::{self, AppState};

const DEFAULT_CONFIG_PATH: &str = "config/server.toml";

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  livewatch-server [config.toml]    Start the server (default: {DEFAULT_CONFIG_PATH})");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LIVEWATCH_HTTP_PORT               Override http_port");
    eprintln!("  LIVEWATCH_MOCK                    true: simulated data, false: feed.source_url");
    eprintln!("  RUST_LOG                          Log filter (default livewatch=info)");
}

#[tokio::main]
async fn main() -> Result<()> {
    livewatch_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("livewatch=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        path => run_server(path.unwrap_or(DEFAULT_CONFIG_PATH)).await,
    }
}

async fn run_server(config_path: &str) -> Result<()> {
    let mut config = ServerConfig::load_or_default(config_path)?;
    config.apply_env_overrides()?;

    tracing::info!(
        http_port = config.http_port,
        mock = config.feed.mock,
        locale = %config.locale,
        interval_ms = config.feed.update_interval_ms,
        "livewatch-server starting"
    );

    let source = state::build_source(&config)?;
    let autostart = config.feed.autostart;
    let http_port = config.http_port;
    let state = AppState::build(config, source)?;

    let pipeline_handle = pipeline::spawn(state.clone());

    // Initial load; a failure surfaces as a toast and the server keeps going.
    if let Err(e) = state.feed.refresh(None).await {
        tracing::warn!(error = %e, "Initial metrics load failed");
    }
    if autostart {
        state.feed.start_periodic_update();
    }

    let http_addr: SocketAddr = format!("0.0.0.0:{http_port}").parse()?;
    let app = app::build_http_app(state.clone());
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(http = %http_addr, "Server started");

    let result = axum::serve(
        http_listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        signal::ctrl_c().await.ok();
        tracing::info!("Shutting down gracefully");
    })
    .await;

    if let Err(e) = result {
        tracing::error!(error = %e, "HTTP server error");
    }

    state.feed.stop_periodic_update();
    pipeline_handle.abort();
    tracing::info!("Server stopped");

    Ok(())
}
