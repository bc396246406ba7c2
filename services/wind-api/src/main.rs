//! Wind API Server
//!
//! Backend adapter for the East Coast wind map.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use wind_api::config::{is_placeholder_user_agent, Args};
use wind_api::routes::build_router;
use wind_api::state::AppState;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting wind API server");

    if is_placeholder_user_agent(&args.user_agent) {
        warn!(
            user_agent = %args.user_agent,
            "NWS user agent has no real contact; upstream may reject requests and no wind will be returned"
        );
    }

    let state = Arc::new(
        AppState::from_args(&args)
            .context("Failed to initialize application state")?
            .with_prometheus(prometheus),
    );

    if let Some(dir) = &args.static_dir {
        info!(static_dir = %dir.display(), "Serving static assets");
    }

    let app = build_router(state, args.static_dir.clone());

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", args.listen))?;

    info!(
        %addr,
        nws_base_url = %args.nws_base_url,
        upstream_concurrency = args.upstream_concurrency,
        "Wind API listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
