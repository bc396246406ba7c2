//! Wind Viewer
//!
//! Headless driver for the wind overlay. Reads view changes from stdin,
//! keeps the overlay rendered on every change and on the refresh timer, and
//! writes the layers to an output directory.

mod output;
mod view;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tile_layer::{OverlayConfig, OverlayDriver, ViewState, WindOverlay};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::output::{follow_layers, OutputDir};
use crate::view::parse_view_line;

/// Wind Viewer
#[derive(Parser, Debug)]
#[command(name = "wind-viewer")]
#[command(about = "Renders the East Coast wind overlay for views read from stdin")]
struct Args {
    /// Overlay configuration YAML
    #[arg(short, long, env = "WIND_VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Wind API base URL (overrides the configuration file)
    #[arg(long, env = "WIND_VIEWER_API_URL")]
    api_url: Option<String>,

    /// Directory receiving layers.json and legend.svg
    #[arg(short, long, default_value = "wind-overlay", env = "WIND_VIEWER_OUT")]
    out: PathBuf,

    /// Render the initial view once and exit
    #[arg(long)]
    once: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr; stdin carries views
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => OverlayConfig::default(),
    };
    if let Some(url) = &args.api_url {
        config.proxy_base_url = url.clone();
    }

    info!(
        api_url = %config.proxy_base_url,
        data_mode = ?config.data_mode,
        out = %args.out.display(),
        "Starting wind viewer"
    );

    let out = Arc::new(OutputDir::create(&args.out).await?);
    out.write_legend(config.palette_ramp.build(config.max_kt).as_ref())
        .await?;

    let initial = ViewState::initial(&config);
    let overlay = Arc::new(WindOverlay::from_config(config).context("Failed to build overlay")?);

    if args.once {
        let layers = overlay.refresh(&initial).await;
        out.write_layers(&layers).await?;
        info!(features = layers.feature_count, "Rendered once");
        return Ok(());
    }

    let (view_tx, view_rx) = watch::channel(initial);
    let reader = tokio::spawn(read_views(view_tx));
    let writer = tokio::spawn(follow_layers(overlay.subscribe(), Arc::clone(&out)));

    OverlayDriver::new(Arc::clone(&overlay)).run(view_rx).await;

    // The driver only stops once stdin is exhausted. Dropping the last overlay
    // handle closes the layer channel, so the writer flushes the final layers
    // and returns.
    let last_generation = overlay.layers().generation;
    drop(overlay);
    if let Err(e) = reader.await {
        warn!(error = %e, "View reader task failed");
    }
    writer.await.context("Layer writer task failed")?;
    info!(generation = last_generation, "Wind viewer finished");
    Ok(())
}

/// Forward stdin views until EOF; dropping the sender stops the driver.
async fn read_views(views: watch::Sender<ViewState>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_view_line(&line) {
                Ok(Some(view)) => {
                    info!(zoom = view.zoom, "View changed");
                    if views.send(view).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(line = %line, error = %e, "Ignoring malformed view"),
            },
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                break;
            }
        }
    }
}
