//! Process configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Default NWS API base URL.
pub const DEFAULT_NWS_BASE_URL: &str = "https://api.weather.gov";

/// Default outbound user agent. NWS requires a real contact in place of the
/// placeholder address.
pub const DEFAULT_USER_AGENT: &str = "EastCoastWindMap/1.0 (your-email@example.com)";

/// Wind API Server
#[derive(Parser, Debug, Clone)]
#[command(name = "wind-api")]
#[command(about = "Serves current NWS wind data for the East Coast wind map as GeoJSON")]
pub struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5055", env = "WIND_API_LISTEN_ADDR")]
    pub listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// NWS API base URL
    #[arg(long, default_value = DEFAULT_NWS_BASE_URL, env = "NWS_BASE_URL")]
    pub nws_base_url: String,

    /// User-Agent sent upstream; must identify a contact
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "NWS_USER_AGENT")]
    pub user_agent: String,

    /// Concurrent upstream lookups per request
    #[arg(long, default_value_t = 8, env = "WIND_API_UPSTREAM_CONCURRENCY")]
    pub upstream_concurrency: usize,

    /// Timeout for each upstream request, in seconds
    #[arg(long, default_value_t = 10, env = "WIND_API_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: u64,

    /// How long a point's grid URL stays cached, in seconds
    #[arg(long, default_value_t = 86_400, env = "WIND_API_POINTS_TTL_SECS")]
    pub points_ttl_secs: u64,

    /// How long a gridpoint forecast stays cached, in seconds
    #[arg(long, default_value_t = 900, env = "WIND_API_FORECAST_TTL_SECS")]
    pub forecast_ttl_secs: u64,

    /// Directory of frontend assets served for unmatched paths
    #[arg(long, env = "WIND_API_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long, env = "WIND_API_WORKER_THREADS")]
    pub worker_threads: Option<usize>,
}

impl Args {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

/// True when `user_agent` carries no usable contact: empty, or still using
/// a reserved example domain.
pub fn is_placeholder_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.trim().to_ascii_lowercase();
    ua.is_empty() || ua.contains("example.com") || ua.contains("example.org")
}
