//! Application state for the Wind API.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Args;
use crate::nws::{NwsClient, WindLookup};

/// Speed at which the served legends saturate.
pub const LEGEND_MAX_KT: f64 = 40.0;

/// Shared application state.
pub struct AppState {
    /// Current-wind lookups (the NWS client in production).
    pub lookup: Arc<dyn WindLookup>,

    /// Upstream lookups in flight per request.
    pub upstream_concurrency: usize,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(lookup: Arc<dyn WindLookup>, upstream_concurrency: usize) -> Self {
        Self {
            lookup,
            upstream_concurrency: upstream_concurrency.max(1),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Create state backed by the NWS API as configured on the command line.
    pub fn from_args(args: &Args) -> Result<Self> {
        let client = NwsClient::new(
            &args.nws_base_url,
            &args.user_agent,
            args.upstream_timeout(),
            std::time::Duration::from_secs(args.points_ttl_secs),
            std::time::Duration::from_secs(args.forecast_ttl_secs),
        )?;

        Ok(Self::new(Arc::new(client), args.upstream_concurrency))
    }
}
