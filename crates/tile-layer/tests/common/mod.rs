//! Stub tile sources shared by the tile-layer integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tile_layer::{ManualClock, TileRequest, TileSource};
use wind_common::{WindError, WindFeature, WindFeatureCollection, WindProperties, WindResult};

/// Tile source that records every request and answers with one feature at
/// the requested center.
#[derive(Default)]
pub struct CountingSource {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<TileRequest>>,
    pub fail: bool,
    /// Requests south of this latitude are delayed.
    pub slow_below_lat: Option<f64>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow_below(lat: f64) -> Self {
        Self {
            slow_below_lat: Some(lat),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TileRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TileSource for CountingSource {
    async fn fetch_tile(&self, request: &TileRequest) -> WindResult<WindFeatureCollection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(*request);

        if let Some(lat) = self.slow_below_lat {
            if request.center.lat < lat {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
        }

        if self.fail {
            return Err(WindError::Upstream {
                status: 502,
                url: "http://stub/nws/forecast/windgrid".to_string(),
            });
        }

        Ok(WindFeatureCollection::new(vec![WindFeature::point(
            request.center.lon,
            request.center.lat,
            WindProperties::from_knots(12.0, Some(270.0)),
        )]))
    }
}

pub fn clock_at(hour: u32, minute: u32) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap(),
    ))
}
