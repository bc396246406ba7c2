//! National Weather Service API client.
//!
//! Current wind at a point takes two upstream calls:
//!
//! 1. `GET /points/{lat},{lon}` resolves the point to its forecast office
//!    grid (`properties.forecastGridData`).
//! 2. `GET {forecastGridData}` returns the raw gridpoint forecast, whose
//!    `windSpeed` and `windDirection` series are time-stamped with
//!    `validTime` intervals.
//!
//! Both responses are cached, so neighboring points in the same grid cell
//! and overlapping tiles share upstream calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use wind_common::{to_knots, LatLon, ValidInterval, WindError, WindResult};

use crate::cache::TtlCache;

const GEO_JSON: &str = "application/geo+json";

const POINTS_CACHE_CAPACITY: usize = 10_000;
const FORECAST_CACHE_CAPACITY: usize = 1_000;

// ============================================================================
// Upstream models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    #[serde(rename = "forecastGridData")]
    pub forecast_grid_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GridpointResponse {
    pub properties: GridpointProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridpointProperties {
    #[serde(rename = "windSpeed", default)]
    pub wind_speed: GridSeries,
    #[serde(rename = "windDirection", default)]
    pub wind_direction: GridSeries,
}

/// A gridpoint time series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridSeries {
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default)]
    pub values: Vec<GridValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridValue {
    #[serde(rename = "validTime", default)]
    pub valid_time: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl GridSeries {
    /// Value of the first entry whose validity interval contains `now`.
    /// Entries with malformed or zero-length intervals are skipped.
    pub fn value_at(&self, now: DateTime<Utc>) -> Option<f64> {
        self.values
            .iter()
            .find(|v| ValidInterval::parse(&v.valid_time).is_some_and(|i| i.contains(now)))
            .and_then(|v| v.value)
    }
}

impl GridpointProperties {
    /// Current wind from the forecast, if a speed is known at `now`.
    pub fn wind_at(&self, now: DateTime<Utc>) -> Option<CurrentWind> {
        let speed = self.wind_speed.value_at(now)?;
        Some(CurrentWind {
            speed_kt: to_knots(speed, self.wind_speed.uom.as_deref()),
            dir_from_deg: self.wind_direction.value_at(now),
        })
    }
}

// ============================================================================
// Lookup seam
// ============================================================================

/// Wind at one point for the current time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentWind {
    pub speed_kt: f64,
    pub dir_from_deg: Option<f64>,
}

/// Looks up the current wind at a point.
///
/// `Ok(None)` means upstream answered but has no current speed there.
#[async_trait]
pub trait WindLookup: Send + Sync {
    async fn current_wind(&self, point: LatLon) -> WindResult<Option<CurrentWind>>;
}

// ============================================================================
// Client
// ============================================================================

pub struct NwsClient {
    client: Client,
    base_url: String,
    grid_urls: TtlCache<String, String>,
    forecasts: TtlCache<String, Arc<GridpointProperties>>,
}

impl NwsClient {
    /// Create a client sending `user_agent` and accepting GeoJSON.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        points_ttl: Duration,
        forecast_ttl: Duration,
    ) -> WindResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GEO_JSON));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| WindError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            grid_urls: TtlCache::new("points", POINTS_CACHE_CAPACITY, points_ttl),
            forecasts: TtlCache::new("gridpoints", FORECAST_CACHE_CAPACITY, forecast_ttl),
        })
    }

    /// Makes a GET request and deserializes the JSON response.
    async fn make_request<T: DeserializeOwned>(&self, url: &str) -> WindResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WindError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WindError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WindError::Decode(e.to_string()))
    }

    /// Resolve a point to its forecast grid URL.
    #[instrument(skip(self))]
    pub async fn grid_url(&self, point: LatLon) -> WindResult<Option<String>> {
        let key = format!("{:.4},{:.4}", point.lat, point.lon);
        if let Some(url) = self.grid_urls.get(&key).await {
            return Ok(Some(url));
        }

        let points_url = format!("{}/points/{}", self.base_url, key);
        let points: PointsResponse = self.make_request(&points_url).await?;

        match points.properties.forecast_grid_data {
            Some(url) => {
                self.grid_urls.put(key, url.clone()).await;
                Ok(Some(url))
            }
            None => {
                debug!(point = %key, "Point has no forecast grid");
                Ok(None)
            }
        }
    }

    /// Fetch the raw gridpoint forecast at `grid_url`.
    #[instrument(skip(self))]
    pub async fn gridpoint(&self, grid_url: &str) -> WindResult<Arc<GridpointProperties>> {
        if let Some(forecast) = self.forecasts.get(&grid_url.to_string()).await {
            return Ok(forecast);
        }

        let response: GridpointResponse = self.make_request(grid_url).await?;
        let forecast = Arc::new(response.properties);
        self.forecasts
            .put(grid_url.to_string(), Arc::clone(&forecast))
            .await;
        Ok(forecast)
    }

    /// Current wind at `point` as of `now`.
    pub async fn current_wind_at(&self, point: LatLon, now: DateTime<Utc>) -> WindResult<Option<CurrentWind>> {
        let Some(grid_url) = self.grid_url(point).await? else {
            return Ok(None);
        };
        let forecast = self.gridpoint(&grid_url).await?;
        Ok(forecast.wind_at(now))
    }

    pub fn grid_url_cache(&self) -> &TtlCache<String, String> {
        &self.grid_urls
    }

    pub fn forecast_cache(&self) -> &TtlCache<String, Arc<GridpointProperties>> {
        &self.forecasts
    }
}

#[async_trait]
impl WindLookup for NwsClient {
    async fn current_wind(&self, point: LatLon) -> WindResult<Option<CurrentWind>> {
        let result = self.current_wind_at(point, Utc::now()).await;
        if result.is_err() {
            counter!("wind_api_upstream_failures_total").increment(1);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn forecast_json() -> &'static str {
        r#"{
            "properties": {
                "windSpeed": {
                    "uom": "wmoUnit:km_h-1",
                    "values": [
                        {"validTime": "2024-06-01T10:00:00+00:00/PT0H", "value": 99.0},
                        {"validTime": "2024-06-01T10:00:00+00:00/PT2H", "value": 18.52},
                        {"validTime": "2024-06-01T12:00:00+00:00/P1DT6H", "value": 37.04},
                        {"validTime": "garbage", "value": 1.0}
                    ]
                },
                "windDirection": {
                    "uom": "wmoUnit:degree_(angle)",
                    "values": [
                        {"validTime": "2024-06-01T10:00:00+00:00/PT1H", "value": 270},
                        {"validTime": "2024-06-01T11:00:00+00:00/PT1H", "value": null}
                    ]
                }
            }
        }"#
    }

    fn forecast() -> GridpointProperties {
        serde_json::from_str::<GridpointResponse>(forecast_json())
            .unwrap()
            .properties
    }

    #[test]
    fn test_value_at_skips_zero_duration() {
        let series = forecast().wind_speed;
        assert_eq!(series.value_at(at(10)), Some(18.52));
    }

    #[test]
    fn test_value_at_half_open_interval() {
        let series = forecast().wind_speed;
        assert_eq!(series.value_at(at(12)), Some(37.04));
        assert_eq!(series.value_at(at(9)), None);
    }

    #[test]
    fn test_wind_at_converts_and_keeps_missing_bearing() {
        let props = forecast();

        let wind = props.wind_at(at(10)).unwrap();
        assert!((wind.speed_kt - 10.0).abs() < 1e-3);
        assert_eq!(wind.dir_from_deg, Some(270.0));

        let wind = props.wind_at(at(11)).unwrap();
        assert!(wind.dir_from_deg.is_none());
    }

    #[test]
    fn test_wind_at_without_speed() {
        let props: GridpointProperties = serde_json::from_str("{}").unwrap();
        assert!(props.wind_at(at(10)).is_none());
    }

    #[test]
    fn test_points_response_without_grid() {
        let points: PointsResponse = serde_json::from_str(r#"{"properties": {}}"#).unwrap();
        assert!(points.properties.forecast_grid_data.is_none());
    }
}
