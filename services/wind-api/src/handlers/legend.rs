//! Color ramp legend.

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};
use metrics::counter;
use renderer::{Legend, RampKind};
use serde::Deserialize;
use wind_common::WindError;

use crate::error::ApiResult;
use crate::state::LEGEND_MAX_KT;

const LEGEND_TICKS: usize = 9;
const LEGEND_WIDTH: u32 = 320;
const LEGEND_HEIGHT: u32 = 56;

#[derive(Debug, Deserialize)]
pub struct LegendParams {
    pub ramp: Option<String>,
}

/// GET /legend.svg?ramp=interpolated|stepped
pub async fn legend_handler(Query(params): Query<LegendParams>) -> ApiResult<Response> {
    counter!("wind_api_requests_total", "endpoint" => "legend").increment(1);

    let kind = match params.ramp.as_deref() {
        None => RampKind::default(),
        Some(name) => RampKind::parse(name)
            .ok_or_else(|| WindError::invalid("ramp", format!("unknown ramp '{}'", name)))?,
    };

    let ramp = kind.build(LEGEND_MAX_KT);
    let svg = Legend::for_ramp(ramp.as_ref(), LEGEND_TICKS).to_svg(LEGEND_WIDTH, LEGEND_HEIGHT);

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}
