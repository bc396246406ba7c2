//! Wind speed color ramps.
//!
//! Two independent strategies map a speed in knots to a display color:
//!
//! - [`InterpolatedRamp`]: continuous blend across color stops spread evenly
//!   from calm to `max_kt`. Used for the palette layer by default.
//! - [`SteppedRamp`]: fixed table of speed bands. Used for arrow glyphs by
//!   default.
//!
//! Both clamp speeds above `max_kt` to the `max_kt` color and map a missing
//! speed to [`NO_DATA_COLOR`].

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Neutral gray for features without a usable speed.
pub const NO_DATA_COLOR: Color = Color::rgb(0x9e, 0x9e, 0x9e);

/// Maps wind speed to a display color.
pub trait ColorRamp: Send + Sync {
    /// Color for a speed in knots; `None` (or a non-finite speed) yields the
    /// gray sentinel.
    fn color_for_kt(&self, speed_kt: Option<f64>) -> Color;

    /// Position along the ramp in [0, 1]. Non-decreasing in speed.
    fn intensity(&self, speed_kt: f64) -> f64;

    /// Speed at which the ramp saturates.
    fn max_kt(&self) -> f64;
}

/// Which ramp strategy a layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampKind {
    #[default]
    Interpolated,
    Stepped,
}

impl RampKind {
    /// Build the default ramp of this kind saturating at `max_kt`.
    pub fn build(&self, max_kt: f64) -> Box<dyn ColorRamp> {
        match self {
            RampKind::Interpolated => Box::new(InterpolatedRamp::wind(max_kt)),
            RampKind::Stepped => Box::new(SteppedRamp::wind(max_kt)),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "interpolated" | "continuous" | "gradient" => Some(RampKind::Interpolated),
            "stepped" | "discrete" | "classified" => Some(RampKind::Stepped),
            _ => None,
        }
    }
}

fn clamp_speed(speed_kt: f64, max_kt: f64) -> f64 {
    speed_kt.clamp(0.0, max_kt)
}

/// Continuous color ramp with evenly spaced stops between 0 and `max_kt`.
#[derive(Debug, Clone)]
pub struct InterpolatedRamp {
    stops: Vec<Color>,
    max_kt: f64,
}

impl InterpolatedRamp {
    /// Create a ramp from at least two colors. Fewer than two stops repeat
    /// the single color (or the gray sentinel) across the whole range.
    pub fn new(stops: Vec<Color>, max_kt: f64) -> Self {
        let stops = match stops.len() {
            0 => vec![NO_DATA_COLOR, NO_DATA_COLOR],
            1 => vec![stops[0], stops[0]],
            _ => stops,
        };
        Self {
            stops,
            max_kt: sanitize_max(max_kt),
        }
    }

    /// Blue (calm) through teal, yellow and orange to deep red (gale).
    pub fn wind(max_kt: f64) -> Self {
        Self::new(
            vec![
                Color::rgb(0x32, 0x88, 0xbd),
                Color::rgb(0x66, 0xc2, 0xa5),
                Color::rgb(0xfe, 0xe0, 0x8b),
                Color::rgb(0xf4, 0x6d, 0x43),
                Color::rgb(0x9e, 0x01, 0x42),
            ],
            max_kt,
        )
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }
}

impl ColorRamp for InterpolatedRamp {
    fn color_for_kt(&self, speed_kt: Option<f64>) -> Color {
        let Some(speed) = speed_kt.filter(|s| s.is_finite()) else {
            return NO_DATA_COLOR;
        };

        let position = self.intensity(speed) * (self.stops.len() - 1) as f64;
        let low = (position.floor() as usize).min(self.stops.len() - 2);
        self.stops[low].lerp(&self.stops[low + 1], position - low as f64)
    }

    fn intensity(&self, speed_kt: f64) -> f64 {
        clamp_speed(speed_kt, self.max_kt) / self.max_kt
    }

    fn max_kt(&self) -> f64 {
        self.max_kt
    }
}

/// One band of a stepped ramp: speeds below `upper_kt` take `color`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub upper_kt: f64,
    pub color: Color,
}

/// Discrete color ramp: a fixed table of speed bands.
///
/// The final band has no upper bound, so every speed at or above the last
/// threshold shares one color.
#[derive(Debug, Clone)]
pub struct SteppedRamp {
    steps: Vec<Step>,
    top: Color,
    max_kt: f64,
}

impl SteppedRamp {
    pub fn new(steps: Vec<Step>, top: Color, max_kt: f64) -> Self {
        let mut steps = steps;
        steps.sort_by(|a, b| a.upper_kt.total_cmp(&b.upper_kt));
        Self {
            steps,
            top,
            max_kt: sanitize_max(max_kt),
        }
    }

    /// 5 kt bands from light blue to purple.
    pub fn wind(max_kt: f64) -> Self {
        let bands = [
            (5.0, Color::rgb(0xc6, 0xdb, 0xef)),
            (10.0, Color::rgb(0x6b, 0xae, 0xd6)),
            (15.0, Color::rgb(0x31, 0xa3, 0x54)),
            (20.0, Color::rgb(0xfe, 0xd9, 0x76)),
            (25.0, Color::rgb(0xfd, 0x8d, 0x3c)),
            (30.0, Color::rgb(0xe3, 0x1a, 0x1c)),
            (35.0, Color::rgb(0xbd, 0x00, 0x26)),
        ];
        Self::new(
            bands
                .iter()
                .map(|&(upper_kt, color)| Step { upper_kt, color })
                .collect(),
            Color::rgb(0x7a, 0x01, 0x77),
            max_kt,
        )
    }

    /// Index of the band a (clamped) speed falls into; `steps.len()` is the
    /// open-ended top band.
    fn band(&self, speed_kt: f64) -> usize {
        let speed = clamp_speed(speed_kt, self.max_kt);
        self.steps
            .iter()
            .position(|step| speed < step.upper_kt)
            .unwrap_or(self.steps.len())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl ColorRamp for SteppedRamp {
    fn color_for_kt(&self, speed_kt: Option<f64>) -> Color {
        let Some(speed) = speed_kt.filter(|s| s.is_finite()) else {
            return NO_DATA_COLOR;
        };

        match self.steps.get(self.band(speed)) {
            Some(step) => step.color,
            None => self.top,
        }
    }

    fn intensity(&self, speed_kt: f64) -> f64 {
        if self.steps.is_empty() {
            return 1.0;
        }
        self.band(speed_kt) as f64 / self.steps.len() as f64
    }

    fn max_kt(&self) -> f64 {
        self.max_kt
    }
}

fn sanitize_max(max_kt: f64) -> f64 {
    if max_kt.is_finite() && max_kt > 0.0 {
        max_kt
    } else {
        1.0
    }
}
