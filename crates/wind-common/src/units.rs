//! Wind speed unit conversions.

/// Knots to statute miles per hour.
pub const KT_TO_MPH: f64 = 1.15078;

/// Knots to kilometers per hour.
pub const KT_TO_KMH: f64 = 1.852;

/// Kilometers per hour to knots.
pub const KMH_TO_KT: f64 = 0.539957;

/// Meters per second to knots.
pub const MS_TO_KT: f64 = 1.94384;

/// Speed units that appear in NWS gridpoint `uom` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    KilometersPerHour,
    MetersPerSecond,
    Knots,
}

impl SpeedUnit {
    /// Parse an NWS unit-of-measure code (`wmoUnit:*` or legacy `unit:*`).
    pub fn from_uom(code: &str) -> Option<Self> {
        match code {
            "wmoUnit:km_h-1" | "unit:km_h" => Some(SpeedUnit::KilometersPerHour),
            "wmoUnit:m_s-1" | "unit:m_s" => Some(SpeedUnit::MetersPerSecond),
            "wmoUnit:knot" | "unit:kt" => Some(SpeedUnit::Knots),
            _ => None,
        }
    }

    /// Multiplier converting a value in this unit to knots.
    pub fn knots_multiplier(&self) -> f64 {
        match self {
            SpeedUnit::KilometersPerHour => KMH_TO_KT,
            SpeedUnit::MetersPerSecond => MS_TO_KT,
            SpeedUnit::Knots => 1.0,
        }
    }
}

/// Convert an NWS speed value to knots.
///
/// A missing or unrecognized unit code leaves the value unchanged (it is
/// assumed to already be in knots).
pub fn to_knots(value: f64, uom: Option<&str>) -> f64 {
    match uom.and_then(SpeedUnit::from_uom) {
        Some(unit) => value * unit.knots_multiplier(),
        None => value,
    }
}
