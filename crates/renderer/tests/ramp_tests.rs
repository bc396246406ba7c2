//! Tests for the wind speed color ramps.

use renderer::ramp::{ColorRamp, InterpolatedRamp, RampKind, SteppedRamp, NO_DATA_COLOR};

const MAX_KT: f64 = 40.0;

fn ramps() -> Vec<(&'static str, Box<dyn ColorRamp>)> {
    vec![
        ("interpolated", Box::new(InterpolatedRamp::wind(MAX_KT))),
        ("stepped", Box::new(SteppedRamp::wind(MAX_KT))),
    ]
}

// ============================================================================
// No-data sentinel
// ============================================================================

#[test]
fn test_missing_speed_is_gray_for_both_strategies() {
    for (name, ramp) in ramps() {
        assert_eq!(ramp.color_for_kt(None), NO_DATA_COLOR, "{}", name);
    }
}

#[test]
fn test_sentinel_is_neutral_gray() {
    assert_eq!(NO_DATA_COLOR.r, NO_DATA_COLOR.g);
    assert_eq!(NO_DATA_COLOR.g, NO_DATA_COLOR.b);
    assert_eq!(NO_DATA_COLOR.to_hex(), "#9e9e9e");
}

// ============================================================================
// Monotonicity and clamping
// ============================================================================

#[test]
fn test_intensity_non_decreasing() {
    for (name, ramp) in ramps() {
        let mut last = -1.0;
        for i in 0..=400 {
            let speed = i as f64 * MAX_KT / 400.0;
            let intensity = ramp.intensity(speed);
            assert!(
                intensity >= last,
                "{}: intensity dropped at {} kt ({} < {})",
                name,
                speed,
                intensity,
                last
            );
            assert!((0.0..=1.0).contains(&intensity), "{}: {} out of range", name, intensity);
            last = intensity;
        }
    }
}

#[test]
fn test_intensity_spans_full_range() {
    for (name, ramp) in ramps() {
        assert_eq!(ramp.intensity(0.0), 0.0, "{}", name);
        assert_eq!(ramp.intensity(MAX_KT), 1.0, "{}", name);
    }
}

#[test]
fn test_speeds_above_max_clamp() {
    for (name, ramp) in ramps() {
        let at_max = ramp.color_for_kt(Some(MAX_KT));
        for speed in [40.01, 55.0, 120.0, 1e6] {
            assert_eq!(ramp.color_for_kt(Some(speed)), at_max, "{} at {} kt", name, speed);
            assert_eq!(ramp.intensity(speed), 1.0, "{}", name);
        }
    }
}

#[test]
fn test_stepped_clamp_with_low_max() {
    // The top color must be reached at max_kt even when max_kt sits inside a band
    let ramp = SteppedRamp::wind(22.0);
    assert_eq!(ramp.color_for_kt(Some(22.0)), ramp.color_for_kt(Some(80.0)));
}

#[test]
fn test_strategies_differ() {
    let interpolated = InterpolatedRamp::wind(MAX_KT);
    let stepped = SteppedRamp::wind(MAX_KT);
    assert_ne!(
        interpolated.color_for_kt(Some(12.0)),
        stepped.color_for_kt(Some(12.0))
    );
}

#[test]
fn test_interpolated_is_continuous() {
    let ramp = InterpolatedRamp::wind(MAX_KT);
    let a = ramp.color_for_kt(Some(17.0));
    let b = ramp.color_for_kt(Some(17.1));
    assert!((a.r as i32 - b.r as i32).abs() <= 2);
    assert!((a.g as i32 - b.g as i32).abs() <= 2);
    assert!((a.b as i32 - b.b as i32).abs() <= 2);
}

#[test]
fn test_stepped_is_piecewise_constant() {
    let ramp = SteppedRamp::wind(MAX_KT);
    assert_eq!(ramp.color_for_kt(Some(10.0)), ramp.color_for_kt(Some(14.9)));
    assert_ne!(ramp.color_for_kt(Some(14.9)), ramp.color_for_kt(Some(15.0)));
}

#[test]
fn test_kind_builds_matching_strategy() {
    let built = RampKind::Stepped.build(MAX_KT);
    let direct = SteppedRamp::wind(MAX_KT);
    for speed in [0.0, 7.0, 21.0, 39.0] {
        assert_eq!(built.color_for_kt(Some(speed)), direct.color_for_kt(Some(speed)));
    }
}
