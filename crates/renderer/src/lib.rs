//! Vector rendering for wind overlays.
//!
//! Implements the overlay layers handed to the map:
//! - Color ramps (continuous interpolated and discrete stepped)
//! - Palette cells (filled squares colored by speed)
//! - Arrow glyphs (rotated by bearing, with popup text)
//! - Legend

pub mod arrows;
pub mod color;
pub mod legend;
pub mod palette;
pub mod ramp;

pub use arrows::{render_arrows, ArrowGlyph};
pub use color::Color;
pub use legend::{Legend, LegendEntry};
pub use palette::{render_palette, PaletteCell};
pub use ramp::{ColorRamp, InterpolatedRamp, RampKind, SteppedRamp, NO_DATA_COLOR};
