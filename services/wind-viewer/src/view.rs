//! View-change input.
//!
//! Each line on stdin is one view: `zoom south north west east`, e.g.
//! `9 39.5 40.5 -71 -69`. Blank lines and lines starting with `#` are
//! ignored.

use anyhow::{bail, Context, Result};
use tile_layer::ViewState;
use wind_common::MapBounds;

/// Parse one input line. `Ok(None)` for blank and comment lines.
pub fn parse_view_line(line: &str) -> Result<Option<ViewState>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        bail!("expected 'zoom south north west east', got {} fields", fields.len());
    }

    let zoom: u8 = fields[0]
        .parse()
        .with_context(|| format!("invalid zoom '{}'", fields[0]))?;

    let mut coords = [0.0f64; 4];
    for (slot, raw) in coords.iter_mut().zip(&fields[1..]) {
        *slot = raw
            .parse()
            .with_context(|| format!("invalid coordinate '{}'", raw))?;
    }

    let bounds = MapBounds::new(coords[0], coords[1], coords[2], coords[3]);
    if !bounds.is_valid() {
        bail!("bounds are inverted or non-finite");
    }

    Ok(Some(ViewState::new(bounds, zoom)))
}
