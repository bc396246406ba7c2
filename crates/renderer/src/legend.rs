//! Static color-ramp legend.

use serde::Serialize;

use crate::color::Color;
use crate::ramp::ColorRamp;

/// One swatch in the legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub value_kt: f64,
    pub color: Color,
    pub label: String,
}

/// A horizontal legend sampled from a color ramp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Sample `ticks` evenly spaced speeds from 0 to the ramp's maximum
    /// (at least two). The last label is open-ended since faster winds clamp.
    pub fn for_ramp(ramp: &dyn ColorRamp, ticks: usize) -> Self {
        let ticks = ticks.max(2);
        let max = ramp.max_kt();

        let entries = (0..ticks)
            .map(|i| {
                let value = max * i as f64 / (ticks - 1) as f64;
                let label = if i == ticks - 1 {
                    format!("{:.0}+ kt", value)
                } else {
                    format!("{:.0} kt", value)
                };
                LegendEntry {
                    value_kt: value,
                    color: ramp.color_for_kt(Some(value)),
                    label,
                }
            })
            .collect();

        Self {
            title: "Wind speed".to_string(),
            entries,
        }
    }

    /// Render as an SVG document of the given pixel size.
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        );
        svg.push_str(&format!(
            r##"<rect width="{w}" height="{h}" fill="#ffffff" fill-opacity="0.85"/>"##,
            w = width,
            h = height
        ));

        let title_h = height as f64 * 0.3;
        svg.push_str(&format!(
            r#"<text x="4" y="{y:.1}" font-family="sans-serif" font-size="{fs:.1}">{t}</text>"#,
            y = title_h * 0.8,
            fs = title_h * 0.7,
            t = self.title
        ));

        if !self.entries.is_empty() {
            let swatch_w = width as f64 / self.entries.len() as f64;
            let swatch_h = height as f64 * 0.35;
            let label_size = height as f64 * 0.2;

            for (i, entry) in self.entries.iter().enumerate() {
                let x = i as f64 * swatch_w;
                svg.push_str(&format!(
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{c}"/>"#,
                    x = x,
                    y = title_h,
                    w = swatch_w,
                    h = swatch_h,
                    c = entry.color.to_hex()
                ));
                svg.push_str(&format!(
                    r#"<text x="{x:.1}" y="{y:.1}" font-family="sans-serif" font-size="{fs:.1}">{l}</text>"#,
                    x = x + 2.0,
                    y = title_h + swatch_h + label_size,
                    fs = label_size,
                    l = entry.label
                ));
            }
        }

        svg.push_str("</svg>");
        svg
    }
}
