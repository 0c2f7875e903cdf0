//! Text measurement for chart layout.
//!
//! The SVG chart is laid out in Rust (legend column, title baseline, axis
//! labels), so it needs to know roughly how much room a string takes.
//!
//! With the `embed_inter` feature the Inter variable font is embedded and
//! measured through `fontdue`. Without it we fall back to heuristics tuned to
//! Inter's proportions, which keep the layout stable for contributors who do
//! not have the font files locally.
//!
//! Expected font location (relative to this file):
//! - ../../assets/Inter-Variable.ttf

use std::fmt;

#[cfg(feature = "embed_inter")]
use fontdue::Font;
use once_cell::sync::Lazy;

/// Average advance of a glyph relative to the font size (Inter, mixed case).
const FALLBACK_ADVANCE_RATIO: f64 = 0.56;
const FALLBACK_SPACE_RATIO: f64 = 0.28;

#[derive(Clone, Copy, Debug)]
pub enum FontWeight {
    Regular,
    SemiBold,
    Bold,
}

impl FontWeight {
    /// Value for the SVG `font-weight` attribute.
    pub fn css_weight(self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontWeight::Regular => "Regular",
            FontWeight::SemiBold => "SemiBold",
            FontWeight::Bold => "Bold",
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TextMetrics {
    /// Vertical line height for layout rhythm.
    pub line_h: f64,
    /// Ascender distance above the baseline.
    pub asc: f64,
    /// Descender distance below the baseline (positive).
    pub desc: f64,
}

#[cfg(feature = "embed_inter")]
pub struct Fonts {
    variable: Option<Font>,
}

#[cfg(not(feature = "embed_inter"))]
pub struct Fonts;

impl Fonts {
    pub fn load() -> Self {
        #[cfg(feature = "embed_inter")]
        {
            const VAR_BYTES: &[u8] = include_bytes!("../../assets/Inter-Variable.ttf");
            let variable = match Font::from_bytes(VAR_BYTES, Default::default()) {
                Ok(font) => Some(font),
                Err(err) => {
                    tracing::warn!("Inter font parse failed ({err}); using heuristic metrics");
                    None
                }
            };
            Fonts { variable }
        }
        #[cfg(not(feature = "embed_inter"))]
        {
            Fonts
        }
    }

    /// Vertical metrics for the given weight and size (px).
    ///
    /// Inter's variable font shares vertical metrics across weights, so the
    /// weight only matters once a static font family is embedded.
    pub fn metrics(&self, weight: FontWeight, size_px: f64) -> TextMetrics {
        let _ = weight;

        #[cfg(feature = "embed_inter")]
        {
            if let Some(font) = self.variable.as_ref() {
                let m = font.metrics('M', size_px as f32);
                let line_h = (m.height as f64).max(size_px * 1.24).ceil();
                let asc = (size_px * 0.90).round();
                let desc = (line_h - asc).max(size_px * 0.08).round();
                return TextMetrics { line_h, asc, desc };
            }
        }

        let line_h = (size_px * 1.28).round();
        let asc = (size_px * 0.92).round();
        let desc = (line_h - asc).max(size_px * 0.08).round();
        TextMetrics { line_h, asc, desc }
    }

    /// Horizontal advance of `text` at `size_px`.
    pub fn advance(&self, weight: FontWeight, text: &str, size_px: f64) -> f64 {
        #[cfg(feature = "embed_inter")]
        {
            if let Some(font) = self.variable.as_ref() {
                return text
                    .chars()
                    .map(|ch| font.metrics(ch, size_px as f32).advance_width as f64)
                    .sum();
            }
        }

        let bold_factor = match weight {
            FontWeight::Regular => 1.0,
            FontWeight::SemiBold => 1.04,
            FontWeight::Bold => 1.08,
        };
        text.chars()
            .map(|ch| {
                if ch.is_whitespace() {
                    FALLBACK_SPACE_RATIO
                } else {
                    FALLBACK_ADVANCE_RATIO
                }
            })
            .sum::<f64>()
            * size_px
            * bold_factor
    }

    /// Shorten `text` with an ellipsis until it fits `max_width`.
    pub fn fit(&self, weight: FontWeight, text: &str, size_px: f64, max_width: f64) -> String {
        if self.advance(weight, text, size_px) <= max_width {
            return text.to_string();
        }
        let mut kept: String = text.to_string();
        while !kept.is_empty() {
            kept.pop();
            let candidate = format!("{}…", kept.trim_end());
            if self.advance(weight, &candidate, size_px) <= max_width {
                return candidate;
            }
        }
        "…".to_string()
    }
}

static FONTS: Lazy<Fonts> = Lazy::new(Fonts::load);

/// Shared, lazily loaded font set.
pub fn fonts() -> &'static Fonts {
    &FONTS
}

pub fn measure(weight: FontWeight, size_px: f64) -> TextMetrics {
    fonts().metrics(weight, size_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_increase_with_size() {
        let small = measure(FontWeight::Regular, 12.0);
        let large = measure(FontWeight::Regular, 48.0);
        assert!(large.line_h > small.line_h);
        assert!(large.asc > small.asc);
    }

    #[test]
    fn baseline_consistency_ratio() {
        let m = measure(FontWeight::SemiBold, 32.0);
        let baseline_ratio = m.asc / 32.0;
        assert!(baseline_ratio > 0.80 && baseline_ratio < 1.05);
    }

    #[test]
    fn long_labels_are_shortened() {
        let f = fonts();
        let fitted = f.fit(FontWeight::Regular, "Nordic Ski Touring Adventure", 13.0, 90.0);
        assert!(fitted.ends_with('…'));
        assert!(f.advance(FontWeight::Regular, &fitted, 13.0) <= 90.0);
        assert_eq!(f.fit(FontWeight::Regular, "Run", 13.0, 90.0), "Run");
    }
}
