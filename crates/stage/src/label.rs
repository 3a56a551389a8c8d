use foundation::color::Hsla;
use foundation::math::Vec3;

use crate::marker::facing_origin;

/// Sizing constants for the floating label bitmap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelConfig {
    /// Wrap width for the label text, before padding.
    pub max_text_width_px: f64,
    pub line_height_px: f64,
    pub padding_px: f64,
    pub corner_radius_px: f64,
    /// How far above its marker the tooltip floats.
    pub lift: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_text_width_px: 220.0,
            line_height_px: 28.0,
            padding_px: 10.0,
            corner_radius_px: 8.0,
            lift: 0.6,
        }
    }
}

/// A rounded-rect label bitmap, ready for whatever text backend rasterizes
/// it (canvas 2D in the browser host). Keeping this a plain value lets the
/// backend be swapped without touching layout or picking.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBitmapSpec {
    pub lines: Vec<String>,
    pub width_px: f64,
    pub height_px: f64,
    pub corner_radius_px: f64,
    /// Two-stop gradient background, lighter stop first.
    pub gradient: (Hsla, Hsla),
}

/// Tooltip placement next to a hit marker: lifted above it, facing the
/// scene origin like the marker itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipSpec {
    pub bitmap: LabelBitmapSpec,
    pub position: Vec3,
    pub facing: Vec3,
}

/// Greedy word wrap against a caller-supplied text measurer.
///
/// A single word wider than the wrap width gets its own line rather than
/// being split mid-word.
pub fn word_wrap<F>(text: &str, max_width_px: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || measure(&candidate) <= max_width_px {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Build the label bitmap for a hotspot.
pub fn label_bitmap<F>(
    label: &str,
    gradient: (Hsla, Hsla),
    cfg: LabelConfig,
    measure: F,
) -> LabelBitmapSpec
where
    F: Fn(&str) -> f64,
{
    let lines = word_wrap(label, cfg.max_text_width_px, &measure);
    let text_width = lines
        .iter()
        .map(|l| measure(l))
        .fold(0.0f64, f64::max)
        .min(cfg.max_text_width_px);
    LabelBitmapSpec {
        width_px: text_width + 2.0 * cfg.padding_px,
        height_px: lines.len().max(1) as f64 * cfg.line_height_px + 2.0 * cfg.padding_px,
        corner_radius_px: cfg.corner_radius_px,
        gradient,
        lines,
    }
}

/// Place a tooltip above `marker_position`, facing the origin.
pub fn tooltip_at(bitmap: LabelBitmapSpec, marker_position: Vec3, cfg: LabelConfig) -> TooltipSpec {
    let position = Vec3::new(
        marker_position.x,
        marker_position.y + cfg.lift,
        marker_position.z,
    );
    TooltipSpec {
        bitmap,
        facing: facing_origin(position),
        position,
    }
}
