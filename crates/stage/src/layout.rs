use std::f64::consts::TAU;

use foundation::color::Hsla;
use foundation::math::Vec3;
use graph::Scene;

use crate::marker::{MarkerSpec, facing_origin};

/// Placement constants for the procedural fallback ring.
///
/// The exact radius/height are presentation choices; only the even spacing
/// and the shared radius/height are contractual.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayoutConfig {
    pub ring_radius: f64,
    pub ring_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ring_radius: 4.0,
            ring_height: 0.0,
        }
    }
}

/// Compute marker placements for a scene.
///
/// Hotspots with explicit coordinates keep them verbatim. The N hotspots
/// without coordinates are spread evenly around a horizontal ring at
/// `angle = i / N * 2π` (i counts position-less hotspots in list order), so
/// markers stay visible even with incomplete authoring data. Every marker
/// faces the scene origin.
pub fn place(scene: &Scene, cfg: LayoutConfig) -> Vec<MarkerSpec> {
    let ring_total = scene
        .hotspots
        .iter()
        .filter(|h| h.position.is_none())
        .count();

    let mut ring_index = 0usize;
    scene
        .hotspots
        .iter()
        .map(|hotspot| {
            let position = match hotspot.position {
                Some(p) => p,
                None => {
                    let angle = ring_index as f64 / ring_total as f64 * TAU;
                    ring_index += 1;
                    Vec3::new(
                        cfg.ring_radius * angle.cos(),
                        cfg.ring_height,
                        cfg.ring_radius * angle.sin(),
                    )
                }
            };
            MarkerSpec {
                label: hotspot.label.clone(),
                position,
                facing: facing_origin(position),
                gradient: label_colors(&hotspot.label),
                icon: hotspot.icon.clone(),
                target: hotspot.target.clone(),
                entry_override: hotspot.entry_override,
            }
        })
        .collect()
}

/// Two-stop gradient for a label, as a pure function of the text.
///
/// Polynomial rolling hash over the characters, base 31 in wrapping i32
/// arithmetic; the absolute value mod 360 picks the hue, and a lighter and
/// darker HSLA variant at fixed saturation/alpha form the gradient stops.
pub fn label_colors(label: &str) -> (Hsla, Hsla) {
    let mut hash: i32 = 0;
    for ch in label.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as i32);
    }
    let hue = (hash.unsigned_abs() % 360) as f64;
    (
        Hsla::new(hue, 0.70, 0.65, 0.85),
        Hsla::new(hue, 0.70, 0.40, 0.85),
    )
}
