use foundation::color::Hsla;
use foundation::math::{Orientation, Vec3};
use graph::SceneId;

/// Everything the rendering collaborator needs to draw one hotspot marker,
/// plus the activation contract the engine needs when it is picked.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub label: String,
    pub position: Vec3,
    /// Unit direction the marker should face (toward the scene origin).
    pub facing: Vec3,
    /// Two-stop gradient for the floating label, derived from the text.
    pub gradient: (Hsla, Hsla),
    /// Custom sprite path; its texture is applied once the load lands.
    pub icon: Option<String>,
    /// `None` marks an inert hotspot: pickable, never activatable.
    pub target: Option<SceneId>,
    /// Orientation to apply when entering `target` via this marker.
    pub entry_override: Option<Orientation>,
}

/// Direction from `position` back toward the scene origin; markers sitting
/// exactly at the origin fall back to +Z so they still face somewhere.
pub fn facing_origin(position: Vec3) -> Vec3 {
    (Vec3::ZERO - position)
        .normalized()
        .unwrap_or(Vec3::new(0.0, 0.0, 1.0))
}
