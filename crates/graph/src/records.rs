use serde::Deserialize;

use crate::scene::SceneId;
use foundation::math::{Orientation, Vec3};

/// Backend id as it appears on the wire; older tours use numeric ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSceneId {
    Number(i64),
    Text(String),
}

impl From<RawSceneId> for SceneId {
    fn from(raw: RawSceneId) -> Self {
        match raw {
            RawSceneId::Number(n) => SceneId(n.to_string()),
            RawSceneId::Text(s) => SceneId(s),
        }
    }
}

/// Wire form of a scene. Angles are degrees on the wire and converted to
/// radians exactly once, at this boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneRecord {
    pub panorama_uri: String,
    #[serde(default)]
    pub entry_yaw: f64,
    #[serde(default)]
    pub entry_pitch: f64,
    #[serde(default)]
    pub entry_roll: f64,
}

impl SceneRecord {
    pub fn entry_orientation(&self) -> Orientation {
        Orientation::from_degrees(self.entry_yaw, self.entry_pitch, self.entry_roll)
    }
}

/// Wire form of a hotspot. All fields except the label are optional; tours
/// authored quickly omit positions, angles, and sometimes the destination.
#[derive(Debug, Clone, Deserialize)]
pub struct HotspotRecord {
    pub label: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(default)]
    pub yaw: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub roll: Option<f64>,
    /// Path of a sprite texture to show on the marker instead of the
    /// default one.
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub target_scene: Option<RawSceneId>,
}

impl HotspotRecord {
    /// Explicit placement requires all three coordinates.
    pub fn position(&self) -> Option<Vec3> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Some(Vec3::new(x, y, z)),
            _ => None,
        }
    }

    /// Entry override exists if any angle was authored; absent angles within
    /// an authored override default to 0 degrees.
    pub fn entry_override(&self) -> Option<Orientation> {
        if self.yaw.is_none() && self.pitch.is_none() && self.roll.is_none() {
            return None;
        }
        Some(Orientation::from_degrees(
            self.yaw.unwrap_or(0.0),
            self.pitch.unwrap_or(0.0),
            self.roll.unwrap_or(0.0),
        ))
    }

    pub fn target(&self) -> Option<SceneId> {
        self.target_scene.clone().map(SceneId::from)
    }
}
