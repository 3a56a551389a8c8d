use std::collections::BTreeMap;

use foundation::math::{Orientation, Vec3};

/// Opaque scene key. Backend ids may be integers or strings on the wire;
/// both are normalized to string form at the record boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A clickable marker inside a scene that can navigate to another scene.
///
/// The label doubles as the deterministic seed for the marker's gradient; it
/// is not guaranteed unique across the tour. A hotspot without a target is
/// inert: it can be hovered and labeled but never activates a navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub label: String,
    /// Explicit placement; absent hotspots get a procedural ring slot.
    pub position: Option<Vec3>,
    /// Orientation to apply when *entering* the target via this hotspot.
    pub entry_override: Option<Orientation>,
    /// Custom marker sprite path; `None` renders the default sprite.
    pub icon: Option<String>,
    pub target: Option<SceneId>,
}

/// One 360° panorama node. Immutable once built by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    pub panorama_uri: String,
    /// Authored entry orientation, used when no arrival hotspot applies.
    pub entry: Orientation,
    pub hotspots: Vec<Hotspot>,
}

/// Every scene reachable from the root, each exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    root: SceneId,
    scenes: BTreeMap<SceneId, Scene>,
}

impl SceneGraph {
    pub fn new(root: SceneId, scenes: BTreeMap<SceneId, Scene>) -> Self {
        Self { root, scenes }
    }

    pub fn root(&self) -> &SceneId {
        &self.root
    }

    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn contains(&self, id: &SceneId) -> bool {
        self.scenes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scene keys in stable (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = &SceneId> {
        self.scenes.keys()
    }

    /// Targets of a scene's hotspots, hotspot-list order, deduplicated,
    /// restricted to scenes actually present in the graph.
    pub fn neighbors(&self, id: &SceneId) -> Vec<SceneId> {
        let Some(scene) = self.scenes.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<SceneId> = Vec::new();
        for hotspot in &scene.hotspots {
            let Some(target) = &hotspot.target else {
                continue;
            };
            if self.scenes.contains_key(target) && !out.contains(target) {
                out.push(target.clone());
            }
        }
        out
    }
}
