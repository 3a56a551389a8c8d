use std::collections::{BTreeMap, BTreeSet, VecDeque};

use runtime::event_bus::EventBus;
use runtime::frame::Frame;

use crate::records::{HotspotRecord, SceneRecord};
use crate::scene::{Hotspot, Scene, SceneGraph, SceneId};

/// Backend data collaborator: one scene record and its hotspot list per id.
pub trait SceneSource {
    fn scene(&mut self, id: &SceneId) -> Result<SceneRecord, SourceError>;
    fn hotspots(&mut self, id: &SceneId) -> Result<Vec<HotspotRecord>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    NotFound(SceneId),
    Backend(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::NotFound(id) => write!(f, "scene {id} not found"),
            SourceError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphLoadError {
    RootUnavailable { id: SceneId, source: SourceError },
}

impl std::fmt::Display for GraphLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphLoadError::RootUnavailable { id, source } => {
                write!(f, "root scene {id} unavailable: {source}")
            }
        }
    }
}

impl std::error::Error for GraphLoadError {}

/// Builds the scene graph reachable from `root`.
///
/// Traversal contract:
/// - Explicit worklist + visited set; a scene is marked visited when it is
///   first *enqueued*, not when its own fetch completes, so cycles and
///   self-loops terminate regardless of fetch ordering.
/// - A failed non-root fetch skips that branch with a `Warn`/`load` event;
///   sibling branches still load. A failed root fetch is a hard error.
/// - Zero-hotspot scenes (dead ends) and hotspot targets that never loaded
///   (dangling) are accepted with `Warn`/`graph` events.
pub fn load(
    source: &mut dyn SceneSource,
    root: SceneId,
    bus: &mut EventBus,
    frame: Frame,
) -> Result<SceneGraph, GraphLoadError> {
    let mut visited: BTreeSet<SceneId> = BTreeSet::new();
    let mut worklist: VecDeque<SceneId> = VecDeque::new();
    let mut scenes: BTreeMap<SceneId, Scene> = BTreeMap::new();

    visited.insert(root.clone());
    worklist.push_back(root.clone());

    while let Some(id) = worklist.pop_front() {
        let record = match source.scene(&id) {
            Ok(r) => r,
            Err(e) => {
                if id == root {
                    return Err(GraphLoadError::RootUnavailable { id, source: e });
                }
                bus.warn(frame, "load", format!("skipping scene {id}: {e}"));
                continue;
            }
        };

        let hotspot_records = match source.hotspots(&id) {
            Ok(h) => h,
            Err(e) => {
                bus.warn(frame, "load", format!("hotspots for {id} unavailable: {e}"));
                Vec::new()
            }
        };

        if hotspot_records.is_empty() {
            bus.warn(frame, "graph", format!("scene {id} has no hotspots (dead end)"));
        }

        let mut hotspots = Vec::with_capacity(hotspot_records.len());
        for record in &hotspot_records {
            let target = record.target();
            if let Some(target) = &target {
                if visited.insert(target.clone()) {
                    worklist.push_back(target.clone());
                }
            }
            hotspots.push(Hotspot {
                label: record.label.clone(),
                position: record.position(),
                entry_override: record.entry_override(),
                icon: record.icon.clone(),
                target,
            });
        }

        scenes.insert(
            id.clone(),
            Scene {
                id,
                entry: record.entry_orientation(),
                panorama_uri: record.panorama_uri,
                hotspots,
            },
        );
    }

    for scene in scenes.values() {
        for hotspot in &scene.hotspots {
            if let Some(target) = &hotspot.target {
                if !scenes.contains_key(target) {
                    bus.warn(
                        frame,
                        "graph",
                        format!(
                            "hotspot '{}' in {} points at unloaded scene {target}",
                            hotspot.label, scene.id
                        ),
                    );
                }
            }
        }
    }

    Ok(SceneGraph::new(root, scenes))
}
