use graph::{SceneGraph, SceneId};

use crate::cache::{AssetCache, AssetKey, Ensure};

/// A fetch the engine should hand to the host texture loader.
#[derive(Debug, Clone, PartialEq)]
pub struct PreloadFetch {
    pub key: AssetKey,
    pub uri: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    Neighbors,
    Rest,
    Done,
}

/// Background warm-up of the asset cache.
///
/// Policy: the direct neighbors of the current scene are issued first and
/// must all leave `Pending` (ready or failed) before anything else in the
/// graph is issued. That keeps the next-most-likely navigation target ready
/// fastest while still eventually warming the whole tour. Keys already
/// present in the cache are never re-issued; preload failures are left in
/// the cache and swallowed here.
#[derive(Debug, Default)]
pub struct Preloader {
    neighbors: Vec<PreloadFetch>,
    rest: Vec<PreloadFetch>,
    phase: Option<Phase>,
}

impl Preloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the two waves around `current`. Fire-and-forget: nothing is
    /// fetched until `tick` runs.
    pub fn schedule(&mut self, graph: &SceneGraph, current: &SceneId) {
        let fetch = |id: &SceneId| {
            graph.get(id).map(|scene| PreloadFetch {
                key: AssetKey::Panorama(id.clone()),
                uri: scene.panorama_uri.clone(),
            })
        };

        let neighbor_ids = graph.neighbors(current);
        self.neighbors = neighbor_ids
            .iter()
            .filter(|id| *id != current)
            .filter_map(fetch)
            .collect();

        // Everything else, stable key order.
        self.rest = graph
            .keys()
            .filter(|id| *id != current && !neighbor_ids.contains(id))
            .filter_map(fetch)
            .collect();

        self.phase = Some(Phase::Neighbors);
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Some(Phase::Done) | None)
    }

    /// Advance the preload plan; returns the fetches to start this frame.
    ///
    /// Each returned fetch has already reserved its cache slot, so the
    /// caller only forwards it to the host.
    pub fn tick(&mut self, cache: &mut AssetCache) -> Vec<PreloadFetch> {
        let mut out = Vec::new();
        let Some(phase) = self.phase else {
            return out;
        };

        match phase {
            Phase::Neighbors => {
                for fetch in &self.neighbors {
                    if cache.ensure(&fetch.key) == Ensure::Issued {
                        out.push(fetch.clone());
                    }
                }
                let wave_settled = self
                    .neighbors
                    .iter()
                    .all(|f| !cache.is_pending(&f.key))
                    && out.is_empty();
                if wave_settled {
                    self.phase = Some(Phase::Rest);
                    out.extend(self.issue_rest(cache));
                }
            }
            Phase::Rest => {
                out.extend(self.issue_rest(cache));
            }
            Phase::Done => {}
        }

        out
    }

    fn issue_rest(&mut self, cache: &mut AssetCache) -> Vec<PreloadFetch> {
        let mut out = Vec::new();
        for fetch in &self.rest {
            if cache.ensure(&fetch.key) == Ensure::Issued {
                out.push(fetch.clone());
            }
        }
        self.phase = Some(Phase::Done);
        out
    }
}
