use std::collections::BTreeMap;

use graph::SceneId;

use crate::texture::TextureHandle;

/// Cache key: a scene's panorama or a hotspot icon path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKey {
    Panorama(SceneId),
    Icon(String),
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKey::Panorama(id) => write!(f, "panorama:{id}"),
            AssetKey::Icon(path) => write!(f, "icon:{path}"),
        }
    }
}

/// Lifecycle of one cache slot: reserved, then resolved exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetState {
    Pending,
    Ready(TextureHandle),
    Failed(String),
}

/// Outcome of a synchronous check-and-reserve.
///
/// `Issued` means the caller reserved the slot and must hand the fetch to
/// the host; every later caller for the same key gets `Joined` (or the
/// resolved state) and must not start a second fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Ensure {
    Issued,
    Joined,
    Ready(TextureHandle),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheError {
    UnknownKey(AssetKey),
    AlreadyResolved(AssetKey),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::UnknownKey(key) => write!(f, "no cache slot for {key}"),
            CacheError::AlreadyResolved(key) => write!(f, "{key} was already resolved"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Session-lifetime texture cache.
///
/// Duplicate-fetch suppression works without any lock primitive: the slot
/// is written *before* the asynchronous fetch starts, so the check and the
/// reservation are one synchronous step. Entries are never evicted; a tour's
/// panorama count is small enough that memory pressure is not handled here.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: BTreeMap<AssetKey, AssetState>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, key: &AssetKey) -> Ensure {
        match self.entries.get(key) {
            None => {
                self.entries.insert(key.clone(), AssetState::Pending);
                Ensure::Issued
            }
            Some(AssetState::Pending) => Ensure::Joined,
            Some(AssetState::Ready(handle)) => Ensure::Ready(*handle),
            Some(AssetState::Failed(_)) => Ensure::Failed,
        }
    }

    /// Resolve a pending slot. First resolution wins; a second attempt is an
    /// error so the engine can surface double deliveries from the host.
    pub fn fulfill(&mut self, key: &AssetKey, handle: TextureHandle) -> Result<(), CacheError> {
        match self.entries.get_mut(key) {
            None => Err(CacheError::UnknownKey(key.clone())),
            Some(state @ AssetState::Pending) => {
                *state = AssetState::Ready(handle);
                Ok(())
            }
            Some(_) => Err(CacheError::AlreadyResolved(key.clone())),
        }
    }

    pub fn fail(&mut self, key: &AssetKey, message: impl Into<String>) -> Result<(), CacheError> {
        match self.entries.get_mut(key) {
            None => Err(CacheError::UnknownKey(key.clone())),
            Some(state @ AssetState::Pending) => {
                *state = AssetState::Failed(message.into());
                Ok(())
            }
            Some(_) => Err(CacheError::AlreadyResolved(key.clone())),
        }
    }

    pub fn state(&self, key: &AssetKey) -> Option<&AssetState> {
        self.entries.get(key)
    }

    pub fn ready(&self, key: &AssetKey) -> Option<TextureHandle> {
        match self.entries.get(key) {
            Some(AssetState::Ready(handle)) => Some(*handle),
            _ => None,
        }
    }

    pub fn is_pending(&self, key: &AssetKey) -> bool {
        matches!(self.entries.get(key), Some(AssetState::Pending))
    }

    pub fn contains(&self, key: &AssetKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetCache, AssetKey, AssetState, CacheError, Ensure};
    use crate::texture::TextureHandle;
    use graph::SceneId;

    fn key(id: &str) -> AssetKey {
        AssetKey::Panorama(SceneId::new(id))
    }

    #[test]
    fn concurrent_ensures_issue_exactly_one_fetch() {
        let mut cache = AssetCache::new();
        let k = key("lobby");

        let outcomes: Vec<Ensure> = (0..5).map(|_| cache.ensure(&k)).collect();
        let issued = outcomes.iter().filter(|o| **o == Ensure::Issued).count();
        let joined = outcomes.iter().filter(|o| **o == Ensure::Joined).count();
        assert_eq!(issued, 1);
        assert_eq!(joined, 4);
    }

    #[test]
    fn ensure_after_resolution_returns_the_handle() {
        let mut cache = AssetCache::new();
        let k = key("lobby");
        assert_eq!(cache.ensure(&k), Ensure::Issued);
        cache.fulfill(&k, TextureHandle(9)).unwrap();
        assert_eq!(cache.ensure(&k), Ensure::Ready(TextureHandle(9)));
        assert_eq!(cache.ready(&k), Some(TextureHandle(9)));
    }

    #[test]
    fn slots_resolve_exactly_once() {
        let mut cache = AssetCache::new();
        let k = key("lobby");
        cache.ensure(&k);
        cache.fulfill(&k, TextureHandle(1)).unwrap();
        assert_eq!(
            cache.fulfill(&k, TextureHandle(2)),
            Err(CacheError::AlreadyResolved(k.clone()))
        );
        assert_eq!(cache.ready(&k), Some(TextureHandle(1)));
    }

    #[test]
    fn failures_are_recorded_not_evicted() {
        let mut cache = AssetCache::new();
        let k = key("attic");
        cache.ensure(&k);
        cache.fail(&k, "decode error").unwrap();
        assert_eq!(cache.ensure(&k), Ensure::Failed);
        assert!(matches!(cache.state(&k), Some(AssetState::Failed(_))));
    }

    #[test]
    fn panorama_and_icon_keys_occupy_distinct_slots() {
        let mut cache = AssetCache::new();
        let icon = AssetKey::Icon("arrow.png".into());
        assert_eq!(cache.ensure(&key("lobby")), Ensure::Issued);
        assert_eq!(cache.ensure(&icon), Ensure::Issued);
        assert_eq!(cache.len(), 2);
        assert_eq!(icon.to_string(), "icon:arrow.png");
        assert_eq!(key("lobby").to_string(), "panorama:lobby");
    }

    #[test]
    fn resolving_an_unknown_key_is_an_error() {
        let mut cache = AssetCache::new();
        let k = key("ghost");
        assert_eq!(
            cache.fulfill(&k, TextureHandle(1)),
            Err(CacheError::UnknownKey(k.clone()))
        );
    }
}
