//! Signature-keyed storage of built graphs.
//!
//! The signature only encodes the participant id set. Two different edge sets
//! over the same ids, or the same ids with changed properties, map to the same
//! key; callers invalidate or rebuild when that matters.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::graph::ConnectionGraph;

pub const DEFAULT_MAX_SIZE: usize = 100;

/// Separator placed between sorted ids in a signature.
pub const SIGNATURE_SEPARATOR: &str = "|";

/// Cache key for a set of participant entity ids (sorted, order-independent).
pub fn signature<I, S>(entity_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<String> = entity_ids
        .into_iter()
        .map(|id| id.as_ref().to_owned())
        .collect();
    ids.sort();
    ids.join(SIGNATURE_SEPARATOR)
}

/// Bounded cache with eviction by insertion order.
///
/// Once `max_size` entries are stored, `set` drops the oldest inserted entry
/// before inserting. Reads never reorder entries, so this is FIFO rather than
/// LRU. Re-setting an existing key keeps its original position, but when the
/// cache is full the oldest entry is still evicted first, so re-setting a key
/// can shrink the cache.
#[derive(Debug, Clone)]
pub struct GraphCache {
    entries: IndexMap<String, Arc<ConnectionGraph>>,
    max_size: usize,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl GraphCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_size,
        }
    }

    pub fn get(&self, signature: &str) -> Option<Arc<ConnectionGraph>> {
        self.entries.get(signature).cloned()
    }

    pub fn set(&mut self, signature: impl Into<String>, graph: Arc<ConnectionGraph>) {
        if self.entries.len() >= self.max_size
            && let Some((evicted, _)) = self.entries.shift_remove_index(0)
        {
            debug!(signature = %evicted, "graph cache eviction");
        }
        self.entries.insert(signature.into(), graph);
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, signature: &str) -> bool {
        self.entries.shift_remove(signature).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Stored signatures, oldest first.
    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// A [`GraphCache`] behind a mutex for hosts that share it across threads.
///
/// Each method holds the lock for the whole check-evict-insert sequence.
#[derive(Debug, Clone, Default)]
pub struct SharedGraphCache {
    inner: Arc<Mutex<GraphCache>>,
}

impl SharedGraphCache {
    pub fn new(max_size: usize) -> Self {
        Self::from_cache(GraphCache::new(max_size))
    }

    pub fn from_cache(cache: GraphCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Exclusive access for a multi-step operation such as a cached build.
    pub fn lock(&self) -> MutexGuard<'_, GraphCache> {
        self.inner.lock()
    }

    pub fn get(&self, signature: &str) -> Option<Arc<ConnectionGraph>> {
        self.inner.lock().get(signature)
    }

    pub fn set(&self, signature: impl Into<String>, graph: Arc<ConnectionGraph>) {
        self.inner.lock().set(signature, graph);
    }

    pub fn invalidate(&self, signature: &str) -> bool {
        self.inner.lock().invalidate(signature)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Return the cached graph for `signature`, building and storing it with
    /// `build` under the same lock when absent.
    pub fn get_or_insert_with<F>(&self, signature: &str, build: F) -> Arc<ConnectionGraph>
    where
        F: FnOnce() -> ConnectionGraph,
    {
        let mut cache = self.inner.lock();
        if let Some(graph) = cache.get(signature) {
            return graph;
        }
        let graph = Arc::new(build());
        cache.set(signature, Arc::clone(&graph));
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConnectionGraphBuilder;
    use proptest::prelude::*;

    fn graph_for(ids: &[&str]) -> Arc<ConnectionGraph> {
        Arc::new(ConnectionGraphBuilder::new().finish(ids.iter().copied()))
    }

    #[test]
    fn signature_sorts_ids() {
        assert_eq!(signature(["b", "a", "c"]), "a|b|c");
        assert_eq!(signature(Vec::<&str>::new()), "");
    }

    #[test]
    fn evicts_first_inserted_not_least_recent() {
        let mut cache = GraphCache::new(2);
        cache.set("a", graph_for(&["a"]));
        cache.set("b", graph_for(&["b"]));

        // Reading "a" must not protect it from eviction.
        assert!(cache.get("a").is_some());
        cache.set("c", graph_for(&["c"]));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.signatures().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn resetting_a_key_when_full_still_evicts_oldest() {
        let mut cache = GraphCache::new(2);
        cache.set("a", graph_for(&["a"]));
        cache.set("b", graph_for(&["b"]));
        cache.set("b", graph_for(&["b"]));

        assert_eq!(cache.signatures().collect::<Vec<_>>(), ["b"]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn resetting_a_key_keeps_its_position() {
        let mut cache = GraphCache::new(3);
        cache.set("a", graph_for(&["a"]));
        cache.set("b", graph_for(&["b"]));
        cache.set("a", graph_for(&["a", "x"]));

        assert_eq!(cache.signatures().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(cache.get("a").map(|g| g.node_count()), Some(2));
    }

    #[test]
    fn invalidate_and_clear() {
        let mut cache = GraphCache::default();
        assert_eq!(cache.max_size(), DEFAULT_MAX_SIZE);
        cache.set("a", graph_for(&["a"]));
        cache.set("b", graph_for(&["b"]));
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_cache_builds_once() {
        let shared = SharedGraphCache::new(4);
        let first = shared.get_or_insert_with("x", || {
            ConnectionGraphBuilder::new().finish(["x"])
        });
        let second = shared.get_or_insert_with("x", || panic!("must be served from cache"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(shared.len(), 1);
    }

    proptest! {
        #[test]
        fn signature_is_order_independent(mut ids in prop::collection::vec("[a-z0-9]{1,6}", 0..12)) {
            let forward = signature(&ids);
            ids.reverse();
            prop_assert_eq!(forward, signature(&ids));
        }

        #[test]
        fn cache_never_exceeds_bound(max in 1_usize..8, keys in prop::collection::vec(0_u8..20, 0..40)) {
            let mut cache = GraphCache::new(max);
            for key in keys {
                cache.set(key.to_string(), graph_for(&["n"]));
                prop_assert!(cache.len() <= max);
            }
        }
    }
}
