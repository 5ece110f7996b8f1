//! Depth-aware cache of design snapshots.
//!
//! Entries are whole snapshots keyed by `(file, selector, depth tag)`. A
//! single snapshot can answer node lookups for any node it contains, as long
//! as it holds enough levels below that node for the query at hand.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use framecache_core::tree::{limit_depth, root_depth, subtree_depth};
use framecache_core::{CacheKey, DepthTag, Node, Snapshot};
use tracing::{debug, info, warn};

use crate::eviction::EvictionStore;
use crate::freshness::{FileMetaSource, is_fresh};

/// Capacity used when callers do not pick one.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(63);

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<Snapshot>,
    marker: String,
}

/// Node found in some cached snapshot.
#[derive(Debug, Clone)]
struct NodeHit {
    node: Node,
    source: Arc<Snapshot>,
    marker: String,
}

/// Outcome of a multi-node lookup, in request order.
#[derive(Debug, Clone, Default)]
pub struct MultiNodeLookup {
    /// Nodes answered from the cache.
    pub hits: Vec<Node>,
    /// Ids the caller still has to fetch.
    pub misses: Vec<String>,
    /// Snapshot that produced the first hit, for its file metadata.
    pub source: Option<Arc<Snapshot>>,
}

impl MultiNodeLookup {
    /// True when every requested id was answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }

    fn record(&mut self, node_id: &str, hit: Option<NodeHit>) {
        match hit {
            Some(hit) => {
                if self.source.is_none() {
                    self.source = Some(hit.source);
                }
                self.hits.push(hit.node);
            }
            None => self.misses.push(node_id.to_owned()),
        }
    }
}

/// LRU cache of snapshots that answers node queries under a depth constraint.
pub struct NodeCache {
    store: Mutex<EvictionStore<CacheKey, CacheEntry>>,
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NodeCache {
    /// Create an empty cache holding at most `capacity` snapshots.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            store: Mutex::new(EvictionStore::new(capacity)),
        }
    }

    fn with_store<R>(&self, action: impl FnOnce(&mut EvictionStore<CacheKey, CacheEntry>) -> R) -> Option<R> {
        match self.store.lock() {
            Ok(mut store) => Some(action(&mut store)),
            Err(_) => {
                warn!("Node cache lock poisoned; treating as empty");
                None
            }
        }
    }

    fn read_store<R>(&self, action: impl FnOnce(&EvictionStore<CacheKey, CacheEntry>) -> R) -> Option<R> {
        self.with_store(|store| action(store))
    }

    /// Store `snapshot` under `key` as the most recently used entry.
    ///
    /// `marker` is the origin's modification marker at fetch time; an empty
    /// marker disables freshness checks for this entry.
    pub fn put(&self, key: CacheKey, snapshot: impl Into<Arc<Snapshot>>, marker: impl Into<String>) {
        let entry = CacheEntry {
            snapshot: snapshot.into(),
            marker: marker.into(),
        };
        debug!(%key, "Caching snapshot");
        if let Some(Some((evicted, _))) = self.with_store(|store| store.put(key, entry)) {
            debug!(key = %evicted, "Evicted least recently used snapshot");
        }
    }

    /// Exact-key lookup without freshness validation.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Snapshot>> {
        self.with_store(|store| store.get(key).map(|entry| Arc::clone(&entry.snapshot)))
            .flatten()
    }

    /// Exact-key lookup that drops the entry when the origin reports a newer file.
    pub async fn get_validated<M: FileMetaSource>(&self, key: &CacheKey, meta: &M) -> Option<Arc<Snapshot>> {
        let entry = self.with_store(|store| store.get(key).cloned()).flatten()?;
        if is_fresh(&entry.marker, &key.file_key, meta).await {
            return Some(entry.snapshot);
        }
        info!(%key, "Dropping stale snapshot");
        // A put may have replaced the entry while validation was in flight.
        self.with_store(|store| {
            if store.peek(key).is_some_and(|current| Arc::ptr_eq(&current.snapshot, &entry.snapshot)) {
                store.delete(key);
            }
        });
        None
    }

    /// Remove one entry; reports whether it was present.
    pub fn delete(&self, key: &CacheKey) -> bool {
        self.with_store(|store| store.delete(key)).unwrap_or(false)
    }

    /// Membership check that leaves recency untouched.
    #[must_use]
    pub fn has(&self, key: &CacheKey) -> bool {
        self.read_store(|store| store.has(key)).unwrap_or(false)
    }

    /// Number of cached snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_store(EvictionStore::len).unwrap_or(0)
    }

    /// Maximum number of cached snapshots.
    #[must_use]
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.read_store(EvictionStore::capacity)
    }

    /// True when no snapshot is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find `node_id` in any snapshot of `file_key` deep enough for the query.
    ///
    /// With `required_depth` set, the returned node is truncated to exactly
    /// that many levels. Without it, only snapshots that provably hold the
    /// node's full subtree qualify, and the node is returned as stored.
    #[must_use]
    pub fn find_node_data(&self, file_key: &str, node_id: &str, required_depth: Option<u32>) -> Option<Node> {
        self.lookup(file_key, node_id, required_depth).map(|hit| hit.node)
    }

    /// Like [`find_node_data`](Self::find_node_data), then validates the
    /// winning snapshot; a stale file drops every cached view of that file.
    pub async fn find_node_data_validated<M: FileMetaSource>(
        &self,
        file_key: &str,
        node_id: &str,
        required_depth: Option<u32>,
        meta: &M,
    ) -> Option<Node> {
        self.lookup_validated(file_key, node_id, required_depth, meta)
            .await
            .map(|hit| hit.node)
    }

    /// Split `node_ids` into cache hits and ids still to be fetched.
    #[must_use]
    pub fn find_multiple_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
        required_depth: Option<u32>,
    ) -> MultiNodeLookup {
        let mut result = MultiNodeLookup::default();
        for node_id in node_ids {
            result.record(node_id, self.lookup(file_key, node_id, required_depth));
        }
        result
    }

    /// Validating variant of [`find_multiple_nodes`](Self::find_multiple_nodes).
    pub async fn find_multiple_nodes_validated<M: FileMetaSource>(
        &self,
        file_key: &str,
        node_ids: &[String],
        required_depth: Option<u32>,
        meta: &M,
    ) -> MultiNodeLookup {
        let mut result = MultiNodeLookup::default();
        for node_id in node_ids {
            let hit = self.lookup_validated(file_key, node_id, required_depth, meta).await;
            result.record(node_id, hit);
        }
        result
    }

    /// Build a snapshot with `source`'s file metadata and `nodes` as roots.
    #[must_use]
    pub fn merge_nodes_as_design(source: &Snapshot, nodes: Vec<Node>) -> Snapshot {
        source.with_nodes(nodes)
    }

    /// Drop every snapshot of `file_key`; returns how many were removed.
    pub fn clear_file_cache(&self, file_key: &str) -> usize {
        let removed = self
            .with_store(|store| store.remove_where(|key| key.is_for_file(file_key)))
            .unwrap_or(0);
        info!(file_key, removed, "Cleared cached snapshots for file");
        removed
    }

    /// Drop every snapshot.
    pub fn clear_all_cache(&self) {
        self.with_store(EvictionStore::clear);
        info!("Cleared all cached snapshots");
    }

    async fn lookup_validated<M: FileMetaSource>(
        &self,
        file_key: &str,
        node_id: &str,
        required_depth: Option<u32>,
        meta: &M,
    ) -> Option<NodeHit> {
        let hit = self.lookup(file_key, node_id, required_depth)?;
        if is_fresh(&hit.marker, file_key, meta).await {
            return Some(hit);
        }
        info!(file_key, node_id, "File changed upstream; invalidating cached views");
        self.clear_file_cache(file_key);
        None
    }

    // Entries are scanned most-recently-used first; the scan leaves recency alone.
    fn lookup(&self, file_key: &str, node_id: &str, required_depth: Option<u32>) -> Option<NodeHit> {
        let hit = self
            .with_store(|store| {
                store
                    .iter()
                    .filter(|(key, _)| key.is_for_file(file_key))
                    .find_map(|(key, entry)| {
                        answer(key.depth, &entry.snapshot, node_id, required_depth).map(|node| NodeHit {
                            node,
                            source: Arc::clone(&entry.snapshot),
                            marker: entry.marker.clone(),
                        })
                    })
            })
            .flatten();
        debug!(file_key, node_id, ?required_depth, hit = hit.is_some(), "Node cache lookup");
        hit
    }
}

/// Answer a node query from one snapshot, or `None` if it is not eligible.
///
/// Bounded queries use a permissive rule: the snapshot qualifies when either
/// its deepest root or the target's own subtree reaches `required` levels.
/// Unbounded queries against a depth-limited snapshot require the node's
/// whole reach (`root depth + subtree depth`) to stay strictly under the
/// fetch ceiling, since anything at the ceiling may have been cut off.
fn answer(tag: DepthTag, snapshot: &Snapshot, node_id: &str, required: Option<u32>) -> Option<Node> {
    let node = snapshot.find_node(node_id)?;
    match (required, tag) {
        (Some(required), _) => {
            let deep_enough = snapshot.realized_depth() >= required || subtree_depth(node) >= required;
            deep_enough.then(|| limit_depth(node, required))
        }
        (None, DepthTag::Unbounded) => Some(node.clone()),
        (None, DepthTag::Limited(ceiling)) => {
            let reach = root_depth(&snapshot.nodes, node_id)? + subtree_depth(node);
            (reach < ceiling).then(|| node.clone())
        }
    }
}
