//! Snapshot service shared by CLI and MCP surfaces.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use framecache_core::{CacheKey, Snapshot};
use framecache_store::{MultiNodeLookup, NodeCache};
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::document::simplify;
use crate::source::DesignSource;

/// Serves design snapshots, answering from the node cache where it can and
/// fetching only what the cache cannot provide.
pub struct DesignService<S> {
    source: S,
    cache: NodeCache,
    validate_freshness: bool,
}

impl<S> DesignService<S> {
    /// Construct a service around an explicitly owned cache.
    pub const fn new(source: S, cache: NodeCache, validate_freshness: bool) -> Self {
        Self {
            source,
            cache,
            validate_freshness,
        }
    }

    /// Construct a service with a fresh cache sized by `config`.
    ///
    /// # Errors
    /// Returns an error if the configured capacity is zero.
    pub fn from_config(source: S, config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(
            source,
            NodeCache::new(config.capacity()?),
            config.validate_freshness,
        ))
    }

    /// Borrow the origin.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Borrow the underlying cache.
    pub const fn cache(&self) -> &NodeCache {
        &self.cache
    }

    /// Drop every cached view of `file_key`.
    pub fn clear_file_cache(&self, file_key: &str) -> usize {
        self.cache.clear_file_cache(file_key)
    }

    /// Drop every cached snapshot.
    pub fn clear_all_cache(&self) {
        self.cache.clear_all_cache();
    }
}

impl<S: DesignSource> DesignService<S> {
    /// Whole-file snapshot, optionally limited to `depth` levels below the pages.
    ///
    /// # Errors
    /// Returns an error if the snapshot is not cached and the fetch fails.
    pub async fn get_file(&self, file_key: &str, depth: Option<u32>) -> Result<Arc<Snapshot>> {
        let key = CacheKey::file(file_key, depth);
        if let Some(snapshot) = self.cached(&key).await {
            debug!(%key, "Serving file from cache");
            return Ok(snapshot);
        }

        // The API counts depth from the document node; snapshot roots are the pages one level down.
        let raw = self
            .source
            .fetch_file(file_key, depth.map(|d| d.saturating_add(1)))
            .await
            .map_err(|e| anyhow!("failed to fetch file {file_key}: {e}"))?;
        Ok(self.store(key, simplify(raw)))
    }

    /// Snapshot whose roots are `node_ids`, in request order.
    ///
    /// Nodes already held by a cached snapshot deep enough for `depth` are
    /// reused; only the rest is fetched. Repeated ids yield a single root. An
    /// empty id list means the whole file.
    ///
    /// # Errors
    /// Returns an error if a required fetch fails.
    pub async fn get_nodes(&self, file_key: &str, node_ids: &[String], depth: Option<u32>) -> Result<Arc<Snapshot>> {
        if node_ids.is_empty() {
            return self.get_file(file_key, depth).await;
        }
        let mut seen = HashSet::new();
        let unique: Vec<String> = node_ids.iter().filter(|id| seen.insert(id.as_str())).cloned().collect();
        let node_ids = unique.as_slice();

        let key = CacheKey::nodes(file_key, node_ids.iter().cloned(), depth);
        if let Some(snapshot) = self.cached(&key).await {
            debug!(%key, "Serving nodes from cache");
            return Ok(snapshot);
        }

        let MultiNodeLookup { hits, misses, source } = self.lookup(file_key, node_ids, depth).await;
        let snapshot = match source {
            Some(source) if misses.is_empty() => {
                debug!(%key, hits = hits.len(), "Assembled nodes entirely from cache");
                NodeCache::merge_nodes_as_design(&source, hits)
            }
            Some(source) => {
                info!(%key, hits = hits.len(), misses = misses.len(), "Fetching nodes missing from cache");
                let fetched = self.fetch_nodes(file_key, &misses, depth).await?;
                let mut by_id: HashMap<String, _> = hits
                    .into_iter()
                    .chain(fetched.nodes.iter().cloned())
                    .map(|node| (node.id.clone(), node))
                    .collect();
                let ordered = node_ids.iter().filter_map(|id| by_id.remove(id)).collect();
                let mut merged = NodeCache::merge_nodes_as_design(&source, ordered);
                merged.absorb_tables(&fetched);
                merged
            }
            None => self.fetch_nodes(file_key, node_ids, depth).await?,
        };
        Ok(self.store(key, snapshot))
    }

    async fn cached(&self, key: &CacheKey) -> Option<Arc<Snapshot>> {
        if self.validate_freshness {
            self.cache.get_validated(key, &self.source).await
        } else {
            self.cache.get(key)
        }
    }

    async fn lookup(&self, file_key: &str, node_ids: &[String], depth: Option<u32>) -> MultiNodeLookup {
        if self.validate_freshness {
            self.cache
                .find_multiple_nodes_validated(file_key, node_ids, depth, &self.source)
                .await
        } else {
            self.cache.find_multiple_nodes(file_key, node_ids, depth)
        }
    }

    async fn fetch_nodes(&self, file_key: &str, node_ids: &[String], depth: Option<u32>) -> Result<Snapshot> {
        let raw = self
            .source
            .fetch_nodes(file_key, node_ids, depth)
            .await
            .map_err(|e| anyhow!("failed to fetch nodes {} of file {file_key}: {e}", node_ids.join(",")))?;
        Ok(simplify(raw))
    }

    fn store(&self, key: CacheKey, snapshot: Snapshot) -> Arc<Snapshot> {
        let marker = snapshot.last_modified.clone();
        let snapshot = Arc::new(snapshot);
        self.cache.put(key, Arc::clone(&snapshot), marker);
        snapshot
    }
}
