//! In-memory snapshot storage for framecache.
//!
//! [`NodeCache`] keeps whole design snapshots in a bounded LRU and answers
//! node lookups against them under a depth constraint, optionally checking
//! the origin's modification marker before trusting a hit.

pub mod eviction;
pub mod freshness;
pub mod node_cache;

pub use eviction::EvictionStore;
pub use framecache_core::FileMeta;
pub use freshness::{FileMetaSource, is_fresh};
pub use node_cache::{DEFAULT_CAPACITY, MultiNodeLookup, NodeCache};
