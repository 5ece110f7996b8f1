//! Coarse, file-level freshness checks against the origin's modification marker.

use framecache_core::FileMeta;
use std::fmt;
use tracing::{debug, warn};

/// Origin of the current per-file modification marker.
#[allow(async_fn_in_trait)]
pub trait FileMetaSource: Send + Sync {
    /// Error type bubbled up from the metadata fetch.
    type Error: fmt::Display + Send;

    /// Fetch current metadata for `file_key`.
    ///
    /// # Errors
    /// Returns a source-specific error when the metadata cannot be fetched.
    async fn file_meta(&self, file_key: &str) -> Result<FileMeta, Self::Error>;
}

/// Decide whether a snapshot captured with marker `stored` is still current.
///
/// An empty stored marker is trusted without asking the origin. A failed
/// metadata fetch keeps the snapshot, as does a response without a marker.
/// Only two different non-empty markers mean stale.
pub async fn is_fresh<M: FileMetaSource>(stored: &str, file_key: &str, source: &M) -> bool {
    if stored.is_empty() {
        return true;
    }

    let meta = match source.file_meta(file_key).await {
        Ok(meta) => meta,
        Err(err) => {
            warn!(file_key, error = %err, "Freshness check failed; keeping cached snapshot");
            return true;
        }
    };

    match meta.last_touched_at.as_deref() {
        None | Some("") => true,
        Some(current) if current == stored => true,
        Some(current) => {
            debug!(file_key, stored, current, "Cached snapshot is stale");
            false
        }
    }
}
