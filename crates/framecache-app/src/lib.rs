//! Application layer for framecache.
//!
//! Configuration, the remote design API client, raw-to-simplified document
//! conversion, and the [`DesignService`] that reconciles cached snapshots with
//! remote fetches. Shared by the CLI and MCP surfaces.

pub mod config;
pub mod document;
pub mod service;
pub mod source;

// Re-exports for convenience
pub use config::{ApiConfig, AppConfig, CacheConfig, TOKEN_ENV};
pub use document::{RawDocument, simplify};
pub use service::DesignService;
pub use source::{DesignSource, FigmaClient, SourceError};
pub use framecache_store::FileMetaSource;
