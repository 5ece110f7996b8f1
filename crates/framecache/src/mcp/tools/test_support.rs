//! In-memory origin for tool tests.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Mutex;

use framecache_app::document::{RawFile, RawNodes};
use framecache_app::{CacheConfig, DesignService, DesignSource, FileMetaSource, RawDocument};
use framecache_core::FileMeta;
use serde_json::json;

/// Origin serving one fixed page and recording each document request.
#[derive(Default)]
pub struct StubOrigin {
    requests: Mutex<Vec<String>>,
}

impl StubOrigin {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl FileMetaSource for StubOrigin {
    type Error = String;

    async fn file_meta(&self, _file_key: &str) -> Result<FileMeta, Self::Error> {
        Ok(FileMeta::touched_at("v1"))
    }
}

impl DesignSource for StubOrigin {
    async fn fetch_file(&self, _file_key: &str, _depth: Option<u32>) -> Result<RawDocument, Self::Error> {
        self.requests.lock().unwrap().push("file".into());
        let file: RawFile = serde_json::from_value(json!({
            "lastModified": "v1",
            "document": {
                "id": "0:0", "name": "Document", "type": "DOCUMENT",
                "children": [{"id": "0:1", "name": "Page", "type": "CANVAS", "children": []}]
            }
        }))
        .expect("file response");
        Ok(RawDocument::File(file))
    }

    async fn fetch_nodes(
        &self,
        _file_key: &str,
        node_ids: &[String],
        _depth: Option<u32>,
    ) -> Result<RawDocument, Self::Error> {
        self.requests.lock().unwrap().push(format!("nodes {}", node_ids.join(",")));
        let nodes: serde_json::Map<String, serde_json::Value> = node_ids
            .iter()
            .map(|id| (id.clone(), json!({"document": {"id": id, "name": id, "type": "FRAME"}})))
            .collect();
        let response: RawNodes =
            serde_json::from_value(json!({"lastModified": "v1", "nodes": nodes})).expect("nodes response");
        Ok(RawDocument::Nodes {
            requested: node_ids.to_vec(),
            response,
        })
    }
}

pub fn service(origin: StubOrigin) -> DesignService<StubOrigin> {
    DesignService::from_config(origin, &CacheConfig::new(8, true)).expect("service")
}
