//! Remote design API access.

use std::time::Duration;

use framecache_core::FileMeta;
use framecache_store::FileMetaSource;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::document::{RawDocument, RawFile, RawMeta, RawNodes};

/// Fetches raw documents from the origin service.
///
/// Every source also answers metadata queries, which the cache uses for
/// freshness checks.
#[allow(async_fn_in_trait)]
pub trait DesignSource: FileMetaSource {
    /// Fetch a whole file, optionally limited to `depth` levels.
    ///
    /// # Errors
    /// Returns a source-specific error when the request fails.
    async fn fetch_file(&self, file_key: &str, depth: Option<u32>) -> Result<RawDocument, Self::Error>;

    /// Fetch specific nodes of a file, optionally limited to `depth` levels.
    ///
    /// # Errors
    /// Returns a source-specific error when the request fails.
    async fn fetch_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
        depth: Option<u32>,
    ) -> Result<RawDocument, Self::Error>;
}

/// Errors raised by [`FigmaClient`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The API answered with an error status.
    #[error("design API returned {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request never produced a response.
    #[error("design API request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("failed to decode design API response: {0}")]
    Decode(String),

    /// The blocking request task could not be joined.
    #[error("task join error: {0}")]
    Join(String),
}

#[derive(Clone)]
enum Auth {
    Token(String),
    Bearer(String),
}

/// Blocking HTTP client for the Figma REST API, bridged into async callers.
#[derive(Clone)]
pub struct FigmaClient {
    agent: ureq::Agent,
    base_url: String,
    auth: Auth,
}

impl FigmaClient {
    /// Build a client from API settings.
    ///
    /// # Errors
    /// Returns an error when no token is configured.
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let token = config.require_token()?.to_owned();
        let auth = if config.oauth {
            Auth::Bearer(token)
        } else {
            Auth::Token(token)
        };
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .new_agent();
        Ok(Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, SourceError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?query, "Requesting design API");

        let mut request = self.agent.get(&url);
        request = match &self.auth {
            Auth::Token(token) => request.header("X-Figma-Token", token),
            Auth::Bearer(token) => request.header("Authorization", &format!("Bearer {token}")),
        };
        for (name, value) in query {
            request = request.query(*name, value);
        }

        let response = request.call().map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.into_body().read_to_string().unwrap_or_default();
            return Err(SourceError::Http { status, body });
        }
        response
            .into_body()
            .read_json()
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    // ureq is blocking; run each request on the blocking pool.
    async fn get_json_async<T>(&self, path: String, query: Vec<(&'static str, String)>) -> Result<T, SourceError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.get_json(&path, &query))
            .await
            .map_err(|e| SourceError::Join(e.to_string()))?
    }
}

fn depth_query(depth: Option<u32>) -> Vec<(&'static str, String)> {
    depth.map(|d| ("depth", d.to_string())).into_iter().collect()
}

impl FileMetaSource for FigmaClient {
    type Error = SourceError;

    async fn file_meta(&self, file_key: &str) -> Result<FileMeta, Self::Error> {
        let meta: RawMeta = self
            .get_json_async(format!("/files/{file_key}/meta"), Vec::new())
            .await?;
        Ok(meta.file)
    }
}

impl DesignSource for FigmaClient {
    async fn fetch_file(&self, file_key: &str, depth: Option<u32>) -> Result<RawDocument, Self::Error> {
        let file: RawFile = self
            .get_json_async(format!("/files/{file_key}"), depth_query(depth))
            .await?;
        Ok(RawDocument::File(file))
    }

    async fn fetch_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
        depth: Option<u32>,
    ) -> Result<RawDocument, Self::Error> {
        let mut query = vec![("ids", node_ids.join(","))];
        query.extend(depth_query(depth));
        let response: RawNodes = self
            .get_json_async(format!("/files/{file_key}/nodes"), query)
            .await?;
        Ok(RawDocument::Nodes {
            requested: node_ids.to_vec(),
            response,
        })
    }
}
