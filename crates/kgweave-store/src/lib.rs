//! kgweave Storage Sink
//!
//! Uploads merged JSON-LD documents to a GraphDB-style triple store over its
//! RDF4J REST API.
//!
//! # Examples
//!
//! ```no_run
//! use kgweave_store::GraphDbStore;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), kgweave_store::StoreError> {
//! let store = GraphDbStore::new("http://localhost:7200", "science")?;
//! let doc = json!({"@context": {"@vocab": "http://example.org/science#"}, "@graph": []});
//! store.upload_jsonld(&doc, Some("http://example.org/graphs/run-1")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Default GraphDB endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:7200";

const JSONLD_CONTENT_TYPE: &str = "application/ld+json";

/// Errors that can occur while uploading to a triple store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection or transport failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store answered with a non-success status
    #[error("Upload rejected with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// Invalid store configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A GraphDB repository reachable over HTTP
#[derive(Debug, Clone)]
pub struct GraphDbStore {
    base_url: String,
    repository: String,
    client: reqwest::Client,
}

impl GraphDbStore {
    /// Create a store handle for `repository` at `base_url`
    pub fn new(base_url: impl Into<String>, repository: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, repository, Duration::from_secs(60))
    }

    /// Create a store handle with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        repository: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let repository = repository.into();

        if base_url.is_empty() {
            return Err(StoreError::InvalidConfig("base URL must not be empty".to_string()));
        }
        if repository.trim().is_empty() || repository.contains('/') {
            return Err(StoreError::InvalidConfig(format!(
                "invalid repository id '{}'",
                repository
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            repository,
            client,
        })
    }

    /// Repository id
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// `{base}/repositories/{repo}/statements`
    pub fn statements_url(&self) -> String {
        format!("{}/repositories/{}/statements", self.base_url, self.repository)
    }

    /// POST `document` to the repository, optionally into the named graph `graph`.
    ///
    /// Succeeds on HTTP 200 or 204.
    pub async fn upload_jsonld(&self, document: &Value, graph: Option<&str>) -> Result<(), StoreError> {
        let body = serde_json::to_vec(document)?;
        let url = self.statements_url();

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, JSONLD_CONTENT_TYPE)
            .body(body);
        if let Some(graph) = graph {
            request = request.query(&[("context", format!("<{}>", graph))]);
        }

        let response = request.send().await.map_err(|e| {
            error!("Error uploading to GraphDB: {}", e);
            StoreError::Connection(e.to_string())
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::OK || status == reqwest::StatusCode::NO_CONTENT {
            info!("Uploaded JSON-LD to repository '{}'", self.repository);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("Failed to upload to GraphDB: HTTP {}: {}", status, body);
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
