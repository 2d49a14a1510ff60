//! HTTP target list endpoint
//!
//! The top-level "list all targets" call: Chrome exposes the live target
//! list over plain HTTP at `/json`, parameterized by host/port.

use super::types::TargetInfo;
use crate::{Config, Error};
use async_trait::async_trait;
use tracing::debug;

/// Trait for querying the live target list
///
/// Target Discovery depends on this seam so tests can script list contents
/// without a running browser.
#[async_trait]
pub trait TargetLister: Send + Sync {
    /// List all targets currently known to the browser
    async fn list_targets(&self) -> Result<Vec<TargetInfo>, Error>;
}

/// Target lister backed by the browser's HTTP debug endpoint
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    /// Full URL of the /json list endpoint
    url: String,
    client: reqwest::Client,
}

impl HttpEndpoint {
    /// Create an endpoint for `http://{host}:{port}/json`
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.list_endpoint(),
            client: reqwest::Client::new(),
        }
    }

    /// Create an endpoint against an explicit URL
    pub fn with_url<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TargetLister for HttpEndpoint {
    async fn list_targets(&self) -> Result<Vec<TargetInfo>, Error> {
        debug!("Fetching targets from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Failed to fetch targets: {}", e)))?;

        let targets: Vec<TargetInfo> = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse targets: {}", e)))?;

        Ok(targets)
    }
}
