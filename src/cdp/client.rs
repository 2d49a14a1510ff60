//! Typed Target-domain client
//!
//! High-level wrapper over a CDP connection exposing the `Target.*` RPCs
//! this subsystem consumes. Method names on the wire are preserved exactly
//! for protocol compatibility.

use super::connection::CdpWebSocketConnection;
use super::traits::{CdpConnection, CdpEvent, Connector};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Typed client for the CDP Target domain
#[derive(Debug, Clone)]
pub struct TargetDomain {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl TargetDomain {
    /// Create a new Target-domain client over an established connection
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Get the underlying connection
    pub fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    /// Call a raw CDP method and return its result payload
    async fn call_method(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        debug!("Calling CDP method: {}", method);

        let response = self.connection.send_command(method, params).await?;

        response
            .result
            .ok_or_else(|| Error::cdp("No result in response"))
    }

    /// Enable or disable target-discovery notifications
    pub async fn set_discover_targets(&self, discover: bool) -> Result<(), Error> {
        info!("Setting target discovery: {}", discover);

        let params = SetDiscoverTargetsParams { discover };
        let _ = self
            .call_method("Target.setDiscoverTargets", serde_json::to_value(params)?)
            .await?;

        Ok(())
    }

    /// Query target info as reported by the browser right now
    pub async fn get_target_info(&self, target_id: &str) -> Result<TargetInfo, Error> {
        debug!("Getting target info for {}", target_id);

        let params = GetTargetInfoParams {
            target_id: target_id.to_string(),
        };
        let result = self
            .call_method("Target.getTargetInfo", serde_json::to_value(params)?)
            .await?;

        let response: GetTargetInfoResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse getTargetInfo response: {}", e)))?;

        Ok(response.target_info)
    }

    /// Create a fresh isolated browsing context
    pub async fn create_browser_context(&self) -> Result<String, Error> {
        info!("Creating browser context");

        let result = self
            .call_method("Target.createBrowserContext", serde_json::json!({}))
            .await?;

        let response: CreateBrowserContextResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse createBrowserContext response: {}", e)))?;

        Ok(response.browser_context_id)
    }

    /// Open a target at `url`, optionally inside a browser context
    pub async fn create_target(
        &self,
        url: &str,
        browser_context_id: Option<&str>,
    ) -> Result<String, Error> {
        info!(
            "Creating target at {} (context: {:?})",
            url, browser_context_id
        );

        let params = CreateTargetParams {
            url: url.to_string(),
            browser_context_id: browser_context_id.map(|id| id.to_string()),
        };
        let result = self
            .call_method("Target.createTarget", serde_json::to_value(params)?)
            .await?;

        let response: CreateTargetResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse createTarget response: {}", e)))?;

        Ok(response.target_id)
    }

    /// Dispose a browser context, closing every target inside it
    pub async fn dispose_browser_context(&self, browser_context_id: &str) -> Result<(), Error> {
        info!("Disposing browser context {}", browser_context_id);

        let params = DisposeBrowserContextParams {
            browser_context_id: browser_context_id.to_string(),
        };
        let _ = self
            .call_method("Target.disposeBrowserContext", serde_json::to_value(params)?)
            .await?;

        Ok(())
    }

    /// Bring a target to the foreground
    pub async fn activate_target(&self, target_id: &str) -> Result<(), Error> {
        info!("Activating target {}", target_id);

        let params = ActivateTargetParams {
            target_id: target_id.to_string(),
        };
        let _ = self
            .call_method("Target.activateTarget", serde_json::to_value(params)?)
            .await?;

        Ok(())
    }

    /// Subscribe to events from the underlying connection
    pub async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, Error> {
        self.connection.listen_events().await
    }
}

/// Connector opening real WebSocket connections
#[derive(Debug, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn CdpConnection>, Error> {
        let connection = CdpWebSocketConnection::new(url).await?;
        Ok(connection as Arc<dyn CdpConnection>)
    }
}
