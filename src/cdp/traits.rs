//! CDP (Chrome DevTools Protocol) layer traits
//!
//! Abstract interfaces for CDP communication. Everything above this seam is
//! testable against the mock transport.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// CDP event representation
#[derive(Debug, Clone)]
pub struct CdpEvent {
    /// Event method (e.g., "Target.targetCreated")
    pub method: String,
    /// Event parameters
    pub params: Value,
    /// Session ID (for multi-session targets)
    pub session_id: Option<String>,
}

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<CdpError>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

/// CDP connection trait
///
/// Represents one established connection to a Chrome DevTools Protocol
/// endpoint (a page-level session or the browser-level debug URL).
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for the response
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpResponse, crate::Error>;

    /// Subscribe to CDP events
    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// Connector trait
///
/// Opens a new CDP connection to a WebSocket URL. Session bootstrap goes
/// through this seam to reach the browser-level debug URL, so tests can
/// substitute the mock transport.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to a CDP WebSocket endpoint
    async fn connect(&self, url: &str) -> Result<Arc<dyn CdpConnection>, crate::Error>;
}
