//! Unified error types for cri-targets

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for cri-targets
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors (carries the remote error message verbatim)
    #[error("CDP error: {0}")]
    Cdp(String),

    /// HTTP errors from the target list endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No page target is visible on the target list yet
    #[error("No targets created yet: {0}")]
    NoPageTarget(String),

    /// Target not found
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new HTTP error
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Error::Http(msg.into())
    }

    /// Create a new no-page-target error
    pub fn no_page_target<S: Into<String>>(msg: S) -> Self {
        Error::NoPageTarget(msg.into())
    }

    /// Create a new target not found error
    pub fn target_not_found<S: Into<String>>(id: S) -> Self {
        Error::TargetNotFound(id.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Whether this error is the browser rejecting a stale browser context id.
    ///
    /// CDP has no machine-readable code for this condition, so the check is
    /// a substring scan of the remote message. Chrome reports
    /// "Failed to find browser context with id <id>"; some protocol versions
    /// only mention the offending "browserContextId" parameter.
    pub fn is_stale_browser_context(&self) -> bool {
        match self {
            Error::Cdp(msg) => {
                msg.contains("Failed to find browser context with id")
                    || msg.contains("browserContextId")
            }
            _ => false,
        }
    }

    /// Whether this error is the target list not reflecting a fresh target yet
    pub fn is_no_page_target(&self) -> bool {
        matches!(self, Error::NoPageTarget(_))
    }
}
