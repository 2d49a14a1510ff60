//! CDP (Chrome DevTools Protocol) type definitions
//!
//! Wire types for the JSON-RPC framing plus the Target domain payloads this
//! subsystem consumes.

use serde::{Deserialize, Serialize};

/// CDP JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    /// Request ID
    pub id: u64,
    /// Method name (e.g., "Target.createTarget")
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Session ID for multi-session targets
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// CDP JSON-RPC notification (event)
#[derive(Debug, Clone, Deserialize)]
pub struct CdpNotification {
    /// Event method (e.g., "Target.targetCreated")
    pub method: String,
    /// Event parameters
    #[serde(default)]
    pub params: serde_json::Value,
    /// Session ID for multi-session targets
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// CDP JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct CdpRpcResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    #[serde(default)]
    pub result: serde_json::Value,
    /// Error if any
    #[serde(default)]
    pub error: Option<CdpErrorDetail>,
}

/// CDP error detail
#[derive(Debug, Clone, Deserialize)]
pub struct CdpErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// A live debuggee exposed by the remote debugging protocol.
///
/// Deserializes from both shapes the protocol uses: the HTTP `/json` list
/// (`id`, `webSocketDebuggerUrl`) and the Target domain's `TargetInfo`
/// (`targetId`, `browserContextId`, `openerId`). Targets are created and
/// destroyed entirely by the remote browser; this crate only observes them
/// and references them by id.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TargetInfo {
    /// Target ID (stable for the target's lifetime)
    #[serde(rename = "id", alias = "targetId")]
    pub id: String,
    /// Target type ("page", "iframe", "service_worker", ...)
    #[serde(rename = "type", default)]
    pub target_type: String,
    /// Current document title
    #[serde(default)]
    pub title: String,
    /// Current address (may change on navigation/redirect)
    #[serde(default)]
    pub url: String,
    /// Whether a debugger is attached
    #[serde(default)]
    pub attached: bool,
    /// Owning browser context; absent means the default context
    #[serde(rename = "browserContextId", default, skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<String>,
    /// Target that opened this one (link/popup), when known
    #[serde(rename = "openerId", default, skip_serializing_if = "Option::is_none")]
    pub opener_id: Option<String>,
    /// WebSocket URL for attaching to this target
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
    /// Whether this target is a browser page
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }

    /// Whether the opener id is present and non-empty
    pub fn has_opener(&self) -> bool {
        self.opener_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// `Target.targetCreated` event payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetCreatedEvent {
    /// The freshly created target
    #[serde(rename = "targetInfo")]
    pub target_info: TargetInfo,
}

/// `Target.setDiscoverTargets` parameters
#[derive(Debug, Clone, Serialize)]
pub struct SetDiscoverTargetsParams {
    /// Whether to discover available targets
    pub discover: bool,
}

/// `Target.getTargetInfo` parameters
#[derive(Debug, Clone, Serialize)]
pub struct GetTargetInfoParams {
    /// Target ID to query
    #[serde(rename = "targetId")]
    pub target_id: String,
}

/// `Target.getTargetInfo` response
#[derive(Debug, Clone, Deserialize)]
pub struct GetTargetInfoResponse {
    /// Target info as reported by the browser at query time
    #[serde(rename = "targetInfo")]
    pub target_info: TargetInfo,
}

/// `Target.createTarget` parameters
#[derive(Debug, Clone, Serialize)]
pub struct CreateTargetParams {
    /// Initial URL of the new target
    pub url: String,
    /// Context to open the target in; absent means the default context
    #[serde(rename = "browserContextId", skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<String>,
}

/// `Target.createTarget` response
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTargetResponse {
    /// ID of the new target
    #[serde(rename = "targetId")]
    pub target_id: String,
}

/// `Target.createBrowserContext` response
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBrowserContextResponse {
    /// ID of the new isolated context
    #[serde(rename = "browserContextId")]
    pub browser_context_id: String,
}

/// `Target.disposeBrowserContext` parameters
#[derive(Debug, Clone, Serialize)]
pub struct DisposeBrowserContextParams {
    /// Context to dispose (closes all targets inside it)
    #[serde(rename = "browserContextId")]
    pub browser_context_id: String,
}

/// `Target.activateTarget` parameters
#[derive(Debug, Clone, Serialize)]
pub struct ActivateTargetParams {
    /// Target to bring to the foreground
    #[serde(rename = "targetId")]
    pub target_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdp_request_serialization() {
        let request = CdpRequest {
            id: 1,
            method: "Target.setDiscoverTargets".to_string(),
            params: Some(serde_json::json!({ "discover": true })),
            session_id: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"method\":\"Target.setDiscoverTargets\""));
    }

    #[test]
    fn test_cdp_request_without_params() {
        let request = CdpRequest {
            id: 2,
            method: "Target.createBrowserContext".to_string(),
            params: None,
            session_id: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        // params should not be serialized when None
        assert!(!json.contains("\"params\""));
    }

    #[test]
    fn test_target_info_from_http_list_shape() {
        let json = serde_json::json!({
            "id": "T1",
            "type": "page",
            "title": "Example Domain",
            "url": "http://example.com/",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/T1"
        });

        let target: TargetInfo = serde_json::from_value(json).unwrap();
        assert_eq!(target.id, "T1");
        assert!(target.is_page());
        assert!(target.browser_context_id.is_none());
    }

    #[test]
    fn test_target_info_from_target_domain_shape() {
        let json = serde_json::json!({
            "targetId": "T2",
            "type": "page",
            "title": "",
            "url": "about:blank",
            "attached": false,
            "browserContextId": "CTX1",
            "openerId": "T1"
        });

        let target: TargetInfo = serde_json::from_value(json).unwrap();
        assert_eq!(target.id, "T2");
        assert_eq!(target.browser_context_id.as_deref(), Some("CTX1"));
        assert!(target.has_opener());
    }

    #[test]
    fn test_empty_opener_id_is_not_an_opener() {
        let json = serde_json::json!({
            "targetId": "T3",
            "type": "page",
            "openerId": ""
        });

        let target: TargetInfo = serde_json::from_value(json).unwrap();
        assert!(!target.has_opener());
    }

    #[test]
    fn test_create_target_params_omit_absent_context() {
        let params = CreateTargetParams {
            url: "about:blank".to_string(),
            browser_context_id: None,
        };

        let json = serde_json::to_string(&params).unwrap();
        assert!(!json.contains("browserContextId"));
    }
}
