//! Browser context manager
//!
//! Creates, activates, and disposes isolated browsing contexts and the
//! targets inside them, via the browser-level Target domain. All transport
//! errors propagate unchanged except the one documented stale-context
//! fallback in [`create_target`].

use super::session::Session;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Create a fresh isolated browsing context, make it the active context,
/// and open a target at `url` inside it. Returns the new target id.
pub async fn create_browser_context(session: &mut Session, url: &str) -> Result<String> {
    let context_id = session.browser().create_browser_context().await?;
    info!("Created browser context {}", context_id);

    session.set_active_browser_context_id(Some(context_id));

    create_target(session, url).await
}

/// Open a target at `url` inside the active browser context.
///
/// When the browser rejects the active context id as unknown (it was
/// disposed behind our back), the creation is retried exactly once without
/// a context id, falling back to the default context. Any other transport
/// error propagates unchanged.
pub async fn create_target(session: &mut Session, url: &str) -> Result<String> {
    let context_id = session.active_browser_context_id().map(str::to_string);

    match session
        .browser()
        .create_target(url, context_id.as_deref())
        .await
    {
        Ok(target_id) => Ok(target_id),
        Err(err) if context_id.is_some() && err.is_stale_browser_context() => {
            warn!(
                "Browser context {} is gone ({}), retrying in the default context",
                context_id.unwrap_or_default(),
                err
            );
            session.browser().create_target(url, None).await
        }
        Err(err) => Err(err),
    }
}

/// Dispose the browser context owning `target_id`.
///
/// Returns whether the disposed context was the active one; callers use
/// this to decide whether the active-context state must be reassigned.
pub async fn close_browser_context(session: &mut Session, target_id: &str) -> Result<bool> {
    let context_id = browser_context_id_for_target(session, target_id)
        .await?
        .ok_or_else(|| {
            Error::target_not_found(format!(
                "target {} has no browser context to dispose",
                target_id
            ))
        })?;

    let was_active = session.active_browser_context_id() == Some(context_id.as_str());

    session
        .browser()
        .dispose_browser_context(&context_id)
        .await?;
    info!(
        "Disposed browser context {} (was active: {})",
        context_id, was_active
    );

    Ok(was_active)
}

/// Adopt `target_id`'s owning context as the active context and bring the
/// target to the foreground.
pub async fn switch_browser_context(session: &mut Session, target_id: &str) -> Result<()> {
    let context_id = browser_context_id_for_target(session, target_id).await?;
    debug!(
        "Switching to browser context {:?} via target {}",
        context_id, target_id
    );

    // The active context id is re-derived from the target's owning context,
    // never stored independently, so the two cannot diverge
    session.set_active_browser_context_id(context_id);

    session.browser().activate_target(target_id).await
}

/// Resolve the browser context owning `target_id`.
///
/// Always a live `Target.getTargetInfo` query; the owning context is never
/// served from a cache that could be stale across a switch.
pub async fn browser_context_id_for_target(
    session: &Session,
    target_id: &str,
) -> Result<Option<String>> {
    let info = session.browser().get_target_info(target_id).await?;
    Ok(info.browser_context_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::client::TargetDomain;
    use crate::cdp::mock::MockCdpConnection;
    use std::sync::Arc;

    fn mock_session(
        browser_conn: &Arc<MockCdpConnection>,
        active_context: Option<&str>,
    ) -> Session {
        let page = TargetDomain::new(MockCdpConnection::new());
        let browser = TargetDomain::new(Arc::clone(browser_conn) as _);
        Session::new(
            page,
            browser,
            "T-ACTIVE".to_string(),
            active_context.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_create_browser_context_adopts_context_and_opens_target() {
        let conn = MockCdpConnection::new();
        conn.respond(
            "Target.createBrowserContext",
            serde_json::json!({ "browserContextId": "CTX1" }),
        );
        conn.respond(
            "Target.createTarget",
            serde_json::json!({ "targetId": "T1" }),
        );

        let mut session = mock_session(&conn, None);
        let target_id = create_browser_context(&mut session, "about:blank")
            .await
            .unwrap();

        assert_eq!(target_id, "T1");
        assert_eq!(session.active_browser_context_id(), Some("CTX1"));

        // The target was created inside the fresh context
        let params = conn.call_params("Target.createTarget");
        assert_eq!(params[0]["browserContextId"], "CTX1");
    }

    #[tokio::test]
    async fn test_create_target_falls_back_on_stale_context() {
        let conn = MockCdpConnection::new();
        conn.fail(
            "Target.createTarget",
            "Failed to find browser context with id CTX-GONE",
        );
        conn.respond(
            "Target.createTarget",
            serde_json::json!({ "targetId": "T2" }),
        );

        let mut session = mock_session(&conn, Some("CTX-GONE"));
        let target_id = create_target(&mut session, "about:blank").await.unwrap();

        assert_eq!(target_id, "T2");
        let params = conn.call_params("Target.createTarget");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0]["browserContextId"], "CTX-GONE");
        // Retry went to the default context
        assert!(params[1].get("browserContextId").is_none());
    }

    #[tokio::test]
    async fn test_create_target_propagates_other_errors() {
        let conn = MockCdpConnection::new();
        conn.fail("Target.createTarget", "Target closed");

        let mut session = mock_session(&conn, Some("CTX1"));
        let err = create_target(&mut session, "about:blank").await.unwrap_err();

        assert!(matches!(err, Error::Cdp(_)));
        // No fallback attempt for non-stale errors
        assert_eq!(conn.call_count("Target.createTarget"), 1);
    }

    #[tokio::test]
    async fn test_create_target_without_context_does_not_fall_back() {
        let conn = MockCdpConnection::new();
        conn.fail(
            "Target.createTarget",
            "Failed to find browser context with id X",
        );

        let mut session = mock_session(&conn, None);
        assert!(create_target(&mut session, "about:blank").await.is_err());
        assert_eq!(conn.call_count("Target.createTarget"), 1);
    }

    #[tokio::test]
    async fn test_close_browser_context_reports_active() {
        let conn = MockCdpConnection::new();
        conn.respond(
            "Target.getTargetInfo",
            serde_json::json!({
                "targetInfo": {
                    "targetId": "T1",
                    "type": "page",
                    "browserContextId": "CTX1"
                }
            }),
        );

        let mut session = mock_session(&conn, Some("CTX1"));
        let was_active = close_browser_context(&mut session, "T1").await.unwrap();

        assert!(was_active);
        let params = conn.call_params("Target.disposeBrowserContext");
        assert_eq!(params[0]["browserContextId"], "CTX1");
    }

    #[tokio::test]
    async fn test_close_browser_context_reports_inactive() {
        let conn = MockCdpConnection::new();
        conn.respond(
            "Target.getTargetInfo",
            serde_json::json!({
                "targetInfo": {
                    "targetId": "T1",
                    "type": "page",
                    "browserContextId": "CTX2"
                }
            }),
        );

        let mut session = mock_session(&conn, Some("CTX1"));
        let was_active = close_browser_context(&mut session, "T1").await.unwrap();

        assert!(!was_active);
        // Reporting inactive leaves the active context untouched
        assert_eq!(session.active_browser_context_id(), Some("CTX1"));
    }

    #[tokio::test]
    async fn test_switch_browser_context_rederives_active_context() {
        let conn = MockCdpConnection::new();
        conn.respond(
            "Target.getTargetInfo",
            serde_json::json!({
                "targetInfo": {
                    "targetId": "T9",
                    "type": "page",
                    "browserContextId": "CTX9"
                }
            }),
        );

        let mut session = mock_session(&conn, Some("CTX1"));
        switch_browser_context(&mut session, "T9").await.unwrap();

        assert_eq!(session.active_browser_context_id(), Some("CTX9"));
        let params = conn.call_params("Target.activateTarget");
        assert_eq!(params[0]["targetId"], "T9");
    }

    #[tokio::test]
    async fn test_switch_to_default_context_target() {
        let conn = MockCdpConnection::new();
        conn.respond(
            "Target.getTargetInfo",
            serde_json::json!({
                "targetInfo": { "targetId": "T5", "type": "page" }
            }),
        );

        let mut session = mock_session(&conn, Some("CTX1"));
        switch_browser_context(&mut session, "T5").await.unwrap();

        // Target lives in the default context
        assert_eq!(session.active_browser_context_id(), None);
    }
}
