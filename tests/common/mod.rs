//! Common test utilities
//!
//! Shared fixtures for the integration tests: mock-backed session
//! bootstrap and sample targets.

use cri_targets::cdp::mock::{MockCdpConnection, MockConnector};
use cri_targets::{Config, EventBus, Session, SessionBootstrap};
use std::sync::Arc;

/// Handles to a session bootstrapped entirely over the mock transport
pub struct TestSession {
    pub session: Session,
    pub bus: EventBus,
    pub page_conn: Arc<MockCdpConnection>,
    pub browser_conn: Arc<MockCdpConnection>,
}

/// Bootstrap a session whose active target lives in `context_id`
pub async fn setup_session(config: Config, target_id: &str, context_id: &str) -> TestSession {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let page_conn = MockCdpConnection::new();
    page_conn.respond(
        "Target.getTargetInfo",
        serde_json::json!({
            "targetInfo": {
                "targetId": target_id,
                "type": "page",
                "browserContextId": context_id
            }
        }),
    );

    let browser_conn = MockCdpConnection::new();
    let connector = Arc::new(MockConnector::returning(Arc::clone(&browser_conn)));

    let bus = EventBus::default();
    let bootstrap = SessionBootstrap::new(config, bus.clone(), connector);

    let session = bootstrap
        .on_new_session(Arc::clone(&page_conn) as _, target_id)
        .await
        .expect("bootstrap should succeed against the mock transport");

    TestSession {
        session,
        bus,
        page_conn,
        browser_conn,
    }
}
