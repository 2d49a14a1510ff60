//! Session bootstrap
//!
//! Runs once per newly established protocol session: publishes the session
//! barrier, adopts the session's handles as the new active state, opens the
//! independent browser-level connection, arms target discovery, and keeps a
//! standing handler that re-broadcasts page-creation events on the bus.

use super::session::Session;
use crate::bus::{barrier, BusEvent, EventBus};
use crate::cdp::client::TargetDomain;
use crate::cdp::traits::{CdpConnection, Connector};
use crate::cdp::types::TargetCreatedEvent;
use crate::{Config, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reacts to new protocol sessions
pub struct SessionBootstrap {
    config: Config,
    bus: EventBus,
    connector: Arc<dyn Connector>,
}

impl SessionBootstrap {
    /// Create a bootstrap handler
    pub fn new(config: Config, bus: EventBus, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            bus,
            connector,
        }
    }

    /// The shared event bus lifecycle events go out on
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Handle a newly established protocol session.
    ///
    /// Publishes the session barrier on the bus before anything else, so
    /// dependent subsystems can wait for setup to finish instead of racing
    /// it, and releases the barrier only after discovery is armed. Returns
    /// the new session state; the caller swaps it in for the previous one
    /// (last-session-wins).
    pub async fn on_new_session(
        &self,
        client: Arc<dyn CdpConnection>,
        current_target_id: &str,
    ) -> Result<Session> {
        info!("Bootstrapping session for target {}", current_target_id);

        let (guard, session_barrier) = barrier();
        self.bus.emit(BusEvent::SessionCreated(session_barrier));

        let page = TargetDomain::new(client);

        // The owning context is resolved live from the browser, not assumed
        let target_info = page.get_target_info(current_target_id).await?;
        let active_context_id = target_info.browser_context_id;
        debug!(
            "Active target {} owned by context {:?}",
            current_target_id, active_context_id
        );

        // Independent browser-level connection for context management
        let browser_connection = self
            .connector
            .connect(&self.config.browser_debug_url)
            .await?;
        let browser = TargetDomain::new(browser_connection);

        // Subscribe before arming discovery so no creation event is lost
        let events = page.listen_events().await?;
        page.set_discover_targets(true).await?;

        self.spawn_target_created_forwarder(events);

        guard.release();

        Ok(Session::new(
            page,
            browser,
            current_target_id.to_string(),
            active_context_id,
        ))
    }

    /// Standing handler re-broadcasting page-creation notifications.
    ///
    /// A created page is surfaced when it has an opener (was opened by
    /// another page via link/popup), or unconditionally on Firefox, which
    /// does not supply opener ids reliably.
    fn spawn_target_created_forwarder(
        &self,
        mut events: tokio::sync::mpsc::Receiver<crate::cdp::traits::CdpEvent>,
    ) {
        let bus = self.bus.clone();
        let firefox = self.config.firefox;

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if event.method != "Target.targetCreated" {
                    continue;
                }

                let created: TargetCreatedEvent = match serde_json::from_value(event.params) {
                    Ok(created) => created,
                    Err(e) => {
                        warn!("Malformed targetCreated event: {}", e);
                        continue;
                    }
                };

                if created.target_info.is_page() && (created.target_info.has_opener() || firefox) {
                    info!(
                        "Target created: {} ({})",
                        created.target_info.id, created.target_info.url
                    );
                    bus.emit(BusEvent::TargetCreated(created));
                }
            }
            debug!("targetCreated forwarder exited");
        });
    }
}
