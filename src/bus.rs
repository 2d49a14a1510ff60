//! Shared event bus and session barrier
//!
//! Broadcast channel carrying the two lifecycle notifications other
//! subsystems consume: "a new session is being set up" (with a barrier to
//! wait on) and "the browser created a page target". Fire-and-forget: a
//! send with no subscribers is not an error.

use crate::cdp::types::TargetCreatedEvent;
use tokio::sync::{broadcast, watch};
use tracing::debug;

/// Events broadcast on the shared bus
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// A new protocol session is being bootstrapped. Subsystems that must
    /// not race ahead of session setup wait on the carried barrier.
    SessionCreated(SessionBarrier),
    /// The browser reported a newly created page target
    TargetCreated(TargetCreatedEvent),
}

/// Waitable completion signal published at the start of session bootstrap
/// and released once bootstrap finishes.
#[derive(Debug, Clone)]
pub struct SessionBarrier {
    rx: watch::Receiver<bool>,
}

impl SessionBarrier {
    /// Wait until the barrier is released.
    ///
    /// Also returns if the owning guard is dropped without an explicit
    /// release, so an aborted bootstrap cannot strand waiters.
    pub async fn wait(mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Whether the barrier has already been released
    pub fn is_released(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Releasing side of a [`SessionBarrier`]
#[derive(Debug)]
pub struct BarrierGuard {
    tx: watch::Sender<bool>,
}

impl BarrierGuard {
    /// Release the barrier, waking every waiter
    pub fn release(self) {
        let _ = self.tx.send(true);
    }
}

/// Create a linked guard/barrier pair
pub fn barrier() -> (BarrierGuard, SessionBarrier) {
    let (tx, rx) = watch::channel(false);
    (BarrierGuard { tx }, SessionBarrier { rx })
}

/// Shared event bus over a broadcast channel
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new(channel_capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(channel_capacity);
        Self { tx }
    }

    /// Subscribe to bus events
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all subscribers
    pub fn emit(&self, event: BusEvent) {
        if self.tx.send(event).is_err() {
            // send only fails with no receivers, which is fine for
            // fire-and-forget lifecycle notifications
            debug!("No subscribers for bus event");
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
