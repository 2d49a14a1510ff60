//! Mock CDP implementation for testing
//!
//! Scriptable mock transport: per-method response queues, a recorded call
//! log, and manual event injection. Used by unit tests here and by the
//! integration tests under `tests/`.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::{CdpConnection, CdpEvent, CdpResponse, Connector};
use super::types::TargetInfo;
use crate::cdp::endpoint::TargetLister;
use crate::Error;

/// One scripted reply: a result payload or a CDP error message
type ScriptedReply = std::result::Result<serde_json::Value, String>;

/// Mock CDP connection with scriptable per-method responses
///
/// Unscripted methods succeed with an empty result, so tests only script
/// the calls they care about.
#[derive(Debug)]
pub struct MockCdpConnection {
    #[allow(dead_code)]
    id: String,
    is_active: AtomicBool,
    next_id: AtomicU64,
    responses: Mutex<HashMap<String, VecDeque<ScriptedReply>>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    event_subscribers: Mutex<Vec<tokio::sync::mpsc::UnboundedSender<CdpEvent>>>,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            is_active: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            event_subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Script the next response for `method`
    pub fn respond(&self, method: &str, result: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(result));
    }

    /// Script the next call to `method` to fail with a CDP error message
    pub fn fail(&self, method: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Recorded params for every call to `method`, in order
    pub fn call_params(&self, method: &str) -> Vec<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    /// Number of calls to `method` so far
    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    /// Inject an event as if the remote endpoint had sent it
    pub fn emit_event(&self, method: &str, params: serde_json::Value) {
        let event = CdpEvent {
            method: method.to_string(),
            params,
            session_id: None,
        };

        let mut subscribers = self.event_subscribers.lock().unwrap();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::cdp("Connection is closed"));
        }

        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(Ok(result)) => Ok(CdpResponse {
                id,
                result: Some(result),
                error: None,
            }),
            Some(Err(message)) => Err(Error::cdp(message)),
            None => Ok(CdpResponse {
                id,
                result: Some(serde_json::json!({})),
                error: None,
            }),
        }
    }

    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::cdp("Connection is closed"));
        }

        let (sender, receiver) = tokio::sync::mpsc::channel(100);
        let (unbounded_sender, mut unbounded_receiver) = tokio::sync::mpsc::unbounded_channel();

        self.event_subscribers.lock().unwrap().push(unbounded_sender);

        tokio::spawn(async move {
            while let Some(event) = unbounded_receiver.recv().await {
                if sender.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(receiver)
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

/// Connector handing out a pre-built mock connection
#[derive(Debug)]
pub struct MockConnector {
    connection: Arc<MockCdpConnection>,
    connected_urls: Mutex<Vec<String>>,
}

impl MockConnector {
    /// Create a connector that returns `connection` for every connect call
    pub fn returning(connection: Arc<MockCdpConnection>) -> Self {
        Self {
            connection,
            connected_urls: Mutex::new(Vec::new()),
        }
    }

    /// URLs connect() has been called with, in order
    pub fn connected_urls(&self) -> Vec<String> {
        self.connected_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn CdpConnection>, Error> {
        self.connected_urls.lock().unwrap().push(url.to_string());
        Ok(Arc::clone(&self.connection) as Arc<dyn CdpConnection>)
    }
}

/// Target lister with a scripted sequence of list snapshots
///
/// Each `list_targets` call consumes the next scripted snapshot; once the
/// script runs out, the fallback snapshot is returned indefinitely.
#[derive(Debug, Default)]
pub struct MockTargetLister {
    snapshots: Mutex<VecDeque<Vec<TargetInfo>>>,
    fallback: Mutex<Vec<TargetInfo>>,
    call_count: AtomicUsize,
}

impl MockTargetLister {
    /// Create a lister that always returns an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lister that always returns `targets`
    pub fn with_targets(targets: Vec<TargetInfo>) -> Self {
        let lister = Self::default();
        *lister.fallback.lock().unwrap() = targets;
        lister
    }

    /// Queue a snapshot for the next list call
    pub fn push_snapshot(&self, targets: Vec<TargetInfo>) {
        self.snapshots.lock().unwrap().push_back(targets);
    }

    /// Set the snapshot returned once the queue is exhausted
    pub fn set_fallback(&self, targets: Vec<TargetInfo>) {
        *self.fallback.lock().unwrap() = targets;
    }

    /// Number of list calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TargetLister for MockTargetLister {
    async fn list_targets(&self) -> Result<Vec<TargetInfo>, Error> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let scripted = self.snapshots.lock().unwrap().pop_front();
        match scripted {
            Some(targets) => Ok(targets),
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }
}

/// Build a page target for tests
pub fn page_target(id: &str, url: &str, title: &str) -> TargetInfo {
    TargetInfo {
        id: id.to_string(),
        target_type: "page".to_string(),
        title: title.to_string(),
        url: url.to_string(),
        attached: false,
        browser_context_id: None,
        opener_id: None,
        web_socket_debugger_url: None,
    }
}
