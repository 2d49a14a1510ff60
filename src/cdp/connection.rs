//! CDP WebSocket connection implementation
//!
//! WebSocket transport to a Chrome DevTools Protocol endpoint: correlates
//! command responses by request id and fans events out to subscribers.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpEvent, CdpResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Default timeout for a single CDP command
const COMMAND_TIMEOUT_SECS: u64 = 30;

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: tokio::sync::oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// Write half of the WebSocket stream
    sink: Arc<Mutex<WsSink>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: Arc<Mutex<HashMap<u64, PendingCommand>>>,
    /// Event subscribers
    event_subscribers: Arc<Mutex<Vec<tokio::sync::mpsc::UnboundedSender<CdpEvent>>>>,
    /// Is connection active
    is_active: Arc<AtomicBool>,
}

impl CdpWebSocketConnection {
    /// Connect to a CDP WebSocket endpoint and start the read loop
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn new<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to CDP WebSocket: {}", url);

        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect: {}", e)))?;

        let (sink, source) = ws_stream.split();

        let connection = Arc::new(Self {
            url,
            sink: Arc::new(Mutex::new(sink)),
            next_id: AtomicU64::new(1),
            pending_commands: Arc::new(Mutex::new(HashMap::new())),
            event_subscribers: Arc::new(Mutex::new(Vec::new())),
            is_active: Arc::new(AtomicBool::new(true)),
        });

        info!("WebSocket connection established: {}", connection.url);

        let sink = Arc::clone(&connection.sink);
        let pending_commands = Arc::clone(&connection.pending_commands);
        let event_subscribers = Arc::clone(&connection.event_subscribers);
        let is_active = Arc::clone(&connection.is_active);

        tokio::spawn(async move {
            if let Err(e) =
                Self::read_loop(source, sink, pending_commands, event_subscribers, &is_active).await
            {
                error!("CDP read loop error: {}", e);
            }
            is_active.store(false, Ordering::SeqCst);
            debug!("CDP read loop exited");
        });

        Ok(connection)
    }

    /// Message processing loop; owns the read half of the stream
    async fn read_loop(
        mut source: WsSource,
        sink: Arc<Mutex<WsSink>>,
        pending_commands: Arc<Mutex<HashMap<u64, PendingCommand>>>,
        event_subscribers: Arc<Mutex<Vec<tokio::sync::mpsc::UnboundedSender<CdpEvent>>>>,
        is_active: &AtomicBool,
    ) -> Result<(), Error> {
        while is_active.load(Ordering::SeqCst) {
            let message = match source.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    let msg = e.to_string();
                    // Graceful shutdown when the remote end went away
                    if msg.contains("ConnectionClosed")
                        || msg.contains("AlreadyClosed")
                        || msg.contains("connection closed")
                    {
                        warn!("WebSocket connection closed, deactivating");
                        break;
                    }
                    return Err(Error::websocket(format!("WebSocket error: {}", msg)));
                }
                None => {
                    warn!("WebSocket stream closed");
                    break;
                }
            };

            match message {
                Message::Text(text) => {
                    if let Err(e) =
                        Self::handle_message(&text, &pending_commands, &event_subscribers).await
                    {
                        error!("Error handling message: {}", e);
                    }
                }
                Message::Close(_) => {
                    info!("WebSocket close frame received");
                    break;
                }
                Message::Ping(data) => {
                    let mut sink = sink.lock().await;
                    if let Err(e) = sink.send(Message::Pong(data)).await {
                        error!("Failed to send pong: {}", e);
                    }
                }
                _ => {
                    // Ignore other message types
                }
            }
        }

        Ok(())
    }

    /// Dispatch an incoming frame to the pending-command map or to subscribers
    async fn handle_message(
        text: &str,
        pending_commands: &Mutex<HashMap<u64, PendingCommand>>,
        event_subscribers: &Mutex<Vec<tokio::sync::mpsc::UnboundedSender<CdpEvent>>>,
    ) -> Result<(), Error> {
        debug!("Received message: {}", text);

        // Try to parse as response first
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            return Self::handle_response(response, pending_commands).await;
        }

        // Try to parse as notification/event
        if let Ok(notification) = serde_json::from_str::<CdpNotification>(text) {
            return Self::handle_notification(notification, event_subscribers).await;
        }

        warn!("Unknown message format: {}", text);
        Ok(())
    }

    /// Hand a CDP response to the waiter registered under its id
    async fn handle_response(
        response: CdpRpcResponse,
        pending_commands: &Mutex<HashMap<u64, PendingCommand>>,
    ) -> Result<(), Error> {
        let mut pending = pending_commands.lock().await;

        if let Some(pending_cmd) = pending.remove(&response.id) {
            debug!(
                "Received response for command {}: {}",
                response.id, pending_cmd.method
            );

            let cdp_response = CdpResponse {
                id: response.id,
                result: Some(response.result),
                error: response.error.map(|e| CdpErrorResponse {
                    code: e.code,
                    message: e.message,
                    data: e.data,
                }),
            };

            let _ = pending_cmd.sender.send(cdp_response);
        } else {
            warn!("Received response for unknown command ID: {}", response.id);
        }

        Ok(())
    }

    /// Broadcast an event to all subscribers, pruning dead ones
    async fn handle_notification(
        notification: CdpNotification,
        event_subscribers: &Mutex<Vec<tokio::sync::mpsc::UnboundedSender<CdpEvent>>>,
    ) -> Result<(), Error> {
        debug!("Received event: {}", notification.method);

        let event = CdpEvent {
            method: notification.method,
            params: notification.params,
            session_id: notification.session_id,
        };

        let mut subscribers = event_subscribers.lock().await;
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());

        Ok(())
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for the response
    async fn send_command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
            session_id: None,
        };

        let json = serde_json::to_string(&request)
            .map_err(|e| Error::cdp(format!("Failed to serialize request: {}", e)))?;

        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = tokio::sync::oneshot::channel();

        {
            let mut pending = self.pending_commands.lock().await;
            pending.insert(
                id,
                PendingCommand {
                    sender,
                    method: method.to_string(),
                },
            );
        }

        let send_result = {
            let mut sink = self.sink.lock().await;
            sink.send(Message::Text(json)).await
        };
        if let Err(e) = send_result {
            // The waiter was registered above; drop it so a dead command
            // never lingers in the pending map
            let mut pending = self.pending_commands.lock().await;
            pending.remove(&id);
            return Err(Error::websocket(format!("Failed to send message: {}", e)));
        }

        let timeout = tokio::time::Duration::from_secs(COMMAND_TIMEOUT_SECS);
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(response)) => {
                // Surface CDP-level errors with the remote message verbatim;
                // the stale-context fallback depends on seeing it unmodified
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{} (code: {})",
                        error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::timeout(format!(
                "Command {} response channel closed",
                id
            ))),
            Err(_) => {
                let mut pending = self.pending_commands.lock().await;
                pending.remove(&id);
                Err(Error::timeout(format!("Command {} ({}) timed out", id, method)))
            }
        }
    }

    /// Subscribe to CDP events
    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, Error> {
        let (sender, receiver) = tokio::sync::mpsc::channel(100);
        let (unbounded_sender, mut unbounded_receiver) = tokio::sync::mpsc::unbounded_channel();

        let mut subscribers = self.event_subscribers.lock().await;
        subscribers.push(unbounded_sender);
        drop(subscribers);

        // Forward events to the bounded channel handed to the caller
        tokio::spawn(async move {
            while let Some(event) = unbounded_receiver.recv().await {
                if sender.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(receiver)
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        info!("Closing CDP WebSocket connection: {}", self.url);

        self.is_active.store(false, Ordering::SeqCst);

        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(None))
            .await
            .map_err(|e| Error::websocket(format!("Failed to close WebSocket: {}", e)))?;

        Ok(())
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
