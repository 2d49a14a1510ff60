//! Chrome DevTools Protocol (CDP) layer
//!
//! WebSocket transport, typed Target-domain client, and the HTTP target
//! list endpoint. Everything target resolution needs from the protocol
//! lives behind the traits defined here, so the layers above are testable
//! against the mock transport.
//!
//! Module structure:
//! - `traits`: transport seams (`CdpConnection`, `Connector`)
//! - `types`: JSON-RPC framing and Target-domain payloads
//! - `connection`: WebSocket connection implementation
//! - `client`: typed `Target.*` client
//! - `endpoint`: HTTP `/json` target listing (`TargetLister`)
//! - `mock`: scriptable mock transport for tests

pub mod client;
pub mod connection;
pub mod endpoint;
pub mod mock;
pub mod traits;
pub mod types;

pub use traits::{CdpConnection, CdpError, CdpEvent, CdpResponse, Connector};
pub use types::{TargetCreatedEvent, TargetInfo};

pub use client::{TargetDomain, WebSocketConnector};
pub use connection::CdpWebSocketConnection;
pub use endpoint::{HttpEndpoint, TargetLister};

// Re-export mock for development/testing
pub use mock::{page_target, MockCdpConnection, MockConnector, MockTargetLister};
