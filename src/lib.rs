//! cri-targets: CDP target resolution and browsing-context lifecycle
//!
//! Resolves abstract target identifiers (a URL literal, a regular
//! expression, or a registered name) to live debuggee targets exposed by
//! the Chrome DevTools Protocol, and manages the lifecycle of those targets
//! and their isolated browsing contexts.

pub mod bus;
pub mod config;
pub mod error;

pub mod cdp;
pub mod targets;

// Re-exports
pub use bus::{BusEvent, EventBus, SessionBarrier};
pub use config::Config;
pub use error::{Error, Result};
pub use targets::{Session, SessionBootstrap, TargetIdentifier, TargetPartition, TargetRegistry};

/// cri-targets library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
