//! Target resolution and browsing-context lifecycle
//!
//! The five cooperating components, leaves first:
//! - `matcher`: pure predicates resolving URL/regex/name identifiers
//! - `registry`: name -> target-id mapping, persistent across matches
//! - `session`: explicit state of the established protocol session
//! - `context`: create/activate/dispose isolated browsing contexts
//! - `discovery`: live target list queries and bounded-retry polling
//! - `bootstrap`: once-per-session setup and event forwarding

pub mod bootstrap;
pub mod context;
pub mod discovery;
pub mod matcher;
pub mod registry;
pub mod session;

pub use bootstrap::SessionBootstrap;
pub use context::{
    browser_context_id_for_target, close_browser_context, create_browser_context, create_target,
    switch_browser_context,
};
pub use discovery::{get_cri_targets, wait_for_target_to_be_created, TargetPartition};
pub use matcher::{
    is_matching_regex, is_matching_target, is_matching_url, matches, NoRedirects, RedirectMap,
    RedirectResolver, TargetIdentifier,
};
pub use registry::TargetRegistry;
pub use session::Session;
