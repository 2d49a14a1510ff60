//! Session state
//!
//! The state every subsequent protocol call depends on: the Target-domain
//! handles for the current protocol session and the active target/context
//! ids. Owned by the caller and threaded explicitly through the context
//! manager and discovery operations; a newer session's bootstrap replaces
//! the whole object (last-session-wins), there is no other teardown.

use crate::cdp::client::TargetDomain;

/// State of one established protocol session
#[derive(Debug, Clone)]
pub struct Session {
    /// Target domain over the page-level session connection
    page: TargetDomain,
    /// Target domain over the browser-level debug URL connection, used for
    /// context management
    browser: TargetDomain,
    /// The one active target id
    active_target_id: String,
    /// The one active browser context id; `None` means the default context
    active_browser_context_id: Option<String>,
}

impl Session {
    /// Assemble session state from its handles
    pub fn new(
        page: TargetDomain,
        browser: TargetDomain,
        active_target_id: String,
        active_browser_context_id: Option<String>,
    ) -> Self {
        Self {
            page,
            browser,
            active_target_id,
            active_browser_context_id,
        }
    }

    /// Target domain of the page-level session
    pub fn page(&self) -> &TargetDomain {
        &self.page
    }

    /// Target domain of the browser-level debug connection
    pub fn browser(&self) -> &TargetDomain {
        &self.browser
    }

    /// The active target id
    pub fn active_target_id(&self) -> &str {
        &self.active_target_id
    }

    /// Adopt a new active target
    pub fn set_active_target_id<S: Into<String>>(&mut self, target_id: S) {
        self.active_target_id = target_id.into();
    }

    /// The active browser context id, if not the default context
    pub fn active_browser_context_id(&self) -> Option<&str> {
        self.active_browser_context_id.as_deref()
    }

    /// Adopt a new active browser context
    pub fn set_active_browser_context_id(&mut self, context_id: Option<String>) {
        self.active_browser_context_id = context_id;
    }
}
