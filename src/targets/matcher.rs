//! Target identifier matching
//!
//! Pure predicates deciding whether a candidate target satisfies a URL
//! literal, a regular expression, or a registered name. Malformed URLs
//! never error: absent host/pathname degrade to empty strings, and absence
//! of a match is the uniform failure signal.

use super::registry::TargetRegistry;
use crate::cdp::types::TargetInfo;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// Caller-supplied reference to a target
#[derive(Debug, Clone)]
pub enum TargetIdentifier {
    /// URL-or-title literal, HTTP-scheme normalized before matching
    Url(String),
    /// Regular expression matched against title/path/href
    Pattern(Regex),
    /// Name previously stored in the target registry
    Name(String),
}

impl TargetIdentifier {
    /// Identifier from a URL literal
    pub fn url<S: Into<String>>(url: S) -> Self {
        TargetIdentifier::Url(url.into())
    }

    /// Identifier from a registered name
    pub fn name<S: Into<String>>(name: S) -> Self {
        TargetIdentifier::Name(name.into())
    }
}

/// Resolves a visible URL to its redirect destination.
///
/// The URL a target reports may be an intermediate redirect hop; matching
/// runs the target URL through this collaborator first.
pub trait RedirectResolver: Send + Sync {
    /// Resolve `url` to the address it ultimately redirects to
    fn resolve(&self, url: &str) -> String;
}

/// Resolver that treats every URL as final
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRedirects;

impl RedirectResolver for NoRedirects {
    fn resolve(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Resolver backed by recorded redirect responses
#[derive(Debug, Default)]
pub struct RedirectMap {
    redirects: HashMap<String, String>,
}

impl RedirectMap {
    /// Create an empty redirect map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` redirects to `to`
    pub fn record<S: Into<String>, T: Into<String>>(&mut self, from: S, to: T) {
        self.redirects.insert(from.into(), to.into());
    }

    /// Forget all recorded redirects
    pub fn clear(&mut self) {
        self.redirects.clear();
    }
}

impl RedirectResolver for RedirectMap {
    fn resolve(&self, url: &str) -> String {
        let mut current = url;
        // Hop cap guards against recorded redirect cycles
        for _ in 0..10 {
            match self.redirects.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.to_string()
    }
}

/// URL decomposed for comparison; fields are empty when unparseable
#[derive(Debug, Default)]
struct ParsedUrl {
    protocol: String,
    host: String,
    path: String,
    href: String,
}

/// Parse a URL without ever failing
fn parse_loose(url: &str) -> ParsedUrl {
    match Url::parse(url) {
        Ok(parsed) => ParsedUrl {
            protocol: parsed.scheme().to_string(),
            host: parsed.host_str().unwrap_or("").to_string(),
            path: parsed.path().to_string(),
            href: parsed.as_str().to_string(),
        },
        Err(_) => ParsedUrl::default(),
    }
}

/// Prepend `http://` when the identifier has no parseable host
fn normalize_identifier(identifier: &str) -> String {
    let has_host = Url::parse(identifier)
        .map(|u| u.host_str().is_some())
        .unwrap_or(false);

    if has_host {
        identifier.to_string()
    } else {
        format!("http://{}", identifier)
    }
}

/// Join host and pathname, collapsing duplicate and trailing separators.
///
/// Both sides of every comparison go through this joiner; otherwise two
/// semantically identical URLs spuriously fail to match on slash placement.
fn join_host_path(host: &str, path: &str) -> String {
    let joined = format!("{}/{}", host, path.trim_start_matches('/'));

    let mut collapsed = String::with_capacity(joined.len());
    let mut last_was_slash = false;
    for ch in joined.chars() {
        if ch == '/' {
            if !last_was_slash {
                collapsed.push(ch);
            }
            last_was_slash = true;
        } else {
            collapsed.push(ch);
            last_was_slash = false;
        }
    }

    collapsed.trim_end_matches('/').to_string()
}

/// Escape the HTML special characters of a document title
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Whether `target` matches a URL-or-title literal identifier
pub fn is_matching_url(
    target: &TargetInfo,
    identifier: &str,
    redirects: &dyn RedirectResolver,
) -> bool {
    // The visible URL may be an intermediate redirect hop
    let resolved = redirects.resolve(&target.url);
    let target_url = parse_loose(&resolved);

    let normalized = normalize_identifier(identifier);
    let identifier_url = parse_loose(&normalized);

    if escape_html(&target.title) == identifier {
        return true;
    }

    let target_joined = join_host_path(&target_url.host, &target_url.path);
    let identifier_joined = if identifier_url.href.is_empty() {
        // No parseable path on the identifier side: compare against the
        // raw identifier itself
        identifier.to_string()
    } else {
        join_host_path(&identifier_url.host, &identifier_url.path)
    };

    if !target_joined.is_empty() && target_joined == identifier_joined {
        return true;
    }

    target_url.href == identifier
}

/// Whether `target` matches a regular-expression identifier
pub fn is_matching_regex(
    target: &TargetInfo,
    pattern: &Regex,
    redirects: &dyn RedirectResolver,
) -> bool {
    let resolved = redirects.resolve(&target.url);
    let target_url = parse_loose(&resolved);

    let joined = join_host_path(&target_url.host, &target_url.path);
    let protocol_host = format!(
        "{}//{}",
        if target_url.protocol.is_empty() {
            String::new()
        } else {
            format!("{}:", target_url.protocol)
        },
        target_url.host.trim_start_matches('/')
    );

    pattern.is_match(&target.title)
        || pattern.is_match(&joined)
        || pattern.is_match(&target_url.href)
        || pattern.is_match(&protocol_host)
}

/// Whether `target` is the one registered under `name`.
///
/// Stale or absent registrations are a miss, never an error.
pub fn is_matching_target(target: &TargetInfo, name: &str, registry: &TargetRegistry) -> bool {
    registry.get_mapping(name) == Some(target.id.as_str())
}

/// Whether `target` satisfies `identifier`.
///
/// Predicates are evaluated URL, then regex, then name, short-circuiting on
/// the first hit; identifier kinds are mutually exclusive per call, so the
/// order is only the documented tie-break.
pub fn matches(
    target: &TargetInfo,
    identifier: &TargetIdentifier,
    registry: &TargetRegistry,
    redirects: &dyn RedirectResolver,
) -> bool {
    match identifier {
        TargetIdentifier::Url(url) => is_matching_url(target, url, redirects),
        TargetIdentifier::Pattern(pattern) => is_matching_regex(target, pattern, redirects),
        TargetIdentifier::Name(name) => is_matching_target(target, name, registry),
    }
}
