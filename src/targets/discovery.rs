//! Target discovery
//!
//! Queries the live target list and partitions it against a caller-supplied
//! identifier, plus the bounded-retry poll that absorbs the window right
//! after a context/target is created and not yet visible on the list.

use super::matcher::{self, RedirectResolver, TargetIdentifier};
use super::registry::TargetRegistry;
use super::session::Session;
use crate::cdp::endpoint::TargetLister;
use crate::cdp::types::TargetInfo;
use crate::{Error, Result};
use tracing::{debug, warn};

/// Fixed delay between list polls while waiting for a fresh target
const RETRY_DELAY_MS: u64 = 100;

/// Page targets split into those satisfying an identifier and the rest
#[derive(Debug, Default)]
pub struct TargetPartition {
    /// Targets satisfying the identifier (or the active target when no
    /// identifier was given)
    pub matching: Vec<TargetInfo>,
    /// Every other page target
    pub others: Vec<TargetInfo>,
}

/// Wait for a page target to become visible on the target list.
///
/// Right after a context/target is created the list may not reflect it yet,
/// so the list is polled up to `max_attempts` times with a fixed 100 ms
/// delay between attempts. Returns the first page target seen; once
/// attempts are exhausted the not-yet-available failure is returned to the
/// caller.
pub async fn wait_for_target_to_be_created(
    lister: &dyn TargetLister,
    max_attempts: u32,
) -> Result<TargetInfo> {
    let mut attempts_left = max_attempts;

    loop {
        match first_page_target(lister).await {
            Ok(target) => return Ok(target),
            Err(err) if err.is_no_page_target() && attempts_left > 1 => {
                warn!("{}, retrying ({} attempts left)", err, attempts_left - 1);
                attempts_left -= 1;
                tokio::time::sleep(tokio::time::Duration::from_millis(RETRY_DELAY_MS)).await;
            }
            Err(err) => {
                warn!("{}", err);
                return Err(err);
            }
        }
    }
}

/// One list query; fails with the not-yet-available condition when the list
/// is empty or holds no page target
async fn first_page_target(lister: &dyn TargetLister) -> Result<TargetInfo> {
    let targets = lister.list_targets().await?;

    targets
        .into_iter()
        .find(TargetInfo::is_page)
        .ok_or_else(|| Error::no_page_target("target list has no page target"))
}

/// Partition the live page targets into matching and others.
///
/// With no identifier this is a pure identity check against the active
/// target id; the matcher is never consulted. With an identifier, every
/// page target runs through the matcher. Original list ordering is
/// preserved within each partition.
pub async fn get_cri_targets(
    lister: &dyn TargetLister,
    session: &Session,
    registry: &TargetRegistry,
    redirects: &dyn RedirectResolver,
    identifier: Option<&TargetIdentifier>,
) -> Result<TargetPartition> {
    let targets = lister.list_targets().await?;
    debug!("Partitioning {} targets", targets.len());

    let mut partition = TargetPartition::default();

    for target in targets.into_iter().filter(TargetInfo::is_page) {
        let is_match = match identifier {
            None => target.id == session.active_target_id(),
            Some(identifier) => matcher::matches(&target, identifier, registry, redirects),
        };

        if is_match {
            partition.matching.push(target);
        } else {
            partition.others.push(target);
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::client::TargetDomain;
    use crate::cdp::mock::{page_target, MockCdpConnection, MockTargetLister};
    use crate::targets::matcher::NoRedirects;

    fn session_with_active(target_id: &str) -> Session {
        Session::new(
            TargetDomain::new(MockCdpConnection::new()),
            TargetDomain::new(MockCdpConnection::new()),
            target_id.to_string(),
            None,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_exhausts_attempts_against_empty_list() {
        let lister = MockTargetLister::new();

        let err = wait_for_target_to_be_created(&lister, 3).await.unwrap_err();

        assert!(err.is_no_page_target());
        // 3 total attempts: the initial query plus exactly two retries
        assert_eq!(lister.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_target_on_second_attempt() {
        let lister = MockTargetLister::new();
        lister.push_snapshot(vec![]);
        lister.set_fallback(vec![page_target("T1", "about:blank", "")]);

        let target = wait_for_target_to_be_created(&lister, 3).await.unwrap();

        assert_eq!(target.id, "T1");
        assert_eq!(lister.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_retry_spacing_is_100ms() {
        let lister = MockTargetLister::new();

        let start = tokio::time::Instant::now();
        let _ = wait_for_target_to_be_created(&lister, 3).await;

        // Two retries at 100ms spacing (the paused clock auto-advances)
        assert_eq!(start.elapsed(), tokio::time::Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_wait_ignores_non_page_targets() {
        let mut worker = page_target("W1", "about:blank", "");
        worker.target_type = "service_worker".to_string();
        let lister = MockTargetLister::with_targets(vec![worker]);

        let err = wait_for_target_to_be_created(&lister, 1).await.unwrap_err();
        assert!(err.is_no_page_target());
    }

    #[tokio::test]
    async fn test_partition_without_identifier_uses_active_target() {
        let lister = MockTargetLister::with_targets(vec![
            page_target("T1", "http://a.test/", "A"),
            page_target("T2", "http://b.test/", "B"),
            page_target("T3", "http://c.test/", "C"),
        ]);
        let session = session_with_active("T2");
        let registry = TargetRegistry::new();

        let partition = get_cri_targets(&lister, &session, &registry, &NoRedirects, None)
            .await
            .unwrap();

        assert_eq!(partition.matching.len(), 1);
        assert_eq!(partition.matching[0].id, "T2");
        // Ordering preserved within the partition
        assert_eq!(partition.others.len(), 2);
        assert_eq!(partition.others[0].id, "T1");
        assert_eq!(partition.others[1].id, "T3");
    }

    #[tokio::test]
    async fn test_partition_with_url_identifier() {
        let lister = MockTargetLister::with_targets(vec![
            page_target("T1", "http://example.com/", "Example Domain"),
            page_target("T2", "http://other.test/", "Other"),
        ]);
        let session = session_with_active("T2");
        let registry = TargetRegistry::new();
        let identifier = TargetIdentifier::url("example.com");

        let partition = get_cri_targets(
            &lister,
            &session,
            &registry,
            &NoRedirects,
            Some(&identifier),
        )
        .await
        .unwrap();

        assert_eq!(partition.matching.len(), 1);
        assert_eq!(partition.matching[0].id, "T1");
        assert_eq!(partition.others.len(), 1);
        assert_eq!(partition.others[0].id, "T2");
    }

    #[tokio::test]
    async fn test_partition_excludes_non_page_targets_entirely() {
        let mut worker = page_target("W1", "http://example.com/", "");
        worker.target_type = "service_worker".to_string();
        let lister = MockTargetLister::with_targets(vec![
            worker,
            page_target("T1", "http://example.com/", "Example"),
        ]);
        let session = session_with_active("T1");
        let registry = TargetRegistry::new();

        let partition = get_cri_targets(&lister, &session, &registry, &NoRedirects, None)
            .await
            .unwrap();

        assert_eq!(partition.matching.len(), 1);
        assert!(partition.others.is_empty());
    }
}
