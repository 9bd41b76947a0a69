//! Many-to-many relationship synchronization.
//!
//! Reconciles the related ids an entity should have against the ids currently stored, issuing only
//! the link/unlink calls needed to get from one to the other. The calls are not wrapped in a
//! transaction: if one fails, the ones before it stay applied and the error is returned.

use async_trait::async_trait;
use serde::Serialize;

/// Join-table operations the synchronizer needs.
#[async_trait]
pub trait RelationLinks: Send + Sync {
    /// Whether `related_id` names a real related entity.
    async fn related_exists(&self, related_id: i64) -> anyhow::Result<bool>;

    /// Creates the `(entity_id, related_id)` pair. Must be a no-op returning `false` when the pair
    /// already exists.
    async fn link(&self, entity_id: i64, related_id: i64) -> anyhow::Result<bool>;

    /// Removes the pair; returns whether a row was removed.
    async fn unlink(&self, entity_id: i64, related_id: i64) -> anyhow::Result<bool>;
}

/// What to do with desired related ids that do not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingLinkPolicy {
    /// Check every desired id before writing anything and reject the request if one is missing.
    #[default]
    Reject,
    /// Leave missing ids out of the sync without reporting an error.
    Skip,
}

impl std::str::FromStr for MissingLinkPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(MissingLinkPolicy::Reject),
            "skip" => Ok(MissingLinkPolicy::Skip),
            other => Err(anyhow::anyhow!(
                "unknown missing-link policy '{}' (expected 'reject' or 'skip')",
                other
            )),
        }
    }
}

/// The diff between desired and current related ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_link: Vec<i64>,
    pub to_unlink: Vec<i64>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_link.is_empty() && self.to_unlink.is_empty()
    }
}

/// What a [`sync`] call actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub linked: Vec<i64>,
    pub unlinked: Vec<i64>,
    /// Desired ids that did not resolve to a related entity.
    pub skipped: Vec<i64>,
}

/// Computes which ids to unlink (current but not desired) and link (desired but not current).
///
/// Inputs are treated as sets; the output keeps first-seen order.
pub fn plan(desired: &[i64], current: &[i64]) -> SyncPlan {
    let mut out = SyncPlan::default();
    for id in current {
        if !desired.contains(id) && !out.to_unlink.contains(id) {
            out.to_unlink.push(*id);
        }
    }
    for id in desired {
        if !current.contains(id) && !out.to_link.contains(id) {
            out.to_link.push(*id);
        }
    }
    out
}

/// Brings `entity_id`'s relations from `current` to `desired`.
///
/// Unlinks run first. Ids to link are checked with [`RelationLinks::related_exists`] and
/// skipped when missing.
pub async fn sync<L>(
    links: &L,
    entity_id: i64,
    desired: &[i64],
    current: &[i64],
) -> anyhow::Result<SyncOutcome>
where
    L: RelationLinks + ?Sized,
{
    let plan = plan(desired, current);
    let mut outcome = SyncOutcome::default();

    for related_id in plan.to_unlink {
        if links.unlink(entity_id, related_id).await? {
            outcome.unlinked.push(related_id);
        }
    }

    for related_id in plan.to_link {
        if !links.related_exists(related_id).await? {
            tracing::debug!(entity_id, related_id, "skipping link to missing related id");
            outcome.skipped.push(related_id);
            continue;
        }
        if links.link(entity_id, related_id).await? {
            outcome.linked.push(related_id);
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Link(i64, i64),
        Unlink(i64, i64),
    }

    /// Join table double that records every mutating call.
    struct RecordingLinks {
        existing: BTreeSet<i64>,
        rows: Mutex<BTreeSet<(i64, i64)>>,
        calls: Mutex<Vec<Call>>,
        fail_on_link: Option<i64>,
    }

    impl RecordingLinks {
        fn new(existing: &[i64], rows: &[(i64, i64)]) -> Self {
            Self {
                existing: existing.iter().copied().collect(),
                rows: Mutex::new(rows.iter().copied().collect()),
                calls: Mutex::new(Vec::new()),
                fail_on_link: None,
            }
        }

        fn current(&self, entity_id: i64) -> Vec<i64> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(e, _)| *e == entity_id)
                .map(|(_, r)| *r)
                .collect()
        }

        fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl RelationLinks for RecordingLinks {
        async fn related_exists(&self, related_id: i64) -> anyhow::Result<bool> {
            Ok(self.existing.contains(&related_id))
        }

        async fn link(&self, entity_id: i64, related_id: i64) -> anyhow::Result<bool> {
            if self.fail_on_link == Some(related_id) {
                anyhow::bail!("connection reset");
            }
            self.calls.lock().unwrap().push(Call::Link(entity_id, related_id));
            Ok(self.rows.lock().unwrap().insert((entity_id, related_id)))
        }

        async fn unlink(&self, entity_id: i64, related_id: i64) -> anyhow::Result<bool> {
            self.calls.lock().unwrap().push(Call::Unlink(entity_id, related_id));
            Ok(self.rows.lock().unwrap().remove(&(entity_id, related_id)))
        }
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("skip".parse::<MissingLinkPolicy>().unwrap(), MissingLinkPolicy::Skip);
        assert_eq!(" Reject ".parse::<MissingLinkPolicy>().unwrap(), MissingLinkPolicy::Reject);
        assert!("ignore".parse::<MissingLinkPolicy>().is_err());
    }

    #[test]
    fn plan_is_a_set_difference() {
        let p = plan(&[2, 3, 4, 4], &[1, 2, 3, 1]);
        assert_eq!(p.to_unlink, vec![1]);
        assert_eq!(p.to_link, vec![4]);
        assert!(plan(&[1, 2], &[2, 1]).is_empty());
    }

    #[tokio::test]
    async fn minimal_operations() {
        let links = RecordingLinks::new(&[1, 2, 3, 4], &[(7, 1), (7, 2), (7, 3)]);
        let outcome = sync(&links, 7, &[2, 3, 4], &links.current(7)).await.unwrap();

        assert_eq!(links.take_calls(), vec![Call::Unlink(7, 1), Call::Link(7, 4)]);
        assert_eq!(outcome.linked, vec![4]);
        assert_eq!(outcome.unlinked, vec![1]);
        assert!(outcome.skipped.is_empty());
        assert_eq!(links.current(7), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn missing_related_ids_are_skipped() {
        let links = RecordingLinks::new(&[1, 2, 3], &[(7, 1), (7, 2), (7, 3)]);
        let outcome = sync(&links, 7, &[2, 3, 4], &links.current(7)).await.unwrap();

        assert_eq!(links.take_calls(), vec![Call::Unlink(7, 1)]);
        assert_eq!(outcome.skipped, vec![4]);
    }

    #[tokio::test]
    async fn second_identical_sync_is_a_no_op() {
        let links = RecordingLinks::new(&[1, 2, 3, 4], &[(7, 1), (7, 2), (7, 3)]);
        let desired = [2, 3, 4, 9];
        sync(&links, 7, &desired, &links.current(7)).await.unwrap();
        links.take_calls();

        let again = sync(&links, 7, &desired, &links.current(7)).await.unwrap();
        assert!(links.take_calls().is_empty());
        assert!(again.linked.is_empty() && again.unlinked.is_empty());
        assert_eq!(again.skipped, vec![9]);
    }

    #[tokio::test]
    async fn guarded_link_reports_existing_pairs() {
        let links = RecordingLinks::new(&[1], &[(7, 1)]);
        // Stale view of the current set: the pair already exists.
        let outcome = sync(&links, 7, &[1], &[]).await.unwrap();
        assert!(outcome.linked.is_empty());
        assert_eq!(links.current(7), vec![1]);
    }

    #[tokio::test]
    async fn failure_mid_sequence_keeps_earlier_calls() {
        let mut links = RecordingLinks::new(&[1, 2, 3, 4, 5], &[(7, 1)]);
        links.fail_on_link = Some(5);
        let err = sync(&links, 7, &[4, 5], &links.current(7)).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(links.current(7), vec![4]);
    }
}
