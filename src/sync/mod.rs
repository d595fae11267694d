//! Reconciliation engine for `lf-cli`.
//!
//! This module computes and applies the difference between the local test
//! tree (desired state) and the remote inventory (observed state):
//! - [`reconcile`] - classify tests into create/update/delete
//! - [`payload`] - two-tier API payload construction
//! - [`hosts`] - per-run host resolution cache
//! - [`engine`] - plan execution with opt-in gates and fallback

pub mod engine;
pub mod hosts;
pub mod payload;

use crate::model::{LocalTest, RemoteTest};
use std::collections::HashMap;
use tracing::debug;

/// The classified set of operations needed to make the remote inventory
/// match the local tree.
///
/// Invariant: every local test appears exactly once across `updates` and
/// `creates`; `deletes` holds only remote entities whose names have no
/// local counterpart.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Local tests paired with their matched remote entity.
    pub updates: Vec<(LocalTest, RemoteTest)>,
    /// Local tests with no remote counterpart.
    pub creates: Vec<LocalTest>,
    /// Remote entities with no local counterpart.
    pub deletes: Vec<RemoteTest>,
}

impl ReconcilePlan {
    /// Whether applying this plan would change nothing structurally.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.deletes.is_empty()
    }
}

/// Keep only load-kind entities, returning the skipped count.
#[must_use]
pub fn filter_load(remote: Vec<RemoteTest>) -> (Vec<RemoteTest>, usize) {
    let total = remote.len();
    let load: Vec<_> = remote.into_iter().filter(RemoteTest::is_load).collect();
    let skipped = total - load.len();
    (load, skipped)
}

/// Match local and remote tests by exact name and classify each side.
///
/// Matching is case-sensitive string equality on the folder slug; the
/// folder name is the single source of truth for identity, so a renamed
/// folder shows up as a delete-and-create pair. Remote name collisions
/// resolve last-wins; unnamed remote entities cannot be matched and are
/// excluded from the plan entirely.
#[must_use]
pub fn reconcile(local: Vec<LocalTest>, remote: Vec<RemoteTest>) -> ReconcilePlan {
    let mut by_name: HashMap<String, RemoteTest> = HashMap::new();
    let mut unnamed = 0usize;
    for test in remote {
        match test.match_name() {
            Some(name) => {
                by_name.insert(name.to_string(), test);
            }
            None => unnamed += 1,
        }
    }
    if unnamed > 0 {
        debug!(unnamed, "ignoring unnamed remote tests");
    }

    let mut plan = ReconcilePlan::default();
    for test in local {
        match by_name.remove(&test.name) {
            Some(remote) => plan.updates.push((test, remote)),
            None => plan.creates.push(test),
        }
    }

    // Whatever is left in the map has no local counterpart.
    plan.deletes = by_name.into_values().collect();
    plan.deletes
        .sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    plan
}

#[cfg(test)]
pub(crate) mod testing;
