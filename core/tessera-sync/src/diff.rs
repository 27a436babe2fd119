//! Relation diff - which links to add and which to remove.

use std::collections::HashSet;
use tessera_types::{ContentTypeId, ItemRef};

/// Result of comparing a relation field's baseline with its saved value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationDiff {
    /// Every reference currently held, not only the new ones. Re-linking an
    /// already-linked target is a no-op in the applier, and re-asserting the
    /// whole set retries links that failed on an earlier save.
    pub added: Vec<ItemRef>,
    /// References in the baseline that are gone now, in baseline order.
    pub removed: Vec<ItemRef>,
}

impl RelationDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Distinct content types touched, removals first, in first-seen order.
    pub fn target_types(&self) -> Vec<ContentTypeId> {
        let mut seen = HashSet::new();
        self.removed
            .iter()
            .chain(&self.added)
            .map(ItemRef::content_type)
            .filter(|ct| seen.insert(*ct))
            .cloned()
            .collect()
    }
}

/// Computes `removed = previous - current` and `added = current`.
/// Both sides are treated as sets; duplicates are dropped.
pub fn diff(previous: &[ItemRef], current: &[ItemRef]) -> RelationDiff {
    let current_set: HashSet<&ItemRef> = current.iter().collect();

    let mut seen = HashSet::new();
    let removed = previous
        .iter()
        .filter(|r| !current_set.contains(r) && seen.insert(*r))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let added = current.iter().filter(|r| seen.insert(*r)).cloned().collect();

    RelationDiff { added, removed }
}
