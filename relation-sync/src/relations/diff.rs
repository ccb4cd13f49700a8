//! Link diff between the old and new contents of a relation cell.

use super::wikilink::normalized_target;
use std::collections::HashSet;

/// Links added and removed by an edit, in input order.
///
/// Entries are the raw cell strings. Duplicates in an input list are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncDiff {
    /// Entries of the new list whose target is absent from the old list
    pub added: Vec<String>,
    /// Entries of the old list whose target is absent from the new list
    pub removed: Vec<String>,
}

impl SyncDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn diff<S: AsRef<str>>(old_links: &[S], new_links: &[S]) -> SyncDiff {
    let old_targets: HashSet<String> = old_links
        .iter()
        .map(|link| normalized_target(link.as_ref()))
        .collect();
    let new_targets: HashSet<String> = new_links
        .iter()
        .map(|link| normalized_target(link.as_ref()))
        .collect();

    let added = new_links
        .iter()
        .filter(|link| !old_targets.contains(&normalized_target(link.as_ref())))
        .map(|link| link.as_ref().to_string())
        .collect();
    let removed = old_links
        .iter()
        .filter(|link| !new_targets.contains(&normalized_target(link.as_ref())))
        .map(|link| link.as_ref().to_string())
        .collect();

    SyncDiff { added, removed }
}
