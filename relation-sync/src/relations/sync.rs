//! Bidirectional sync: propagate a relation edit to the linked notes.
//!
//! When note A's relation cell changes, every newly linked note gains a
//! back-link to A under the reverse property and every unlinked note loses
//! it. Each target is updated through one atomic frontmatter write. Targets
//! are independent: a failure on one does not stop the others, and there is
//! no rollback across notes.

use super::diff;
use super::wikilink;
use crate::error::{MutateError, SyncError};
use crate::vault::{FrontmatterMutator, NoteHandle, NoteResolver};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    AddBackLink,
    RemoveBackLink,
}

/// A target whose back-link write failed.
#[derive(Debug)]
pub struct TargetFailure {
    pub target: NoteHandle,
    pub direction: SyncDirection,
    pub error: MutateError,
}

/// Outcome of one sync call.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Targets that received the back-link
    pub linked: Vec<NoteHandle>,
    /// Targets the back-link was removed from
    pub unlinked: Vec<NoteHandle>,
    /// Entries that did not parse as links or did not resolve to a note
    pub skipped: Vec<String>,
    pub failed: Vec<TargetFailure>,
}

impl SyncReport {
    /// Targets a mutation was issued against
    pub fn attempted(&self) -> usize {
        self.linked.len() + self.unlinked.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn into_result(self) -> Result<SyncReport, SyncError> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(SyncError::TargetsFailed { report: self })
        }
    }
}

/// Propagates relation edits. Holds no state besides its collaborators.
#[derive(Clone)]
pub struct SyncCoordinator {
    resolver: Arc<dyn NoteResolver>,
    mutator: Arc<dyn FrontmatterMutator>,
}

impl SyncCoordinator {
    pub fn new(resolver: Arc<dyn NoteResolver>, mutator: Arc<dyn FrontmatterMutator>) -> Self {
        Self { resolver, mutator }
    }

    /// Sync `reverse_property` on the notes linked from `source` after its
    /// relation changed from `old_links` to `new_links`.
    ///
    /// Links that do not resolve are skipped. Every resolved target is
    /// attempted; if any write failed the error carries the full report.
    pub fn sync_back_links(
        &self,
        source: &NoteHandle,
        reverse_property: &str,
        old_links: &[String],
        new_links: &[String],
    ) -> Result<SyncReport, SyncError> {
        let diff = diff::diff(old_links, new_links);
        let back_link = wikilink::format(source.path(), None);

        log::debug!(
            "[BIDI] {} -> {}: {} added, {} removed, back-link {}",
            source,
            reverse_property,
            diff.added.len(),
            diff.removed.len(),
            back_link
        );

        let mut report = SyncReport::default();
        for link in &diff.added {
            self.propagate(
                source,
                link,
                reverse_property,
                &back_link,
                SyncDirection::AddBackLink,
                &mut report,
            );
        }
        for link in &diff.removed {
            self.propagate(
                source,
                link,
                reverse_property,
                &back_link,
                SyncDirection::RemoveBackLink,
                &mut report,
            );
        }

        if !diff.is_empty() {
            log::info!(
                "[BIDI] Synced {} from {}: {} linked, {} unlinked, {} skipped, {} failed",
                reverse_property,
                source,
                report.linked.len(),
                report.unlinked.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }

        report.into_result()
    }

    fn propagate(
        &self,
        source: &NoteHandle,
        link: &str,
        reverse_property: &str,
        back_link: &str,
        direction: SyncDirection,
        report: &mut SyncReport,
    ) {
        let Some(parsed) = wikilink::parse(link) else {
            log::debug!("[BIDI] Skipping non-link entry {:?}", link);
            report.skipped.push(link.to_string());
            return;
        };
        let Some(target) = self.resolver.resolve_link(&parsed.target_path, source) else {
            log::debug!("[BIDI] Skipping unresolved link {} from {}", link, source);
            report.skipped.push(link.to_string());
            return;
        };

        let result = match direction {
            SyncDirection::AddBackLink => {
                self.mutator.add_back_link(&target, reverse_property, back_link)
            }
            SyncDirection::RemoveBackLink => {
                self.mutator.remove_back_link(&target, reverse_property, back_link)
            }
        };

        match result {
            Ok(()) => match direction {
                SyncDirection::AddBackLink => report.linked.push(target),
                SyncDirection::RemoveBackLink => report.unlinked.push(target),
            },
            Err(error) => {
                log::warn!(
                    "[BIDI] Failed to update {} on {}: {}",
                    reverse_property,
                    target,
                    error
                );
                report.failed.push(TargetFailure {
                    target,
                    direction,
                    error,
                });
            }
        }
    }
}
