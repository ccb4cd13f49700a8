//! Edit handlers for table cells.

use super::columns::property_name;
use super::normalize::CanonicalValue;
use super::sync::{SyncCoordinator, SyncReport};
use super::view_config::find_bidi_rule;
use crate::error::{MutateError, SyncError};
use crate::vault::{FrontmatterMutator, NoteHandle, NoteResolver};
use relation_sync_types::BidiRule;
use serde_json::Value;
use std::sync::Arc;

/// Persists cell edits and runs bidi sync for relation columns with a rule.
pub struct RelationEditService {
    mutator: Arc<dyn FrontmatterMutator>,
    coordinator: SyncCoordinator,
    bidi_rules: Vec<BidiRule>,
}

impl RelationEditService {
    pub fn new(
        resolver: Arc<dyn NoteResolver>,
        mutator: Arc<dyn FrontmatterMutator>,
        bidi_rules: Vec<BidiRule>,
    ) -> Self {
        Self {
            coordinator: SyncCoordinator::new(resolver, mutator.clone()),
            mutator,
            bidi_rules,
        }
    }

    pub fn bidi_rules(&self) -> &[BidiRule] {
        &self.bidi_rules
    }

    /// Write `new_links` into the relation column, then sync back-links.
    ///
    /// The previous links are read in the same write as the new list, so a
    /// concurrent edit of the source cannot slip in between. Returns `None`
    /// when no bidi rule watches the column.
    pub fn update_relation(
        &self,
        note: &NoteHandle,
        property_id: &str,
        new_links: &[String],
    ) -> Result<Option<SyncReport>, SyncError> {
        let name = property_name(property_id);
        let mut old_links = Vec::new();

        self.mutator.process_frontmatter(note, &mut |fm| {
            old_links = fm
                .get(name)
                .map(|value| CanonicalValue::from(value).string_items())
                .unwrap_or_default();
            fm.insert(
                name.to_string(),
                Value::Array(new_links.iter().cloned().map(Value::String).collect()),
            );
        })?;

        log::debug!(
            "[RELATIONS] {} {}: {} -> {} link(s)",
            note,
            name,
            old_links.len(),
            new_links.len()
        );

        let Some(rule) = find_bidi_rule(&self.bidi_rules, property_id) else {
            log::debug!("[RELATIONS] No bidi rule for {}, skipping sync", property_id);
            return Ok(None);
        };

        self.coordinator
            .sync_back_links(note, &rule.reverse_property, &old_links, new_links)
            .map(Some)
    }

    /// Write a plain cell value. No sync.
    pub fn update_cell(
        &self,
        note: &NoteHandle,
        property_id: &str,
        value: &CanonicalValue,
    ) -> Result<(), MutateError> {
        let name = property_name(property_id);
        let json = value.to_json();
        self.mutator.process_frontmatter(note, &mut |fm| {
            fm.insert(name.to_string(), json.clone());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{Frontmatter, MemoryVault};
    use serde_json::json;

    fn service(vault: &Arc<MemoryVault>) -> RelationEditService {
        RelationEditService::new(
            vault.clone(),
            vault.clone(),
            vec![BidiRule::new("project", "tasks")],
        )
    }

    #[test]
    fn test_update_relation_syncs_both_sides() {
        let vault = Arc::new(MemoryVault::new());
        let task = vault.insert_note("tasks/T1.md", Frontmatter::new());
        vault.insert_note("projects/Alpha.md", Frontmatter::new());
        vault.insert_note("projects/Beta.md", Frontmatter::new());
        let service = service(&vault);

        let report = service
            .update_relation(&task, "note.project", &["[[Alpha]]".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(report.linked.len(), 1);
        assert_eq!(vault.frontmatter("tasks/T1.md").unwrap()["project"], json!(["[[Alpha]]"]));
        assert_eq!(
            vault.frontmatter("projects/Alpha.md").unwrap()["tasks"],
            json!(["[[tasks/T1]]"])
        );

        // Swap Alpha for Beta
        service
            .update_relation(&task, "note.project", &["[[Beta]]".to_string()])
            .unwrap();
        assert_eq!(vault.frontmatter("projects/Alpha.md").unwrap()["tasks"], json!([]));
        assert_eq!(
            vault.frontmatter("projects/Beta.md").unwrap()["tasks"],
            json!(["[[tasks/T1]]"])
        );
    }

    #[test]
    fn test_update_relation_without_rule() {
        let vault = Arc::new(MemoryVault::new());
        let task = vault.insert_note("T1.md", Frontmatter::new());
        vault.insert_note("Alpha.md", Frontmatter::new());

        let report = service(&vault)
            .update_relation(&task, "note.owner", &["[[Alpha]]".to_string()])
            .unwrap();
        assert!(report.is_none());
        assert_eq!(vault.frontmatter("T1.md").unwrap()["owner"], json!(["[[Alpha]]"]));
        assert!(vault.frontmatter("Alpha.md").unwrap().is_empty());
    }

    #[test]
    fn test_update_relation_missing_source() {
        let vault = Arc::new(MemoryVault::new());
        let result = service(&vault).update_relation(
            &NoteHandle::new("nope.md"),
            "note.project",
            &[],
        );
        assert!(matches!(result, Err(SyncError::Mutate(MutateError::NotFound(_)))));
    }

    #[test]
    fn test_update_cell() {
        let vault = Arc::new(MemoryVault::new());
        let task = vault.insert_note("T1.md", Frontmatter::new());
        let service = service(&vault);

        service.update_cell(&task, "note.estimate", &CanonicalValue::Number(3.0)).unwrap();
        service.update_cell(&task, "note.status", &"done".into()).unwrap();
        let fm = vault.frontmatter("T1.md").unwrap();
        assert_eq!(fm["estimate"], json!(3));
        assert_eq!(fm["status"], json!("done"));
    }
}
