//! Relation column detection.
//!
//! A column is a relation if, over the first [`SAMPLE_LIMIT`] rows, it holds
//! a list of wikilinks, a list of note names, mostly scalar note names, or
//! (for empty columns) its name matches a subfolder of the base folder.
//! Checks run in that order and stop at the first match.

use super::columns::property_name;
use super::normalize::CanonicalValue;
use super::wikilink;
use crate::vault::NoteResolver;

/// Rows inspected per column
pub const SAMPLE_LIMIT: usize = 10;
/// Only note properties can be relations
pub const NOTE_PROPERTY_PREFIX: &str = "note.";
/// Scalar check needs at least this many non-link text values
pub const MIN_TEXT_REF_SAMPLES: usize = 2;
/// Scalar check passes when strictly more than this share resolves
pub const TEXT_REF_HIT_RATIO: f64 = 0.5;
/// Plural form tried by the folder fallback
pub const FOLDER_PLURAL_SUFFIX: &str = "s";

/// The first [`SAMPLE_LIMIT`] values of a column.
#[derive(Debug, Clone)]
pub struct ColumnSample<'a> {
    values: Vec<&'a CanonicalValue>,
}

impl<'a> ColumnSample<'a> {
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a CanonicalValue>,
    {
        Self {
            values: values.into_iter().take(SAMPLE_LIMIT).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CanonicalValue> + '_ {
        self.values.iter().copied()
    }
}

/// Decide whether `column_id` is a relation column.
pub fn classify(
    column_id: &str,
    sample: &ColumnSample<'_>,
    base_folder: Option<&str>,
    resolver: &dyn NoteResolver,
) -> bool {
    if !column_id.starts_with(NOTE_PROPERTY_PREFIX) {
        return false;
    }

    // List values: all wikilinks, or all names of existing notes
    for value in sample.iter() {
        let Some(items) = string_list(value) else {
            continue;
        };
        if items.iter().all(|item| wikilink::is_link(item)) {
            log::trace!("[RELATIONS] {} holds a wikilink list", column_id);
            return true;
        }
        if items.iter().all(|item| resolver.is_text_reference(item)) {
            log::trace!("[RELATIONS] {} holds a list of note names", column_id);
            return true;
        }
    }

    // Scalar text references
    let mut text_ref_samples = 0usize;
    let mut text_ref_hits = 0usize;
    for value in sample.iter() {
        let Some(text) = value.as_str() else {
            continue;
        };
        if text.is_empty() || wikilink::is_link(text) {
            continue;
        }
        text_ref_samples += 1;
        if resolver.is_text_reference(text) {
            text_ref_hits += 1;
        }
    }
    if text_ref_samples >= MIN_TEXT_REF_SAMPLES
        && (text_ref_hits as f64 / text_ref_samples as f64) > TEXT_REF_HIT_RATIO
    {
        log::trace!(
            "[RELATIONS] {} resolves {}/{} scalar samples",
            column_id,
            text_ref_hits,
            text_ref_samples
        );
        return true;
    }

    match_relation_subfolder(column_id, base_folder, resolver).is_some()
}

/// Convenience wrapper over a plain slice of column values.
pub fn classify_values(
    column_id: &str,
    values: &[CanonicalValue],
    base_folder: Option<&str>,
    resolver: &dyn NoteResolver,
) -> bool {
    classify(column_id, &ColumnSample::new(values), base_folder, resolver)
}

/// Non-empty list made only of strings.
fn string_list(value: &CanonicalValue) -> Option<Vec<&str>> {
    let items = value.as_list()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(CanonicalValue::as_str).collect()
}

/// Folder paths checked for a property name under `base_folder`.
///
/// `name`, `name` + "s", and, when `name` already ends in "s", `name` without it.
pub fn folder_candidates(base_folder: &str, name: &str) -> Vec<String> {
    let mut candidates = vec![
        format!("{}/{}", base_folder, name),
        format!("{}/{}{}", base_folder, name, FOLDER_PLURAL_SUFFIX),
    ];
    if name.len() > 1 {
        if let Some(singular) = name.strip_suffix(FOLDER_PLURAL_SUFFIX) {
            candidates.push(format!("{}/{}", base_folder, singular));
        }
    }
    candidates
}

/// First existing folder under `base_folder` named after the column's property.
pub fn match_relation_subfolder(
    column_id: &str,
    base_folder: Option<&str>,
    resolver: &dyn NoteResolver,
) -> Option<String> {
    let base_folder = base_folder.filter(|b| !b.is_empty())?;
    let name = property_name(column_id).to_lowercase();

    folder_candidates(base_folder, &name)
        .into_iter()
        .find(|candidate| resolver.is_folder(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{Frontmatter, MemoryVault};

    fn vault() -> MemoryVault {
        let vault = MemoryVault::new();
        vault.insert_note("work/projects/Project X.md", Frontmatter::new());
        vault.insert_note("work/projects/Project Y.md", Frontmatter::new());
        vault.insert_note("work/tasks/T1.md", Frontmatter::new());
        vault
    }

    fn strings(items: &[&str]) -> CanonicalValue {
        CanonicalValue::List(items.iter().map(|s| CanonicalValue::from(*s)).collect())
    }

    #[test]
    fn test_namespace_gate() {
        let vault = vault();
        let values = vec![strings(&["[[Project X]]"])];
        assert!(!classify_values("file.name", &values, None, &vault));
        assert!(!classify_values("formula.x", &values, None, &vault));
    }

    #[test]
    fn test_wikilink_list_in_first_row() {
        let vault = vault();
        let values = vec![strings(&["[[Project X]]"])];
        assert!(classify_values("note.project", &values, None, &vault));
    }

    #[test]
    fn test_list_of_note_names() {
        let vault = vault();
        let values = vec![CanonicalValue::Null, strings(&["Project X", "Project Y"])];
        assert!(classify_values("note.related", &values, None, &vault));

        let values = vec![strings(&["Project X", "Nowhere"])];
        assert!(!classify_values("note.related", &values, None, &vault));
    }

    #[test]
    fn test_mixed_list_is_not_a_link_list() {
        let vault = vault();
        let values = vec![CanonicalValue::List(vec![
            "[[Project X]]".into(),
            CanonicalValue::Number(1.0),
        ])];
        assert!(!classify_values("note.project", &values, None, &vault));
    }

    #[test]
    fn test_scalar_threshold_boundaries() {
        let vault = vault();

        // A single resolving sample is not enough
        let one = vec![CanonicalValue::from("Project X")];
        assert!(!classify_values("note.owner", &one, None, &vault));

        // Exactly two samples, both resolving
        let two = vec![CanonicalValue::from("Project X"), CanonicalValue::from("Project Y")];
        assert!(classify_values("note.owner", &two, None, &vault));

        // Exactly 50% is not strictly more than half
        let half = vec![CanonicalValue::from("Project X"), CanonicalValue::from("Nowhere")];
        assert!(!classify_values("note.owner", &half, None, &vault));

        // Two of three
        let most = vec![
            CanonicalValue::from("Project X"),
            CanonicalValue::from("Nowhere"),
            CanonicalValue::from("T1"),
        ];
        assert!(classify_values("note.owner", &most, None, &vault));
    }

    #[test]
    fn test_scalar_skips_empty_and_links() {
        let vault = vault();
        let values = vec![
            CanonicalValue::from(""),
            CanonicalValue::from("[[Nowhere]]"),
            CanonicalValue::from("Project X"),
        ];
        // Only one counted sample
        assert!(!classify_values("note.owner", &values, None, &vault));
    }

    #[test]
    fn test_sample_limit() {
        let vault = vault();
        let mut values = vec![CanonicalValue::Null; SAMPLE_LIMIT];
        values.push(strings(&["[[Project X]]"]));
        assert!(!classify_values("note.project", &values, None, &vault));

        values[SAMPLE_LIMIT - 1] = strings(&["[[Project X]]"]);
        assert!(classify_values("note.project", &values, None, &vault));
        assert_eq!(ColumnSample::new(&values).len(), SAMPLE_LIMIT);
    }

    #[test]
    fn test_folder_fallback_for_empty_column() {
        let vault = vault();
        vault.add_folder("work/people");
        let empty = vec![CanonicalValue::Null; 3];

        assert!(classify_values("note.project", &empty, Some("work"), &vault));
        assert!(classify_values("note.Projects", &empty, Some("work"), &vault));
        assert!(classify_values("note.people", &empty, Some("work"), &vault));
        assert!(!classify_values("note.project", &empty, None, &vault));
        assert!(!classify_values("note.project", &empty, Some("archive"), &vault));
    }

    #[test]
    fn test_folder_fallback_through_singular_name() {
        let vault = vault();
        vault.add_folder("clients/project");
        let empty = vec![CanonicalValue::Null; 3];

        assert!(classify_values("note.projects", &empty, Some("clients"), &vault));
        assert_eq!(
            match_relation_subfolder("note.projects", Some("clients"), &vault),
            Some("clients/project".to_string())
        );
        assert!(!classify_values("note.projectss", &empty, Some("clients"), &vault));
    }

    #[test]
    fn test_numbered_labels_are_not_note_names() {
        let vault = vault();
        vault.insert_note("Bug.md", Frontmatter::new());

        let scalars = vec![CanonicalValue::from("Bug #1"), CanonicalValue::from("Bug #2")];
        assert!(!classify_values("note.ticket", &scalars, None, &vault));
        assert!(!classify_values("note.ticket", &[strings(&["Bug #1", "Bug #2"])], None, &vault));

        let names = vec![CanonicalValue::from("Bug"), CanonicalValue::from("bug")];
        assert!(classify_values("note.ticket", &names, None, &vault));
    }

    #[test]
    fn test_numbers_without_folder_match() {
        let vault = vault();
        let values = vec![CanonicalValue::Number(1.0), CanonicalValue::Number(2.0)];
        assert!(!classify_values("note.estimate", &values, Some("work"), &vault));
    }

    #[test]
    fn test_folder_candidates() {
        assert_eq!(
            folder_candidates("work", "project"),
            vec!["work/project", "work/projects"]
        );
        assert_eq!(
            folder_candidates("work", "tasks"),
            vec!["work/tasks", "work/taskss", "work/task"]
        );
        assert_eq!(folder_candidates("w", "s"), vec!["w/s", "w/ss"]);
    }

    #[test]
    fn test_match_relation_subfolder_returns_path() {
        let vault = vault();
        assert_eq!(
            match_relation_subfolder("note.task", Some("work"), &vault),
            Some("work/tasks".to_string())
        );
        assert_eq!(match_relation_subfolder("note.task", Some(""), &vault), None);
    }
}
