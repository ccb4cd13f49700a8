//! Column layout for a table view: base folder, column metadata, and the
//! context used to filter view-option property pickers.

use super::classify::{self, ColumnSample, NOTE_PROPERTY_PREFIX};
use super::normalize::CanonicalValue;
use crate::vault::{Frontmatter, NoteHandle, NoteResolver};
use relation_sync_types::{ColumnMeta, RollupSpec};
use std::collections::BTreeMap;

static NULL: CanonicalValue = CanonicalValue::Null;

/// Frontmatter key of a property id: `note.related-projects` -> `related-projects`.
pub fn property_name(property_id: &str) -> &str {
    property_id
        .split_once('.')
        .map(|(_, name)| name)
        .unwrap_or(property_id)
}

/// Property id for a frontmatter key: `project` -> `note.project`.
pub fn note_property_id(name: &str) -> String {
    if name.starts_with(NOTE_PROPERTY_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", NOTE_PROPERTY_PREFIX, name)
    }
}

/// One table row: a note and its normalized values keyed by property id.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub note: NoteHandle,
    pub values: BTreeMap<String, CanonicalValue>,
}

impl TableRow {
    pub fn new(note: NoteHandle) -> Self {
        Self {
            note,
            values: BTreeMap::new(),
        }
    }

    /// Row built from frontmatter, every key exposed as `note.<key>`.
    pub fn from_frontmatter(note: NoteHandle, frontmatter: &Frontmatter) -> Self {
        let values = frontmatter
            .iter()
            .map(|(key, value)| (note_property_id(key), CanonicalValue::from(value)))
            .collect();
        Self { note, values }
    }

    /// Value of a column; null when the row has none.
    pub fn get(&self, property_id: &str) -> &CanonicalValue {
        self.values.get(property_id).unwrap_or(&NULL)
    }

    pub fn set(&mut self, property_id: impl Into<String>, value: CanonicalValue) {
        self.values.insert(property_id.into(), value);
    }
}

/// Sample of one column across rows.
pub fn column_sample<'a>(rows: &'a [TableRow], property_id: &str) -> ColumnSample<'a> {
    ColumnSample::new(rows.iter().map(|row| row.get(property_id)))
}

/// Common folder of the notes, one level up so sibling folders are included.
///
/// `work/tasks/a.md` + `work/tasks/sub/b.md` -> `work`. A single top-level
/// folder is returned as is. Notes with no shared folder give `None`.
pub fn base_folder<'a, I>(note_paths: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut folders = note_paths.into_iter().map(|path| {
        path.rfind('/')
            .map(|i| &path[..i])
            .unwrap_or("")
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
    });

    let mut common = folders.next()?;
    for segments in folders {
        let shared = common
            .iter()
            .zip(&segments)
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
        if common.is_empty() {
            return None;
        }
    }

    if common.is_empty() {
        return None;
    }
    if common.len() > 1 {
        common.pop();
    }
    Some(common.join("/"))
}

/// Folder a relation picker should browse: the matching subfolder, else the base folder.
pub fn infer_relation_folder(
    property_id: &str,
    base_folder: Option<&str>,
    resolver: &dyn NoteResolver,
) -> Option<String> {
    classify::match_relation_subfolder(property_id, base_folder, resolver)
        .or_else(|| base_folder.map(str::to_string))
}

/// Columns of `property_ids` that classify as relations.
pub fn detect_relation_columns(
    property_ids: &[String],
    rows: &[TableRow],
    base_folder: Option<&str>,
    resolver: &dyn NoteResolver,
) -> Vec<String> {
    property_ids
        .iter()
        .filter(|id| classify::classify(id, &column_sample(rows, id), base_folder, resolver))
        .cloned()
        .collect()
}

/// Metadata for every column, in order.
///
/// `display_names` overrides the default display name (the bare property name).
pub fn describe_columns(
    property_ids: &[String],
    display_names: &BTreeMap<String, String>,
    rows: &[TableRow],
    base_folder: Option<&str>,
    resolver: &dyn NoteResolver,
) -> Vec<ColumnMeta> {
    property_ids
        .iter()
        .map(|id| {
            let is_relation =
                classify::classify(id, &column_sample(rows, id), base_folder, resolver);
            let relation_folder_filter = if is_relation {
                infer_relation_folder(id, base_folder, resolver)
            } else {
                None
            };
            ColumnMeta {
                property_id: id.clone(),
                display_name: display_names
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| property_name(id).to_string()),
                is_relation,
                relation_folder_filter,
                is_rollup: false,
                rollup: None,
            }
        })
        .collect()
}

/// Metadata for computed rollup columns.
pub fn rollup_columns(specs: &[RollupSpec]) -> Vec<ColumnMeta> {
    specs
        .iter()
        .map(|spec| ColumnMeta {
            property_id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            is_relation: false,
            relation_folder_filter: None,
            is_rollup: true,
            rollup: Some(spec.clone()),
        })
        .collect()
}

/// What the view-option pickers may offer, computed from the current view.
///
/// Built by the caller on every refresh and passed to the filters; nothing
/// is kept between views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptionsContext {
    pub current_view_columns: Vec<String>,
    pub detected_relation_columns: Vec<String>,
}

impl ViewOptionsContext {
    pub fn from_rows(
        property_ids: &[String],
        rows: &[TableRow],
        resolver: &dyn NoteResolver,
    ) -> Self {
        let base = base_folder(rows.iter().map(|row| row.note.path()));
        Self {
            current_view_columns: property_ids.to_vec(),
            detected_relation_columns: detect_relation_columns(
                property_ids,
                rows,
                base.as_deref(),
                resolver,
            ),
        }
    }

    /// Relation-column picker filter. Before any detection ran, every note property passes.
    pub fn is_relation_column(&self, property_id: &str) -> bool {
        if self.detected_relation_columns.is_empty() {
            return property_id.starts_with(NOTE_PROPERTY_PREFIX);
        }
        self.detected_relation_columns.iter().any(|c| c == property_id)
    }

    /// Target-property picker filter. Before any view rendered, every note property passes.
    pub fn is_view_column(&self, property_id: &str) -> bool {
        if self.current_view_columns.is_empty() {
            return property_id.starts_with(NOTE_PROPERTY_PREFIX);
        }
        self.current_view_columns.iter().any(|c| c == property_id)
    }
}
