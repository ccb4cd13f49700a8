//! Vault collaborators: note resolution and frontmatter mutation.
//!
//! The relation engine never touches storage directly. It is handed a
//! [`NoteResolver`] and a [`FrontmatterMutator`]; [`MemoryVault`] and
//! [`crate::notes::NoteStore`] are the two implementations shipped here.

pub mod index;
pub mod memory;

pub use index::NoteIndex;
pub use memory::MemoryVault;

use crate::error::MutateError;
use crate::relations::backlinks;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A note's structured metadata block
pub type Frontmatter = serde_json::Map<String, Value>;

/// Vault-relative path of a note, including its `.md` extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteHandle {
    path: String,
}

impl NoteHandle {
    pub fn new(path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self {
            path: path.trim_start_matches('/').to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Folder containing the note; empty at the vault root
    pub fn folder(&self) -> &str {
        self.path.rfind('/').map(|i| &self.path[..i]).unwrap_or("")
    }

    /// File name without the `.md` extension
    pub fn basename(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.strip_suffix(".md").unwrap_or(name)
    }
}

impl fmt::Display for NoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Looks notes and folders up by name.
pub trait NoteResolver: Send + Sync {
    /// True if `text` names an existing note by basename, path, or alias.
    fn is_text_reference(&self, text: &str) -> bool;

    /// Resolve a link path as written in `relative_to`.
    fn resolve_link(&self, path: &str, relative_to: &NoteHandle) -> Option<NoteHandle>;

    /// True if `path` is an existing folder.
    fn is_folder(&self, path: &str) -> bool;
}

/// Atomic read-modify-write access to note frontmatter.
///
/// `process_frontmatter` must run the transform and persist its result
/// without losing a concurrent update to the same note.
pub trait FrontmatterMutator: Send + Sync {
    fn process_frontmatter(
        &self,
        note: &NoteHandle,
        transform: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<(), MutateError>;

    fn read_frontmatter(&self, note: &NoteHandle) -> Result<Frontmatter, MutateError>;

    fn add_back_link(
        &self,
        target: &NoteHandle,
        property: &str,
        back_link: &str,
    ) -> Result<(), MutateError> {
        self.process_frontmatter(target, &mut |fm| {
            backlinks::add_back_link(fm, property, back_link);
        })
    }

    fn remove_back_link(
        &self,
        target: &NoteHandle,
        property: &str,
        back_link: &str,
    ) -> Result<(), MutateError> {
        self.process_frontmatter(target, &mut |fm| {
            backlinks::remove_back_link(fm, property, back_link);
        })
    }
}

/// Aliases declared in frontmatter (`aliases` list or string, or `alias`).
pub fn frontmatter_aliases(frontmatter: &Frontmatter) -> Vec<String> {
    let mut aliases = Vec::new();
    for key in ["aliases", "alias"] {
        match frontmatter.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => aliases.push(s.trim().to_string()),
            Some(Value::Array(items)) => aliases.extend(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            _ => {}
        }
    }
    aliases
}
