//! In-memory lookup tables shared by the vault implementations.
//!
//! Keys are lowercase, without the `.md` extension. Link resolution tries,
//! in order: the exact vault path, the path relative to the linking note's
//! folder, a basename/suffix match, then an alias match. Ties go to the
//! linking note's folder first, then the shortest path.

use super::NoteHandle;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
struct IndexedNote {
    handle: NoteHandle,
    path_key: String,
    stem_key: String,
    alias_keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteIndex {
    notes: Vec<IndexedNote>,
    folders: BTreeSet<String>,
}

/// Lowercase lookup key for a note name or path: extension dropped.
fn name_key(text: &str) -> String {
    let text = text.trim().trim_start_matches('/');
    let text = text.strip_suffix(".md").unwrap_or(text);
    text.to_lowercase()
}

/// Lookup key for a link target: `#heading` subpath dropped, then as [`name_key`].
fn link_key(target: &str) -> String {
    name_key(target.split('#').next().unwrap_or(target))
}

fn folder_key(path: &str) -> String {
    path.trim().trim_matches('/').to_lowercase()
}

/// Join `link` onto `folder`, applying `.` and `..` segments.
fn join_relative(folder: &str, link: &str) -> String {
    let mut segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(part),
        }
    }
    segments.join("/")
}

/// Best candidate: in `source_folder` first, then shortest path, then lexical order.
fn closest<'a>(
    candidates: impl Iterator<Item = &'a IndexedNote>,
    source_folder: &str,
) -> Option<NoteHandle> {
    candidates
        .min_by(|a, b| {
            let a_far = a.handle.folder().to_lowercase() != source_folder;
            let b_far = b.handle.folder().to_lowercase() != source_folder;
            a_far
                .cmp(&b_far)
                .then(a.path_key.len().cmp(&b.path_key.len()))
                .then(a.path_key.cmp(&b.path_key))
        })
        .map(|n| n.handle.clone())
}

impl NoteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Add or replace a note. Its ancestor folders are registered too.
    pub fn insert(&mut self, handle: NoteHandle, aliases: &[String]) {
        self.remove(handle.path());
        self.add_folder(handle.folder());

        let path_key = name_key(handle.path());
        let stem_key = handle.basename().to_lowercase();
        let alias_keys = aliases
            .iter()
            .map(|a| name_key(a))
            .filter(|a| !a.is_empty())
            .collect();
        self.notes.push(IndexedNote {
            handle,
            path_key,
            stem_key,
            alias_keys,
        });
    }

    pub fn remove(&mut self, path: &str) {
        let key = name_key(path);
        self.notes.retain(|n| n.path_key != key);
    }

    /// Register a folder and all of its ancestors.
    pub fn add_folder(&mut self, path: &str) {
        let key = folder_key(path);
        if key.is_empty() {
            return;
        }
        let mut prefix = String::new();
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            self.folders.insert(prefix.clone());
        }
    }

    pub fn notes(&self) -> impl Iterator<Item = &NoteHandle> {
        self.notes.iter().map(|n| &n.handle)
    }

    /// True if the whole text names a note by basename, path, or alias.
    pub fn is_text_reference(&self, text: &str) -> bool {
        let key = name_key(text);
        if key.is_empty() {
            return false;
        }
        self.notes
            .iter()
            .any(|n| n.stem_key == key || n.path_key == key || n.alias_keys.contains(&key))
    }

    pub fn resolve(&self, link_path: &str, relative_to: &NoteHandle) -> Option<NoteHandle> {
        let key = link_key(link_path);
        if key.is_empty() {
            return None;
        }

        if let Some(note) = self.notes.iter().find(|n| n.path_key == key) {
            return Some(note.handle.clone());
        }

        let relative = join_relative(&relative_to.folder().to_lowercase(), &key);
        if let Some(note) = self.notes.iter().find(|n| n.path_key == relative) {
            return Some(note.handle.clone());
        }

        let suffix = format!("/{}", key);
        let source_folder = relative_to.folder().to_lowercase();
        closest(
            self.notes.iter().filter(|n| n.path_key.ends_with(&suffix)),
            &source_folder,
        )
        .or_else(|| {
            closest(
                self.notes.iter().filter(|n| n.alias_keys.contains(&key)),
                &source_folder,
            )
        })
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.folders.contains(&folder_key(path))
    }
}
