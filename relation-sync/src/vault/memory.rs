//! In-memory vault. Deterministic stand-in for a real note store.

use super::{
    frontmatter_aliases, Frontmatter, FrontmatterMutator, NoteHandle, NoteIndex, NoteResolver,
};
use crate::error::MutateError;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct MemoryState {
    notes: BTreeMap<NoteHandle, Frontmatter>,
    folders: BTreeSet<String>,
}

/// Notes held as frontmatter maps keyed by path.
///
/// Every transform runs under the write lock, so concurrent mutations of
/// the same note are serialized.
#[derive(Default)]
pub struct MemoryVault {
    state: RwLock<MemoryState>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a note.
    pub fn insert_note(&self, path: &str, frontmatter: Frontmatter) -> NoteHandle {
        let handle = NoteHandle::new(path);
        self.state.write().notes.insert(handle.clone(), frontmatter);
        handle
    }

    /// Register an (possibly empty) folder.
    pub fn add_folder(&self, path: &str) {
        self.state.write().folders.insert(path.trim_matches('/').to_string());
    }

    pub fn remove_note(&self, path: &str) -> Option<Frontmatter> {
        self.state.write().notes.remove(&NoteHandle::new(path))
    }

    /// Snapshot of a note's frontmatter
    pub fn frontmatter(&self, path: &str) -> Option<Frontmatter> {
        self.state.read().notes.get(&NoteHandle::new(path)).cloned()
    }

    pub fn notes(&self) -> Vec<NoteHandle> {
        self.state.read().notes.keys().cloned().collect()
    }

    fn index(&self) -> NoteIndex {
        let state = self.state.read();
        let mut index = NoteIndex::new();
        for folder in &state.folders {
            index.add_folder(folder);
        }
        for (handle, frontmatter) in &state.notes {
            index.insert(handle.clone(), &frontmatter_aliases(frontmatter));
        }
        index
    }
}

impl NoteResolver for MemoryVault {
    fn is_text_reference(&self, text: &str) -> bool {
        self.index().is_text_reference(text)
    }

    fn resolve_link(&self, path: &str, relative_to: &NoteHandle) -> Option<NoteHandle> {
        self.index().resolve(path, relative_to)
    }

    fn is_folder(&self, path: &str) -> bool {
        self.index().is_folder(path)
    }
}

impl FrontmatterMutator for MemoryVault {
    fn process_frontmatter(
        &self,
        note: &NoteHandle,
        transform: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<(), MutateError> {
        let mut state = self.state.write();
        let frontmatter = state
            .notes
            .get_mut(note)
            .ok_or_else(|| MutateError::NotFound(note.path().to_string()))?;
        transform(frontmatter);
        Ok(())
    }

    fn read_frontmatter(&self, note: &NoteHandle) -> Result<Frontmatter, MutateError> {
        self.state
            .read()
            .notes
            .get(note)
            .cloned()
            .ok_or_else(|| MutateError::NotFound(note.path().to_string()))
    }
}
