//! NoteStore, the markdown vault on disk
//!
//! Notes are `.md` files with a YAML frontmatter block. An in-memory
//! [`NoteIndex`] answers link resolution; frontmatter edits go through a
//! per-file lock so concurrent read-modify-writes of one note never lose an
//! update.

use super::{file_ops, frontmatter};
use crate::error::MutateError;
use crate::vault::{
    frontmatter_aliases, Frontmatter, FrontmatterMutator, NoteHandle, NoteIndex, NoteResolver,
};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct NoteStore {
    vault_dir: PathBuf,
    index: RwLock<NoteIndex>,
    /// One lock per note path, created on first write
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl NoteStore {
    /// Open a vault directory (created if missing) and index it
    pub fn open(vault_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let vault_dir = vault_dir.into();
        std::fs::create_dir_all(&vault_dir)?;

        let store = Self {
            vault_dir,
            index: RwLock::new(NoteIndex::new()),
            locks: DashMap::new(),
        };
        store.reindex()?;
        Ok(store)
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    /// Rebuild the index from disk
    pub fn reindex(&self) -> std::io::Result<usize> {
        let mut index = NoteIndex::new();

        for folder in file_ops::list_folders(&self.vault_dir)? {
            index.add_folder(&folder);
        }

        for file_path in file_ops::list_notes(&self.vault_dir)? {
            let Some(rel_path) = file_ops::relative_path(&self.vault_dir, &file_path) else {
                continue;
            };
            let aliases = match file_ops::read_note(&file_path) {
                Ok(content) => match frontmatter::parse_note(&content) {
                    Ok((fm, _)) => frontmatter_aliases(&fm),
                    Err(e) => {
                        log::warn!("[NOTES] Skipping frontmatter of {}: {}", rel_path, e);
                        Vec::new()
                    }
                },
                Err(e) => {
                    log::warn!("[NOTES] Failed to read {}: {}", rel_path, e);
                    continue;
                }
            };
            index.insert(NoteHandle::new(rel_path), &aliases);
        }

        let count = index.len();
        *self.index.write() = index;
        log::info!("[NOTES] Indexed {} note files", count);
        Ok(count)
    }

    /// Create a new note. Fails if the file already exists.
    pub fn create_note(
        &self,
        rel_path: &str,
        frontmatter: &Frontmatter,
        body: &str,
    ) -> Result<NoteHandle, String> {
        let handle = NoteHandle::new(rel_path);
        let full_path = self.note_path(&handle);
        if full_path.exists() {
            return Err(format!("Note already exists: {}", handle));
        }

        let content = frontmatter::render_note(frontmatter, body)?;
        file_ops::write_note(&full_path, &content)
            .map_err(|e| format!("Failed to write note: {}", e))?;

        self.index
            .write()
            .insert(handle.clone(), &frontmatter_aliases(frontmatter));
        Ok(handle)
    }

    /// Read a note's content
    pub fn read_note(&self, rel_path: &str) -> Result<String, String> {
        let full_path = self.note_path(&NoteHandle::new(rel_path));
        file_ops::read_note(&full_path).map_err(|e| format!("Failed to read note: {}", e))
    }

    /// List all note files (relative paths)
    pub fn list_files(&self) -> std::io::Result<Vec<String>> {
        let files = file_ops::list_notes(&self.vault_dir)?;
        Ok(files
            .into_iter()
            .filter_map(|p| file_ops::relative_path(&self.vault_dir, &p))
            .collect())
    }

    /// Indexed notes under `folder` (recursively), sorted by path
    pub fn notes_in_folder(&self, folder: &str) -> Vec<NoteHandle> {
        let folder = folder.trim_matches('/');
        let prefix = format!("{}/", folder);
        let mut notes: Vec<NoteHandle> = self
            .index
            .read()
            .notes()
            .filter(|n| folder.is_empty() || n.path().starts_with(&prefix))
            .cloned()
            .collect();
        notes.sort();
        notes
    }

    fn note_path(&self, note: &NoteHandle) -> PathBuf {
        note.path()
            .split('/')
            .fold(self.vault_dir.clone(), |path, segment| path.join(segment))
    }

    fn lock_for(&self, note: &NoteHandle) -> Arc<Mutex<()>> {
        self.locks
            .entry(note.path().to_string())
            .or_default()
            .value()
            .clone()
    }

    fn load(
        &self,
        note: &NoteHandle,
        full_path: &Path,
    ) -> Result<(Frontmatter, String), MutateError> {
        let content = file_ops::read_note(full_path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                MutateError::NotFound(note.path().to_string())
            } else {
                MutateError::Io {
                    path: note.path().to_string(),
                    source,
                }
            }
        })?;
        let (fm, body) = frontmatter::parse_note(&content).map_err(|message| {
            MutateError::Frontmatter {
                path: note.path().to_string(),
                message,
            }
        })?;
        Ok((fm, body.to_string()))
    }
}

impl NoteResolver for NoteStore {
    fn is_text_reference(&self, text: &str) -> bool {
        self.index.read().is_text_reference(text)
    }

    fn resolve_link(&self, path: &str, relative_to: &NoteHandle) -> Option<NoteHandle> {
        self.index.read().resolve(path, relative_to)
    }

    fn is_folder(&self, path: &str) -> bool {
        self.index.read().is_folder(path)
    }
}

impl FrontmatterMutator for NoteStore {
    fn process_frontmatter(
        &self,
        note: &NoteHandle,
        transform: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<(), MutateError> {
        let lock = self.lock_for(note);
        let _guard = lock.lock();

        let full_path = self.note_path(note);
        let (mut fm, body) = self.load(note, &full_path)?;
        let before = fm.clone();
        transform(&mut fm);
        if fm == before {
            return Ok(());
        }

        let content = frontmatter::render_note(&fm, &body).map_err(|message| {
            MutateError::Frontmatter {
                path: note.path().to_string(),
                message,
            }
        })?;
        file_ops::write_note(&full_path, &content).map_err(|source| MutateError::Io {
            path: note.path().to_string(),
            source,
        })?;

        self.index.write().insert(note.clone(), &frontmatter_aliases(&fm));
        log::debug!("[NOTES] Updated frontmatter of {}", note);
        Ok(())
    }

    fn read_frontmatter(&self, note: &NoteHandle) -> Result<Frontmatter, MutateError> {
        let full_path = self.note_path(note);
        self.load(note, &full_path).map(|(fm, _)| fm)
    }
}
