//! File operations for the note store
//!
//! Reading and writing markdown note files and walking the vault tree.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Write a note file (creates parent directories as needed)
///
/// Content goes to a sibling temp file first and is renamed into place, so a
/// reader never sees a half-written note.
pub fn write_note(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}

/// Read a note file
pub fn read_note(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// List all markdown files in the vault (recursively, hidden entries skipped)
pub fn list_notes(vault_dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !vault_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(vault_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().map(|e| e == "md").unwrap_or(false) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// List all folders below the vault root (relative paths)
pub fn list_folders(vault_dir: &Path) -> io::Result<Vec<String>> {
    if !vault_dir.exists() {
        return Ok(Vec::new());
    }

    let mut folders = Vec::new();
    let walker = WalkDir::new(vault_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_dir() {
            if let Some(rel) = relative_path(vault_dir, entry.path()) {
                folders.push(rel);
            }
        }
    }
    Ok(folders)
}

/// Get the vault-relative path of a file, always `/`-separated
pub fn relative_path(vault_dir: &Path, file_path: &Path) -> Option<String> {
    let rel = file_path.strip_prefix(vault_dir).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
