//! Notes system: markdown vault with YAML frontmatter
//!
//! The filesystem implementation of the vault collaborators. Frontmatter
//! edits are atomic per file; the body of a note is never rewritten.

pub mod file_ops;
pub mod frontmatter;
pub mod store;

pub use store::NoteStore;
