//! Relation detection and bidirectional back-link sync for markdown note vaults.

pub mod config;
pub mod error;
pub mod notes;
pub mod relations;
pub mod vault;

pub use error::{ConfigError, MutateError, SyncError};
pub use notes::NoteStore;
pub use relations::{RelationEditService, SyncCoordinator, SyncReport};
pub use vault::{Frontmatter, FrontmatterMutator, MemoryVault, NoteHandle, NoteResolver};
