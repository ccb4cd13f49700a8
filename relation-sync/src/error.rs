use crate::relations::sync::SyncReport;
use std::path::PathBuf;

/// Failure of a frontmatter read-modify-write on one note.
#[derive(Debug, thiserror::Error)]
pub enum MutateError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Failed to access note {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid frontmatter in {path}: {message}")]
    Frontmatter { path: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Some targets were updated, others were not. Nothing is retried.
    #[error(
        "Back-link propagation failed for {} of {} target(s)",
        .report.failed.len(),
        .report.attempted()
    )]
    TargetsFailed { report: SyncReport },

    /// The edit on the source note itself failed
    #[error(transparent)]
    Mutate(#[from] MutateError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read view config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse view config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}
