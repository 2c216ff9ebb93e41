use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised by the storage layer.
///
/// Each public storage operation returns one of these instead of a bare
/// message so the bridge can tell callers *why* something failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid note id '{0}': ids must be non-empty and numeric")]
    InvalidNoteId(String),

    #[error("invalid notebook id '{0}'")]
    InvalidNotebookId(String),

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("notebook metadata is malformed: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("failed to reveal {} in the file browser: {message}", .path.display())]
    Reveal { path: PathBuf, message: String },
}

/// Coarse failure category reported to the UI alongside the message.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PermissionDenied,
    AlreadyExists,
    Corrupt,
    Io,
}

impl StorageError {
    /// Wraps an io error with the action and path it happened on.
    pub fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::InvalidNoteId(_) | StorageError::InvalidNotebookId(_) => {
                ErrorKind::InvalidInput
            }
            StorageError::Io { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
                io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
                io::ErrorKind::InvalidData => ErrorKind::Corrupt,
                _ => ErrorKind::Io,
            },
            StorageError::Metadata(_) => ErrorKind::Corrupt,
            StorageError::Reveal { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
