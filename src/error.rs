//! Error types for lopper.

use std::path::PathBuf;

use crate::graph::ModuleId;

/// Errors from snapshot I/O and query validation.
///
/// Dangling references inside a snapshot are deliberately not represented
/// here: traversals skip them and the loader only reports a count.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Requested root module is not in the snapshot.
    ModuleNotFound(ModuleId),
    /// Cannot read a snapshot file from disk.
    SnapshotRead(PathBuf, std::io::Error),
    /// Snapshot file contains invalid JSON or an unexpected shape.
    SnapshotParse(PathBuf, serde_json::Error),
    /// --bound-only was requested without a module to classify against.
    BoundOnlyRequiresModule,
}

impl Error {
    /// User-facing hint to accompany the error message.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::ModuleNotFound(_) => Some(
                "module ids come from the snapshot; run `lopper search <snapshot> <name>` to find them",
            ),
            Self::SnapshotParse(..) => Some(
                "expected a JSON object with \"modules\" and \"dependencies\" arrays",
            ),
            Self::BoundOnlyRequiresModule => Some("pass --module <id> together with --bound-only"),
            Self::SnapshotRead(..) => None,
        }
    }
}

// Display: lowercase, no trailing punctuation, so it composes into
// larger error messages.
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleNotFound(id) => write!(f, "module {id} not found in snapshot"),
            Self::SnapshotRead(path, source) => {
                write!(f, "cannot read snapshot '{}': {source}", path.display())
            }
            Self::SnapshotParse(path, source) => {
                write!(f, "invalid snapshot '{}': {source}", path.display())
            }
            Self::BoundOnlyRequiresModule => {
                write!(f, "--bound-only needs a module to compute bound dependencies for")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SnapshotRead(_, e) => Some(e),
            Self::SnapshotParse(_, e) => Some(e),
            _ => None,
        }
    }
}
