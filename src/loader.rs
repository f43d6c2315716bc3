//! Reading graph snapshots from disk.

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::graph::GraphSnapshot;

/// Load a snapshot from a JSON file of the form
/// `{ "modules": [...], "dependencies": [...] }`.
///
/// Only the shape is validated here. References that point outside the
/// snapshot are accepted and skipped later by the traversals.
pub fn load_snapshot(path: &Path) -> Result<GraphSnapshot, Error> {
    let data = fs::read(path).map_err(|e| Error::SnapshotRead(path.to_path_buf(), e))?;
    let snapshot: GraphSnapshot =
        serde_json::from_slice(&data).map_err(|e| Error::SnapshotParse(path.to_path_buf(), e))?;
    tracing::debug!(
        path = %path.display(),
        bytes = data.len(),
        modules = snapshot.modules.len(),
        dependencies = snapshot.dependencies.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModuleId;

    #[test]
    fn loads_minimal_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(
            &path,
            r#"{"modules":[{"id":7,"path":"src/a.js","sourceSize":3}],"dependencies":[]}"#,
        )
        .unwrap();
        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.modules[0].id, ModuleId(7));
        assert!(snapshot.dependencies.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::SnapshotRead(..)));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, r#"{"modules":[{"id":"one"}]}"#).unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, Error::SnapshotParse(..)));
        assert!(err.hint().is_some());
    }
}
