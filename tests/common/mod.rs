#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A self-contained graph snapshot written to a temp directory.
///
/// Structure (ids in parentheses, sizes in bytes):
///   src/index.js (1, 100)       -> src/app.js, node_modules/react/index.js
///   src/app.js (2, 2000)        -> src/util/format.js
///   src/util/format.js (3, 300) -> node_modules/react/index.js
///   node_modules/react/index.js (4, 50000), concatenates
///       node_modules/react/cjs/react.js (5, 7000)
///   src/admin.js (6, 400)       -> node_modules/react/index.js
///
/// Properties:
///   - react (4) is imported by index, format and admin, so it is shared
///     from index's point of view: admin sits outside index's closure
///   - bound to index: app, format (2300 bytes)
///   - index's closure without the root: 59300 bytes
///   - chunks: index and app in "main", admin in "admin"
///   - module 4 references a dependency record (id 99) that is missing
pub struct TestSnapshot {
    pub dir: tempfile::TempDir,
    pub path: PathBuf,
}

pub const SNAPSHOT_JSON: &str = r#"{
  "modules": [
    { "id": 1, "path": "src/index.js", "sourceSize": 100,
      "dependencyIds": [1, 2], "chunkIds": ["main"] },
    { "id": 2, "path": "src/app.js", "sourceSize": 2000,
      "dependencyIds": [3], "chunkIds": ["main"], "importedByModuleIds": [1] },
    { "id": 3, "path": "src/util/format.js", "sourceSize": 300,
      "dependencyIds": [4], "importedByModuleIds": [2] },
    { "id": 4, "path": "node_modules/react/index.js", "sourceSize": 50000,
      "kind": "concatenated", "concatenatedModuleIds": [5],
      "dependencyIds": [99], "importedByModuleIds": [1, 3, 6] },
    { "id": 5, "path": "node_modules/react/cjs/react.js", "sourceSize": 7000 },
    { "id": 6, "path": "src/admin.js", "sourceSize": 400, "dependencyIds": [5],
      "chunkIds": ["admin"] }
  ],
  "dependencies": [
    { "id": 1, "originModuleId": 1, "targetModuleId": 2 },
    { "id": 2, "originModuleId": 1, "targetModuleId": 4 },
    { "id": 3, "originModuleId": 2, "targetModuleId": 3 },
    { "id": 4, "originModuleId": 3, "targetModuleId": 4 },
    { "id": 5, "originModuleId": 6, "originDependency": 4 }
  ]
}"#;

impl TestSnapshot {
    /// Create the fixture. Caller must keep the returned value alive
    /// (dropping `TempDir` deletes the files).
    pub fn new() -> Self {
        Self::with_contents(SNAPSHOT_JSON)
    }

    pub fn with_contents(contents: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, contents).unwrap();
        Self { dir, path }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
