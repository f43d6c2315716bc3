//! Session: owns a loaded snapshot index and exposes query methods.
//!
//! A [`Session`] is the primary interface for library consumers such as the
//! CLI. It wraps snapshot loading and turns query results into reports.

use std::path::Path;

use crate::error::Error;
use crate::graph::{DanglingReport, GraphIndex, GraphSnapshot, Module, ModuleId};
use crate::loader;
use crate::query::{self, ModuleDetails, RankOptions, SearchOptions};
use crate::report::{DetailsReport, RankReport, SearchReport, TreeNodeReport, TreeReport};
use crate::tree::{self, SortKey};
use crate::walker;

/// Options for the folder tree view.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOptions {
    /// Show this module's closure instead of the whole snapshot.
    pub module: Option<ModuleId>,
    pub sort: SortKey,
    /// Only show modules bound to `module`.
    pub bound_only: bool,
}

/// An open snapshot session.
pub struct Session {
    index: GraphIndex,
}

impl Session {
    /// Load a snapshot file and index it.
    ///
    /// Dangling references are logged once and otherwise tolerated.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let snapshot = loader::load_snapshot(path)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let index = GraphIndex::new(snapshot);
        let dangling = index.dangling_references();
        if dangling.total() > 0 {
            tracing::warn!(
                missing_dependencies = dangling.missing_dependencies,
                missing_targets = dangling.missing_targets,
                missing_importers = dangling.missing_importers,
                missing_concatenated = dangling.missing_concatenated,
                "snapshot has {} dangling reference{}; they will be skipped",
                dangling.total(),
                if dangling.total() == 1 { "" } else { "s" },
            );
        }
        tracing::debug!(
            modules = index.module_count(),
            dependencies = index.dependency_count(),
            "indexed snapshot"
        );
        Self { index }
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn module_details(&self, id: ModuleId) -> Result<ModuleDetails, Error> {
        query::module_details(&self.index, id)
    }

    pub fn details_report(&self, id: ModuleId) -> Result<DetailsReport, Error> {
        let details = self.module_details(id)?;
        DetailsReport::new(&self.index, &details).ok_or(Error::ModuleNotFound(id))
    }

    /// Build the folder tree for the whole snapshot or for one module's
    /// closure, optionally narrowed to its bound modules.
    pub fn tree(&self, opts: &TreeOptions) -> Result<TreeReport, Error> {
        let ids: Vec<ModuleId> = match (opts.module, opts.bound_only) {
            (None, true) => return Err(Error::BoundOnlyRequiresModule),
            (None, false) => self.index.modules().map(|m| m.id).collect(),
            (Some(root), false) => walker::closure(&self.index, root)?.iter().collect(),
            (Some(root), true) => query::classify(&self.index, root)?.bound,
        };
        let modules: Vec<&Module> = ids.iter().filter_map(|&id| self.index.module(id)).collect();
        let total_size_bytes = modules.iter().map(|m| m.source_size).sum();
        let nodes = tree::build_view(modules.iter().copied(), opts.sort);

        Ok(TreeReport {
            root: opts.module,
            sort: opts.sort,
            bound_only: opts.bound_only,
            module_count: modules.len(),
            total_size_bytes,
            nodes: nodes.iter().map(TreeNodeReport::new).collect(),
        })
    }

    pub fn rank(&self, opts: &RankOptions) -> RankReport {
        let ranks = query::rank(&self.index, opts);
        RankReport::new(&self.index, &ranks)
    }

    /// Find modules by path substring, optionally within one chunk.
    pub fn search(&self, opts: &SearchOptions) -> SearchReport {
        let found = query::search(&self.index, opts);
        SearchReport::new(&opts.name, opts.chunk.as_deref(), &found)
    }

    pub fn dangling_references(&self) -> DanglingReport {
        self.index.dangling_references()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// entry -> app -> shared, entry -> vendor/lib -> shared, other -> vendor/lib
    fn session() -> (Session, [ModuleId; 5]) {
        let mut s = GraphSnapshot::new();
        let entry = s.add_module("src/entry.js", 1);
        let app = s.add_module("src/app.js", 20);
        let lib = s.add_module("node_modules/lib/index.js", 300);
        let shared = s.add_module("src/shared.js", 4);
        let other = s.add_module("src/other.js", 50);
        s.add_dependency(entry, app);
        s.add_dependency(app, shared);
        s.add_dependency(entry, lib);
        s.add_dependency(lib, shared);
        s.add_dependency(other, lib);
        (Session::from_snapshot(s), [entry, app, lib, shared, other])
    }

    #[test]
    fn tree_without_module_covers_whole_snapshot() {
        let (session, _) = session();
        let report = session.tree(&TreeOptions::default()).unwrap();
        assert_eq!(report.module_count, 5);
        assert_eq!(report.total_size_bytes, 375);
        assert_eq!(report.root, None);
    }

    #[test]
    fn tree_for_module_uses_closure_including_root() {
        let (session, [entry, ..]) = session();
        let opts = TreeOptions {
            module: Some(entry),
            ..TreeOptions::default()
        };
        let report = session.tree(&opts).unwrap();
        assert_eq!(report.module_count, 4);
        assert_eq!(report.total_size_bytes, 325);
    }

    #[test]
    fn bound_only_tree_drops_shared_modules() {
        let (session, [entry, ..]) = session();
        let opts = TreeOptions {
            module: Some(entry),
            bound_only: true,
            sort: SortKey::Size,
        };
        let report = session.tree(&opts).unwrap();
        // lib is imported by `other`, so lib and shared are both tainted
        assert_eq!(report.module_count, 1);
        assert_eq!(report.total_size_bytes, 20);
        assert_eq!(report.nodes[0].name, "src (20 B)");
    }

    #[test]
    fn bound_only_without_module_is_rejected() {
        let (session, _) = session();
        let opts = TreeOptions {
            bound_only: true,
            ..TreeOptions::default()
        };
        assert!(matches!(
            session.tree(&opts),
            Err(Error::BoundOnlyRequiresModule)
        ));
    }

    #[test]
    fn unknown_module_is_not_found_everywhere() {
        let (session, _) = session();
        let missing = ModuleId(404);
        assert!(session.module_details(missing).is_err());
        assert!(session.details_report(missing).is_err());
        let opts = TreeOptions {
            module: Some(missing),
            ..TreeOptions::default()
        };
        assert!(matches!(
            session.tree(&opts),
            Err(Error::ModuleNotFound(ModuleId(404)))
        ));
    }

    #[test]
    fn rank_report_lists_heaviest_first() {
        let (session, [entry, app, ..]) = session();
        let report = session.rank(&RankOptions { top_n: 2 });
        assert_eq!(report.total_modules, 5);
        assert_eq!(report.modules.len(), 2);
        assert_eq!(report.modules[0].id, entry);
        assert_eq!(report.modules[0].bound_size_bytes, 20);
        assert_eq!(report.modules[1].id, app);
    }

    #[test]
    fn search_finds_modules_without_classifying() {
        let (session, [_, app, ..]) = session();
        let report = session.search(&SearchOptions {
            name: "APP".to_string(),
            chunk: None,
        });
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].id, app);
        assert_eq!(report.modules[0].size_bytes, 20);
    }
}
