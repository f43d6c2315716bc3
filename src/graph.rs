//! Module graph data structures.
//!
//! A [`GraphSnapshot`] is the flat (modules, dependencies) pair a bundler
//! emits for one build. [`GraphIndex`] turns it into id-keyed lookup maps so
//! traversals can resolve edges in O(1). Modules reference each other through
//! two edge kinds: dependency edges (via [`Dependency`] records) and
//! concatenation edges (modules inlined into another at build time).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ModuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DependencyId(pub u32);

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ModuleKind {
    #[default]
    Normal,
    /// Synthetic module produced by scope hoisting; its members are listed
    /// in [`Module::concatenated_module_ids`].
    Concatenated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    /// Source path as the bundler reported it (either separator).
    pub path: String,
    pub source_size: u64,
    /// Outgoing dependency edges, in declaration order.
    #[serde(default)]
    pub dependency_ids: Vec<DependencyId>,
    /// Modules that import this one. Empty for entry modules.
    #[serde(default)]
    pub imported_by_module_ids: Vec<ModuleId>,
    /// Modules inlined into this one at build time.
    #[serde(default)]
    pub concatenated_module_ids: Vec<ModuleId>,
    #[serde(default)]
    pub chunk_ids: Vec<String>,
    #[serde(default)]
    pub kind: ModuleKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: DependencyId,
    #[serde(default)]
    pub origin_module_id: Option<ModuleId>,
    /// The module this dependency resolves to. `None` for unresolved requests.
    #[serde(default, alias = "originDependency")]
    pub target_module_id: Option<ModuleId>,
}

/// One immutable build snapshot, as loaded from a stats manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module. Ids are allocated densely from the module count, so
    /// only mix this with hand-assigned ids when they stay below it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_module(&mut self, path: impl Into<String>, source_size: u64) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module {
            id,
            path: path.into(),
            source_size,
            dependency_ids: Vec::new(),
            imported_by_module_ids: Vec::new(),
            concatenated_module_ids: Vec::new(),
            chunk_ids: Vec::new(),
            kind: ModuleKind::Normal,
        });
        id
    }

    /// Add a resolved dependency edge and record `from` as an importer of `to`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_dependency(&mut self, from: ModuleId, to: ModuleId) -> DependencyId {
        let id = DependencyId(self.dependencies.len() as u32);
        self.dependencies.push(Dependency {
            id,
            origin_module_id: Some(from),
            target_module_id: Some(to),
        });
        if let Some(m) = self.module_mut(from) {
            m.dependency_ids.push(id);
        }
        self.add_importer(to, from);
        id
    }

    /// Record `importer` as importing `module` without adding an edge, as
    /// bundlers do for importers filtered out of the snapshot's edge list.
    pub fn add_importer(&mut self, module: ModuleId, importer: ModuleId) {
        if let Some(m) = self.module_mut(module)
            && !m.imported_by_module_ids.contains(&importer)
        {
            m.imported_by_module_ids.push(importer);
        }
    }

    /// Mark `member` as inlined into `into`.
    pub fn concatenate(&mut self, into: ModuleId, member: ModuleId) {
        if let Some(m) = self.module_mut(into) {
            m.kind = ModuleKind::Concatenated;
            m.concatenated_module_ids.push(member);
        }
    }

    fn module_mut(&mut self, id: ModuleId) -> Option<&mut Module> {
        // Dense ids sit at their own position; fall back to a scan otherwise.
        let pos = match self.modules.get(id.0 as usize) {
            Some(m) if m.id == id => id.0 as usize,
            _ => self.modules.iter().position(|m| m.id == id)?,
        };
        self.modules.get_mut(pos)
    }
}

/// References that point at records missing from the snapshot.
///
/// None of these are errors: filtered snapshots routinely drop modules that
/// other modules still mention. Traversals skip them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DanglingReport {
    /// `dependency_ids` entries with no dependency record.
    pub missing_dependencies: usize,
    /// Dependency records whose target module is absent.
    pub missing_targets: usize,
    /// `imported_by_module_ids` entries with no module.
    pub missing_importers: usize,
    /// `concatenated_module_ids` entries with no module.
    pub missing_concatenated: usize,
}

impl DanglingReport {
    pub fn total(&self) -> usize {
        self.missing_dependencies
            + self.missing_targets
            + self.missing_importers
            + self.missing_concatenated
    }
}

/// Id-keyed lookup over a [`GraphSnapshot`].
///
/// Duplicate ids overwrite earlier records (last write wins) but keep the
/// position of their first occurrence in iteration order.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    modules: HashMap<ModuleId, Module>,
    dependencies: HashMap<DependencyId, Dependency>,
    /// Module ids in snapshot order, deduplicated.
    order: Vec<ModuleId>,
}

impl GraphIndex {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self::from_parts(snapshot.modules, snapshot.dependencies)
    }

    pub fn from_parts(modules: Vec<Module>, dependencies: Vec<Dependency>) -> Self {
        let mut module_map = HashMap::with_capacity(modules.len());
        let mut order = Vec::with_capacity(modules.len());
        for module in modules {
            let id = module.id;
            if module_map.insert(id, module).is_none() {
                order.push(id);
            }
        }
        let dependency_map = dependencies.into_iter().map(|d| (d.id, d)).collect();
        Self {
            modules: module_map,
            dependencies: dependency_map,
            order,
        }
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    pub fn dependency(&self, id: DependencyId) -> Option<&Dependency> {
        self.dependencies.get(&id)
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    /// Modules in snapshot order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.order.iter().filter_map(|id| self.modules.get(id))
    }

    pub fn module_count(&self) -> usize {
        self.order.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Resolve a dependency edge to its target, if both the record and the
    /// target module exist.
    pub fn resolve_dependency(&self, id: DependencyId) -> Option<ModuleId> {
        let target = self.dependencies.get(&id)?.target_module_id?;
        self.contains(target).then_some(target)
    }

    /// Count every reference that does not resolve inside this snapshot.
    pub fn dangling_references(&self) -> DanglingReport {
        let mut report = DanglingReport::default();
        for module in self.modules() {
            for &dep_id in &module.dependency_ids {
                match self.dependencies.get(&dep_id) {
                    None => report.missing_dependencies += 1,
                    Some(dep) => {
                        if dep.target_module_id.is_some_and(|t| !self.contains(t)) {
                            report.missing_targets += 1;
                        }
                    }
                }
            }
            report.missing_importers += module
                .imported_by_module_ids
                .iter()
                .filter(|&&id| !self.contains(id))
                .count();
            report.missing_concatenated += module
                .concatenated_module_ids
                .iter()
                .filter(|&&id| !self.contains(id))
                .count();
        }
        report
    }
}

impl From<GraphSnapshot> for GraphIndex {
    fn from(snapshot: GraphSnapshot) -> Self {
        Self::new(snapshot)
    }
}
