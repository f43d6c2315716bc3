use std::collections::HashSet;

use rayon::prelude::*;

use crate::error::Error;
use crate::graph::{Dependency, GraphIndex, Module, ModuleId};
use crate::walker::{self, Closure};

/// Partition of a root module's closure into bound and unbound members.
#[derive(Debug, Clone)]
pub struct Classification {
    pub closure: Closure,
    /// Members reachable only through the root, in closure order. Excludes the root.
    pub bound: Vec<ModuleId>,
    /// Members shared with the rest of the graph, in closure order. Excludes the root.
    pub unbound: Vec<ModuleId>,
    /// Sum of `source_size` over `bound`.
    pub bound_size: u64,
    /// Sum of `source_size` over the closure, root excluded.
    pub total_closure_size: u64,
}

impl Classification {
    pub fn root(&self) -> ModuleId {
        self.closure.root()
    }
}

/// A module is exclusive to a closure when every importer that exists in
/// the snapshot is itself a closure member. No importers means exclusive.
fn is_exclusive(index: &GraphIndex, module: &Module, closure: &Closure) -> bool {
    module
        .imported_by_module_ids
        .iter()
        .filter(|&&importer| index.contains(importer))
        .all(|&importer| closure.contains(importer))
}

fn source_size(index: &GraphIndex, id: ModuleId) -> u64 {
    index.module(id).map_or(0, |m| m.source_size)
}

/// Compute the closure of `root` and split it into bound and unbound modules.
///
/// A member with an importer outside the closure is shared, and so is
/// everything reachable from it: its whole sub-closure is tainted even where
/// individual members would pass the exclusivity test. The tainted set doubles
/// as the visited set of every taint walk, so no module is expanded twice.
pub fn classify(index: &GraphIndex, root: ModuleId) -> Result<Classification, Error> {
    let closure = walker::closure(index, root)?;

    let mut tainted: HashSet<ModuleId> = HashSet::new();
    for mid in closure.iter().filter(|&mid| mid != root) {
        if tainted.contains(&mid) {
            continue;
        }
        let Some(module) = index.module(mid) else {
            continue;
        };
        if !is_exclusive(index, module, &closure) {
            walker::walk(index, mid, |id| tainted.insert(id));
        }
    }

    let (unbound, bound): (Vec<ModuleId>, Vec<ModuleId>) = closure
        .iter()
        .filter(|&mid| mid != root)
        .partition(|mid| tainted.contains(mid));

    let bound_size: u64 = bound.iter().map(|&mid| source_size(index, mid)).sum();
    let total_closure_size: u64 = closure
        .iter()
        .filter(|&mid| mid != root)
        .map(|mid| source_size(index, mid))
        .sum();

    tracing::debug!(
        root = %root,
        closure = closure.len(),
        bound = bound.len(),
        unbound = unbound.len(),
        bound_size,
        "classified module"
    );

    Ok(Classification {
        closure,
        bound,
        unbound,
        bound_size,
        total_closure_size,
    })
}

/// Everything the module details view shows for one module.
#[derive(Debug, Clone)]
pub struct ModuleDetails {
    pub module: ModuleId,
    /// Outgoing dependency records that exist in the snapshot, in declaration order.
    pub dependencies: Vec<Dependency>,
    pub classification: Classification,
}

pub fn module_details(index: &GraphIndex, id: ModuleId) -> Result<ModuleDetails, Error> {
    let module = index.module(id).ok_or(Error::ModuleNotFound(id))?;
    let dependencies = module
        .dependency_ids
        .iter()
        .filter_map(|&dep| index.dependency(dep).cloned())
        .collect();
    Ok(ModuleDetails {
        module: id,
        dependencies,
        classification: classify(index, id)?,
    })
}

/// Filters for [`search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Case-insensitive substring of the module path. Empty matches every module.
    pub name: String,
    /// Only keep modules emitted into this chunk.
    pub chunk: Option<String>,
}

/// Modules whose path contains `opts.name`, in snapshot order.
pub fn search<'a>(index: &'a GraphIndex, opts: &SearchOptions) -> Vec<&'a Module> {
    let needle = opts.name.to_lowercase();
    let found: Vec<&Module> = index
        .modules()
        .filter(|m| m.path.to_lowercase().contains(&needle))
        .filter(|m| {
            opts.chunk
                .as_ref()
                .is_none_or(|chunk| m.chunk_ids.contains(chunk))
        })
        .collect();
    tracing::debug!(name = %opts.name, chunk = ?opts.chunk, found = found.len(), "searched modules");
    found
}

pub struct RankOptions {
    /// Number of modules to keep (negative for all).
    pub top_n: i32,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self { top_n: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRank {
    pub module_id: ModuleId,
    pub own_size: u64,
    pub bound_size: u64,
    pub bound_count: usize,
    pub total_closure_size: u64,
}

/// Classify every module and order them by how much size removing each one
/// would free, heaviest first. Ties go to the lower id.
///
/// Each classification is an independent query over the shared read-only
/// index, so they run in parallel.
pub fn rank(index: &GraphIndex, opts: &RankOptions) -> Vec<ModuleRank> {
    let ids: Vec<ModuleId> = index.modules().map(|m| m.id).collect();
    let mut ranks: Vec<ModuleRank> = ids
        .par_iter()
        .filter_map(|&id| {
            let c = classify(index, id).ok()?;
            Some(ModuleRank {
                module_id: id,
                own_size: source_size(index, id),
                bound_size: c.bound_size,
                bound_count: c.bound.len(),
                total_closure_size: c.total_closure_size,
            })
        })
        .collect();

    ranks.sort_by(|a, b| {
        b.bound_size
            .cmp(&a.bound_size)
            .then_with(|| a.module_id.cmp(&b.module_id))
    });
    if let Ok(n) = usize::try_from(opts.top_n) {
        ranks.truncate(n);
    }
    ranks
}
