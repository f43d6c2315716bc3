//! Cycle-safe reachability over concatenation and dependency edges.
//!
//! All traversals share [`walk`]: an explicit-stack depth-first search whose
//! visited guard is supplied by the caller. The closure query owns a fresh
//! set; the taint pass in [`crate::query`] reuses one set across many starts
//! so that each module is expanded at most once per query.

use std::collections::HashSet;

use crate::error::Error;
use crate::graph::{GraphIndex, ModuleId};

/// The transitive reachability set of one root module, including the root.
#[derive(Debug, Clone)]
pub struct Closure {
    root: ModuleId,
    /// Members in depth-first discovery order; `order[0]` is the root.
    order: Vec<ModuleId>,
    members: HashSet<ModuleId>,
}

impl Closure {
    pub fn root(&self) -> ModuleId {
        self.root
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: a closure contains at least its root.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Members in discovery order, root first.
    pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.order.iter().copied()
    }

    pub fn members(&self) -> &HashSet<ModuleId> {
        &self.members
    }
}

/// Depth-first walk from `start` over concatenation edges, then dependency
/// edges, in declaration order.
///
/// `visit` is called once per popped module and returns whether the module
/// is new; modules it rejects are not expanded. References that do not
/// resolve inside `index` are skipped. Does nothing if `start` is unknown.
pub fn walk(index: &GraphIndex, start: ModuleId, mut visit: impl FnMut(ModuleId) -> bool) {
    if !index.contains(start) {
        return;
    }
    let mut stack = vec![start];
    while let Some(mid) = stack.pop() {
        if !visit(mid) {
            continue;
        }
        let Some(module) = index.module(mid) else {
            continue;
        };
        // Pushed in reverse so the first declared edge is popped first.
        stack.extend(
            module
                .dependency_ids
                .iter()
                .rev()
                .filter_map(|&dep| index.resolve_dependency(dep)),
        );
        stack.extend(
            module
                .concatenated_module_ids
                .iter()
                .rev()
                .copied()
                .filter(|&id| index.contains(id)),
        );
    }
}

/// Every module reachable from `root`, root included.
pub fn closure(index: &GraphIndex, root: ModuleId) -> Result<Closure, Error> {
    if !index.contains(root) {
        return Err(Error::ModuleNotFound(root));
    }
    let mut members = HashSet::new();
    let mut order = Vec::new();
    walk(index, root, |id| {
        let new = members.insert(id);
        if new {
            order.push(id);
        }
        new
    });
    Ok(Closure {
        root,
        order,
        members,
    })
}
