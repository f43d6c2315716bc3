//! Presentation layer: human-readable sizes, text output and JSON reports.
//!
//! The analysis core only deals in raw byte counts. Everything here turns its
//! results into something a terminal or another tool can consume.

use serde::Serialize;

use crate::graph::{DependencyId, GraphIndex, Module, ModuleId, ModuleKind};
use crate::query::{ModuleDetails, ModuleRank};
use crate::tree::{NodeKind, SortKey, TreeNode};

pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let b = bytes as f64;
    if bytes >= 1_000_000 {
        format!("{:.1} MB", b / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.0} KB", b / 1_000.0)
    } else {
        format!("{bytes} B")
    }
}

/// Group digits in threes: `1234567` becomes `1,234,567`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Tree label with its size annotation, e.g. `lodash (71 KB)`.
pub fn display_name(node: &TreeNode) -> String {
    format!("{} ({})", node.name(), format_size(node.size()))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn to_json_pretty<T: Serialize>(value: &T) -> String {
    // Report types hold only strings, numbers and sequences.
    serde_json::to_string_pretty(value).expect("report types always serialize")
}

// --- module details ---

#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub path: String,
    pub size_bytes: u64,
    pub kind: ModuleKind,
}

impl ModuleSummary {
    fn from_index(index: &GraphIndex, id: ModuleId) -> Option<Self> {
        index.module(id).map(|m| Self {
            id,
            path: m.path.clone(),
            size_bytes: m.source_size,
            kind: m.kind,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencySummary {
    pub id: DependencyId,
    pub target: Option<ModuleId>,
    /// Path of the target module, when it is in the snapshot.
    pub target_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetailsReport {
    pub module: ModuleSummary,
    pub dependencies: Vec<DependencySummary>,
    /// The full closure, root first.
    pub all_dependencies: Vec<ModuleSummary>,
    pub bound_dependencies: Vec<ModuleSummary>,
    pub unbound_dependencies: Vec<ModuleSummary>,
    pub bound_size_bytes: u64,
    pub bound_size: String,
    pub all_dependencies_size_bytes: u64,
    pub all_dependencies_size: String,
}

impl DetailsReport {
    pub fn new(index: &GraphIndex, details: &ModuleDetails) -> Option<Self> {
        let summaries = |ids: &mut dyn Iterator<Item = ModuleId>| -> Vec<ModuleSummary> {
            ids.filter_map(|id| ModuleSummary::from_index(index, id)).collect()
        };
        let c = &details.classification;
        Some(Self {
            module: ModuleSummary::from_index(index, details.module)?,
            dependencies: details
                .dependencies
                .iter()
                .map(|d| DependencySummary {
                    id: d.id,
                    target: d.target_module_id,
                    target_path: d
                        .target_module_id
                        .and_then(|t| index.module(t))
                        .map(|m| m.path.clone()),
                })
                .collect(),
            all_dependencies: summaries(&mut c.closure.iter()),
            bound_dependencies: summaries(&mut c.bound.iter().copied()),
            unbound_dependencies: summaries(&mut c.unbound.iter().copied()),
            bound_size_bytes: c.bound_size,
            bound_size: format_thousands(c.bound_size),
            all_dependencies_size_bytes: c.total_closure_size,
            all_dependencies_size: format_thousands(c.total_closure_size),
        })
    }

    pub fn to_json(&self) -> String {
        to_json_pretty(self)
    }

    pub fn print(&self) {
        println!("{} ({})", self.module.path, format_size(self.module.size_bytes));
        let bound = self.bound_dependencies.len();
        let all = self.all_dependencies.len().saturating_sub(1);
        println!(
            "Bound size: {} ({} bytes, {bound} module{})",
            format_size(self.bound_size_bytes),
            self.bound_size,
            plural(bound)
        );
        println!(
            "Total dependency size: {} ({} bytes, {all} module{})",
            format_size(self.all_dependencies_size_bytes),
            self.all_dependencies_size,
            plural(all)
        );
        println!();

        if !self.dependencies.is_empty() {
            println!("Direct dependencies:");
            for dep in &self.dependencies {
                match &dep.target_path {
                    Some(path) => println!("  -> {path}"),
                    None => println!("  -> (unresolved dependency {})", dep.id.0),
                }
            }
            println!();
        }

        for (label, modules) in [
            ("Bound modules (removed with this module):", &self.bound_dependencies),
            ("Shared modules (kept by other importers):", &self.unbound_dependencies),
        ] {
            if modules.is_empty() {
                continue;
            }
            println!("{label}");
            for m in modules {
                println!("  {:<55} {}", m.path, format_size(m.size_bytes));
            }
            println!();
        }
    }
}

// --- tree ---

#[derive(Debug, Clone, Serialize)]
pub struct TreeNodeReport {
    /// Module id, or -1 for folders.
    pub id: i64,
    /// Label with size annotation.
    pub name: String,
    pub size_bytes: u64,
    pub path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chunk_ids: Vec<String>,
    /// Members inlined into a concatenated module.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub concatenated_module_ids: Vec<ModuleId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeReport>,
}

impl TreeNodeReport {
    pub fn new(node: &TreeNode) -> Self {
        Self {
            id: node.id(),
            name: display_name(node),
            size_bytes: node.size(),
            path: node.resource_path().to_string(),
            kind: node.kind(),
            chunk_ids: node.chunk_ids().to_vec(),
            concatenated_module_ids: node.concatenated_module_ids().to_vec(),
            children: node.children().iter().map(Self::new).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TreeReport {
    /// Module whose closure the tree shows; `None` for the whole snapshot.
    pub root: Option<ModuleId>,
    pub sort: SortKey,
    pub bound_only: bool,
    pub module_count: usize,
    pub total_size_bytes: u64,
    pub nodes: Vec<TreeNodeReport>,
}

impl TreeReport {
    pub fn to_json(&self) -> String {
        to_json_pretty(self)
    }

    pub fn print(&self) {
        let scope = match (self.root, self.bound_only) {
            (None, _) => "all modules".to_string(),
            (Some(id), false) => format!("dependencies of module {id}"),
            (Some(id), true) => format!("bound dependencies of module {id}"),
        };
        println!(
            "{} module{} ({scope}), total size {}",
            self.module_count,
            plural(self.module_count),
            format_size(self.total_size_bytes)
        );
        println!();
        print_nodes(&self.nodes, 1);
    }
}

fn print_nodes(nodes: &[TreeNodeReport], depth: usize) {
    for node in nodes {
        println!("{:indent$}{}", "", node.name, indent = depth * 2);
        print_nodes(&node.children, depth + 1);
    }
}

// --- rank ---

#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    pub id: ModuleId,
    pub path: String,
    pub own_size_bytes: u64,
    pub bound_size_bytes: u64,
    pub bound_module_count: usize,
    pub closure_size_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct RankReport {
    pub total_modules: usize,
    pub modules: Vec<RankEntry>,
}

impl RankReport {
    pub fn new(index: &GraphIndex, ranks: &[ModuleRank]) -> Self {
        Self {
            total_modules: index.module_count(),
            modules: ranks
                .iter()
                .map(|r| RankEntry {
                    id: r.module_id,
                    path: index
                        .module(r.module_id)
                        .map(|m| m.path.clone())
                        .unwrap_or_default(),
                    own_size_bytes: r.own_size,
                    bound_size_bytes: r.bound_size,
                    bound_module_count: r.bound_count,
                    closure_size_bytes: r.total_closure_size,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> String {
        to_json_pretty(self)
    }

    pub fn print(&self) {
        if self.modules.is_empty() {
            println!("No modules in snapshot.");
            return;
        }
        println!("Modules (sorted by bound size):");
        for entry in &self.modules {
            println!(
                "  {:>6}  {:<55} {:>8}  ({} module{})",
                entry.id.0,
                entry.path,
                format_size(entry.bound_size_bytes),
                entry.bound_module_count,
                plural(entry.bound_module_count)
            );
        }
        if self.total_modules > self.modules.len() {
            println!(
                "  ... and {} more modules",
                self.total_modules - self.modules.len()
            );
        }
    }
}

// --- search ---

#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    pub id: ModuleId,
    pub path: String,
    pub size_bytes: u64,
    pub chunk_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub name: String,
    pub chunk: Option<String>,
    pub modules: Vec<SearchEntry>,
}

impl SearchReport {
    pub fn new(name: &str, chunk: Option<&str>, found: &[&Module]) -> Self {
        Self {
            name: name.to_string(),
            chunk: chunk.map(str::to_string),
            modules: found
                .iter()
                .map(|m| SearchEntry {
                    id: m.id,
                    path: m.path.clone(),
                    size_bytes: m.source_size,
                    chunk_ids: m.chunk_ids.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> String {
        to_json_pretty(self)
    }

    pub fn print(&self) {
        if self.modules.is_empty() {
            match &self.chunk {
                Some(chunk) => println!("No modules matching '{}' in chunk '{chunk}'.", self.name),
                None => println!("No modules matching '{}'.", self.name),
            }
            return;
        }
        for entry in &self.modules {
            println!(
                "  {:>6}  {:<55} {:>8}  [{}]",
                entry.id.0,
                entry.path,
                format_size(entry.size_bytes),
                entry.chunk_ids.join(", ")
            );
        }
        println!(
            "{} module{}",
            self.modules.len(),
            plural(self.modules.len())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphSnapshot;
    use crate::query;

    #[test]
    fn format_size_picks_decimal_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1_500), "2 KB");
        assert_eq!(format_size(2_500_000), "2.5 MB");
    }

    #[test]
    fn format_thousands_groups_digits() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn folder_display_name_carries_aggregate_size() {
        let mut s = GraphSnapshot::new();
        s.add_module("lib/a.js", 600);
        s.add_module("lib/b.js", 900);
        let tree = crate::tree::build_tree(&s.modules);
        assert_eq!(display_name(&tree[0]), "lib (2 KB)");
        assert_eq!(display_name(&tree[0].children()[0]), "a.js (600 B)");
    }

    #[test]
    fn details_report_formats_sizes_with_separators() {
        let mut s = GraphSnapshot::new();
        let root = s.add_module("src/root.js", 10);
        let big = s.add_module("src/big.js", 12_345);
        s.add_dependency(root, big);
        let index = GraphIndex::new(s);
        let details = query::module_details(&index, root).unwrap();
        let report = DetailsReport::new(&index, &details).unwrap();

        assert_eq!(report.bound_size, "12,345");
        assert_eq!(report.all_dependencies_size, "12,345");
        assert_eq!(report.all_dependencies.len(), 2);
        assert_eq!(report.dependencies[0].target_path.as_deref(), Some("src/big.js"));
    }

    #[test]
    fn tree_node_report_marks_folders_with_sentinel_id() {
        let mut s = GraphSnapshot::new();
        s.add_module("lib/a.js", 1);
        let tree = crate::tree::build_tree(&s.modules);
        let report = TreeNodeReport::new(&tree[0]);
        assert_eq!(report.id, -1);
        assert_eq!(report.kind, NodeKind::Folder);
        assert_eq!(report.children[0].id, 0);
        assert_eq!(report.children[0].path, "lib/a.js");
    }

    #[test]
    fn tree_node_report_carries_chunks_and_concatenated_members() {
        let mut s = GraphSnapshot::new();
        let host = s.add_module("src/host.js", 10);
        let inner = s.add_module("src/inner.js", 5);
        s.concatenate(host, inner);
        s.modules[0].chunk_ids = vec!["main".to_string()];
        let tree = crate::tree::build_tree(&s.modules);
        let report = TreeNodeReport::new(&tree[0]);

        assert!(report.chunk_ids.is_empty());
        let host_node = &report.children[0];
        assert_eq!(host_node.chunk_ids, vec!["main"]);
        assert_eq!(host_node.concatenated_module_ids, vec![inner]);

        let v = serde_json::to_value(&report).unwrap();
        assert!(v.get("chunk_ids").is_none());
        assert_eq!(v["children"][0]["concatenated_module_ids"][0], 1);
        assert!(v["children"][1].get("concatenated_module_ids").is_none());
    }

    #[test]
    fn search_report_lists_chunk_ids() {
        let mut s = GraphSnapshot::new();
        s.add_module("src/a.js", 1_500);
        s.modules[0].chunk_ids = vec!["main".to_string(), "admin".to_string()];
        let found: Vec<&Module> = s.modules.iter().collect();
        let report = SearchReport::new("a.js", Some("main"), &found);
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["chunk"], "main");
        assert_eq!(v["modules"][0]["size_bytes"], 1_500);
        assert_eq!(v["modules"][0]["chunk_ids"][1], "admin");
    }
}
