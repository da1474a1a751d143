//! The dependency tree produced by [`GraphBuilder`](super::GraphBuilder).

use crate::model::PackageId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Width of one indentation segment in rendered trees
const PREFIX_WIDTH: usize = 4;

/// Per-node diagnostic flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    /// No depends-on edge targets this node (or the all-roots fallback applied)
    pub root: bool,
    /// Referenced by an edge but never declared as a package
    pub unresolved: bool,
    /// Declared more than once with the same identifier
    pub duplicate: bool,
    /// Unreachable from every root
    pub orphan: bool,
    /// Part of at least one reported cycle
    pub in_cycle: bool,
}

/// A node of the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: PackageId,
    /// Package name; the identifier itself for unresolved placeholders
    pub name: String,
    pub version: Option<String>,
    /// Shortest distance from any root; 0 for roots and orphans
    pub depth: usize,
    pub flags: NodeFlags,
    /// Direct dependencies, in edge declaration order
    pub dependencies: Vec<PackageId>,
    /// Direct dependents, in edge declaration order
    pub dependents: Vec<PackageId>,
}

impl TreeNode {
    /// `name@version`, or just the name
    #[must_use]
    pub fn label(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.name, v),
            None => self.name.clone(),
        }
    }
}

/// Which endpoint of a dependency record is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Non-fatal problems found while building the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphWarning {
    /// A dependency record lacks one endpoint and was skipped
    MissingEndpoint { index: usize, missing: Endpoint },
    /// A dependency record references an undeclared package
    DanglingReference { index: usize, id: PackageId },
    /// A package identifier is declared more than once
    DuplicatePackage { id: PackageId, count: usize },
    /// Every node has an inbound edge; all nodes were reported as roots
    NoRoots,
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEndpoint { index, missing } => {
                write!(f, "dependency #{index} has no {missing} and was skipped")
            }
            Self::DanglingReference { index, id } => {
                write!(f, "dependency #{index} references undeclared package '{id}'")
            }
            Self::DuplicatePackage { id, count } => {
                write!(f, "package '{id}' is declared {count} times")
            }
            Self::NoRoots => f.write_str("no package is free of inbound dependencies; every node is treated as a root"),
        }
    }
}

/// Read-only dependency graph with roots, depths and cycles.
///
/// Nodes are ordered by package declaration, followed by unresolved
/// placeholders in order of first reference. Every list in this type
/// follows that order, so two builds of the same document are identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyTree {
    pub(crate) nodes: Vec<TreeNode>,
    #[serde(skip)]
    pub(crate) index: HashMap<PackageId, usize>,
    pub(crate) roots: Vec<PackageId>,
    pub(crate) cycles: Vec<Vec<PackageId>>,
    pub(crate) max_depth: usize,
    pub(crate) total_edges: usize,
    pub(crate) warnings: Vec<GraphWarning>,
    pub(crate) roots_fallback: bool,
}

impl DependencyTree {
    /// All nodes in declaration order
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn node(&self, id: &PackageId) -> Option<&TreeNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    #[must_use]
    pub fn roots(&self) -> &[PackageId] {
        &self.roots
    }

    /// Cycles as ordered identifier paths; `[a, b]` means a -> b -> a
    #[must_use]
    pub fn cycles(&self) -> &[Vec<PackageId>] {
        &self.cycles
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of distinct depends-on edges
    #[must_use]
    pub const fn total_edges(&self) -> usize {
        self.total_edges
    }

    #[must_use]
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Whether the all-roots fallback applied
    #[must_use]
    pub const fn roots_fallback(&self) -> bool {
        self.roots_fallback
    }

    #[must_use]
    pub fn depth_of(&self, id: &PackageId) -> Option<usize> {
        self.node(id).map(|n| n.depth)
    }

    /// Direct dependencies of a node; empty for unknown identifiers
    #[must_use]
    pub fn children_of(&self, id: &PackageId) -> &[PackageId] {
        self.node(id).map_or(&[], |n| n.dependencies.as_slice())
    }

    /// Direct dependents of a node; empty for unknown identifiers
    #[must_use]
    pub fn dependents_of(&self, id: &PackageId) -> &[PackageId] {
        self.node(id).map_or(&[], |n| n.dependents.as_slice())
    }

    pub fn orphans(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| n.flags.orphan)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| n.flags.unresolved)
    }

    /// Number of packages that depend on `id` directly or transitively
    #[must_use]
    pub fn transitive_dependent_count(&self, id: &PackageId) -> usize {
        let Some(&start) = self.index.get(id) else {
            return 0;
        };
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for parent in &self.nodes[current].dependents {
                if let Some(&p) = self.index.get(parent) {
                    if seen.insert(p) {
                        queue.push_back(p);
                    }
                }
            }
        }
        seen.len() - 1
    }

    /// Render an ASCII tree from the roots.
    ///
    /// Already-expanded nodes are marked `(*)`, edges back into the current
    /// path `(cycle)`. Orphans are listed after the roots. `max_depth`
    /// limits expansion; `Some(0)` prints the roots only.
    #[must_use]
    pub fn render_text(&self, max_depth: Option<usize>) -> String {
        let mut out = String::new();
        let mut expanded = vec![false; self.nodes.len()];
        let mut on_path = vec![false; self.nodes.len()];

        let tops = self
            .roots
            .iter()
            .filter_map(|id| self.index.get(id).copied())
            .chain(
                self.nodes
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| n.flags.orphan)
                    .map(|(i, _)| i),
            );

        for top in tops {
            out.push_str(&self.node_line(top));
            if expanded[top] {
                out.push_str(" (*)\n");
                continue;
            }
            out.push('\n');
            expanded[top] = true;
            if max_depth == Some(0) {
                continue;
            }
            self.render_subtree(top, max_depth, &mut expanded, &mut on_path, &mut out);
        }
        out
    }

    /// Draw everything below `top`. `on_path` must be all false on entry and
    /// is all false again on return.
    fn render_subtree(
        &self,
        top: usize,
        max_depth: Option<usize>,
        expanded: &mut [bool],
        on_path: &mut [bool],
        out: &mut String,
    ) {
        // (node, next child); the stack is the current path
        let mut stack: Vec<(usize, usize)> = vec![(top, 0)];
        on_path[top] = true;
        // one 4-byte segment per level below `top`
        let mut prefix = String::new();

        while let Some(&(node, next)) = stack.last() {
            let children = &self.nodes[node].dependencies;
            let Some(child_id) = children.get(next) else {
                on_path[node] = false;
                stack.pop();
                prefix.truncate(prefix.len().saturating_sub(PREFIX_WIDTH));
                continue;
            };
            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }
            let Some(&child) = self.index.get(child_id) else {
                continue;
            };

            let is_last = next + 1 == children.len();
            out.push_str(&prefix);
            out.push_str(if is_last { "`-- " } else { "|-- " });
            out.push_str(&self.node_line(child));

            if on_path[child] {
                out.push_str(" (cycle)\n");
                continue;
            }
            if expanded[child] {
                out.push_str(" (*)\n");
                continue;
            }
            out.push('\n');

            if max_depth.map_or(false, |limit| stack.len() >= limit) {
                continue;
            }
            expanded[child] = true;
            on_path[child] = true;
            prefix.push_str(if is_last { "    " } else { "|   " });
            stack.push((child, 0));
        }
    }

    fn node_line(&self, idx: usize) -> String {
        let node = &self.nodes[idx];
        let mut line = node.label();
        if node.flags.unresolved {
            line.push_str(" [unresolved]");
        }
        if node.flags.orphan {
            line.push_str(" [orphan]");
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::build_tree;
    use crate::model::{Dependency, DocumentMetadata, Package, SbomData, SbomFormat};

    fn chain(len: usize, close_loop: bool) -> SbomData {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"));
        for i in 0..len {
            sbom.add_package(Package::new(format!("n{i}"), format!("n{i}")))
                .unwrap();
        }
        for i in 1..len {
            sbom.add_dependency(Dependency::depends_on(format!("n{}", i - 1), format!("n{i}")));
        }
        if close_loop {
            sbom.add_dependency(Dependency::depends_on(format!("n{}", len - 1), "n1"));
        }
        sbom
    }

    #[test]
    fn test_render_marks_back_edges_and_repeats() {
        let mut sbom = chain(3, true);
        sbom.add_package(Package::new("shared", "shared")).unwrap();
        sbom.add_dependency(Dependency::depends_on("n0", "shared"));
        sbom.add_dependency(Dependency::depends_on("n1", "shared"));
        let tree = build_tree(&sbom).unwrap();

        assert_eq!(
            tree.render_text(None),
            "n0\n\
             |-- n1\n\
             |   |-- n2\n\
             |   |   `-- n1 (cycle)\n\
             |   `-- shared\n\
             `-- shared (*)\n"
        );
    }

    #[test]
    fn test_render_deep_chain_indents_linearly() {
        let depth = 5_000;
        let tree = build_tree(&chain(depth, false)).unwrap();
        let rendered = tree.render_text(None);

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), depth);
        let last = lines[depth - 1];
        assert_eq!(last.len(), 4 * (depth - 2) + "`-- ".len() + format!("n{}", depth - 1).len());
        assert!(last.ends_with(&format!("`-- n{}", depth - 1)));
        assert!(!rendered.contains("(cycle)"));
    }

    #[test]
    fn test_render_depth_limit_then_full_render() {
        let tree = build_tree(&chain(4, false)).unwrap();
        assert_eq!(tree.render_text(Some(0)), "n0\n");
        assert_eq!(tree.render_text(Some(1)), "n0\n`-- n1\n");
        // state from one render never leaks into the next
        assert_eq!(tree.render_text(None).lines().count(), 4);
    }
}
