//! Builds a [`DependencyTree`] from normalized SBOM data.

use super::cycles::find_cycles;
use super::tree::{DependencyTree, Endpoint, GraphWarning, NodeFlags, TreeNode};
use crate::config::{GraphConfig, Validatable};
use crate::error::{Result, SbomError};
use crate::model::{PackageId, SbomData};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

/// How many edges are processed between deadline checks
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// Dependency graph builder with a size cap and an optional deadline.
///
/// Malformed input degrades into flags and [`GraphWarning`]s. Only an edge
/// with neither endpoint ([`SbomError::Structural`]) and an exceeded cap or
/// deadline ([`SbomError::TooLarge`]) stop the build.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    config: GraphConfig,
    deadline: Option<Instant>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            config: GraphConfig::default(),
            deadline: None,
        }
    }
}

impl GraphBuilder {
    /// Create a builder from a validated configuration
    pub fn new(config: GraphConfig) -> Result<Self> {
        config.ensure_valid()?;
        Ok(Self {
            config,
            deadline: None,
        })
    }

    /// Fail with [`SbomError::TooLarge`] if the build is still running at `deadline`
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Build the dependency tree
    pub fn build(&self, sbom: &SbomData) -> Result<DependencyTree> {
        let mut graph = GraphState::default();

        for package in sbom.packages() {
            graph.declare(package.id.clone(), &package.name, package.version.as_deref());
        }
        for (id, count) in sbom.duplicate_ids() {
            graph.warnings.push(GraphWarning::DuplicatePackage { id, count });
        }
        self.check_nodes(graph.nodes.len())?;

        for (index, dep) in sbom.dependencies().iter().enumerate() {
            if index % DEADLINE_CHECK_INTERVAL == 0 {
                self.check_deadline()?;
            }

            let (source, target) = match (dep.source_id(), dep.target_id()) {
                (Some(s), Some(t)) => (s, t),
                (None, None) => {
                    return Err(SbomError::structural(
                        index,
                        "dependency has neither source nor target",
                    ));
                }
                (None, Some(_)) => {
                    graph.warnings.push(GraphWarning::MissingEndpoint {
                        index,
                        missing: Endpoint::Source,
                    });
                    continue;
                }
                (Some(_), None) => {
                    graph.warnings.push(GraphWarning::MissingEndpoint {
                        index,
                        missing: Endpoint::Target,
                    });
                    continue;
                }
            };
            if !dep.kind.is_dependency() {
                continue;
            }

            let from = graph.resolve(source, index);
            let to = graph.resolve(target, index);
            graph.connect(from, to);

            self.check_nodes(graph.nodes.len())?;
            if graph.edge_count > self.config.max_edges {
                return Err(SbomError::too_large(format!(
                    "more than {} dependency edges",
                    self.config.max_edges
                )));
            }
        }

        self.check_deadline()?;
        let tree = graph.finish();
        self.check_deadline()?;

        tracing::debug!(
            nodes = tree.node_count(),
            edges = tree.total_edges(),
            roots = tree.roots().len(),
            cycles = tree.cycles().len(),
            max_depth = tree.max_depth(),
            "Built dependency graph"
        );
        Ok(tree)
    }

    fn check_nodes(&self, count: usize) -> Result<()> {
        if count > self.config.max_nodes {
            return Err(SbomError::too_large(format!(
                "more than {} graph nodes",
                self.config.max_nodes
            )));
        }
        Ok(())
    }

    fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SbomError::too_large(
                "graph construction exceeded its deadline",
            )),
            _ => Ok(()),
        }
    }
}

/// Build a tree with the default size caps and no deadline
pub fn build_tree(sbom: &SbomData) -> Result<DependencyTree> {
    GraphBuilder::default().build(sbom)
}

// ============================================================================
// Index-based working state
// ============================================================================

#[derive(Default)]
struct GraphState {
    nodes: Vec<TreeNode>,
    index: HashMap<PackageId, usize>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
    edges: HashSet<(usize, usize)>,
    edge_count: usize,
    warnings: Vec<GraphWarning>,
}

impl GraphState {
    fn push_node(&mut self, id: PackageId, name: &str, version: Option<&str>, flags: NodeFlags) -> usize {
        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(TreeNode {
            id,
            name: name.to_string(),
            version: version.map(str::to_string),
            depth: 0,
            flags,
            dependencies: Vec::new(),
            dependents: Vec::new(),
        });
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        idx
    }

    /// Register a declared package; repeats only flag the first node
    fn declare(&mut self, id: PackageId, name: &str, version: Option<&str>) {
        if let Some(&idx) = self.index.get(&id) {
            self.nodes[idx].flags.duplicate = true;
            return;
        }
        self.push_node(id, name, version, NodeFlags::default());
    }

    /// Look up an edge endpoint, creating an unresolved placeholder on first sight
    fn resolve(&mut self, id: &PackageId, record: usize) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        self.warnings.push(GraphWarning::DanglingReference {
            index: record,
            id: id.clone(),
        });
        let flags = NodeFlags {
            unresolved: true,
            ..NodeFlags::default()
        };
        self.push_node(id.clone(), id.value(), None, flags)
    }

    fn connect(&mut self, from: usize, to: usize) {
        if self.edges.insert((from, to)) {
            self.children[from].push(to);
            self.parents[to].push(from);
            self.edge_count += 1;
        }
    }

    fn finish(mut self) -> DependencyTree {
        let mut roots: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.parents[i].is_empty())
            .collect();
        let roots_fallback = roots.is_empty() && !self.nodes.is_empty();
        if roots_fallback {
            roots = (0..self.nodes.len()).collect();
            self.warnings.push(GraphWarning::NoRoots);
        }

        let depths = shortest_depths(&self.children, &roots);
        let cycles = find_cycles(&self.children, roots.iter().copied().chain(0..self.nodes.len()));

        for &r in &roots {
            self.nodes[r].flags.root = true;
        }
        for cycle in &cycles {
            for &n in cycle {
                self.nodes[n].flags.in_cycle = true;
            }
        }
        let mut max_depth = 0;
        for (i, depth) in depths.iter().enumerate() {
            match depth {
                Some(d) => {
                    self.nodes[i].depth = *d;
                    max_depth = max_depth.max(*d);
                }
                None => self.nodes[i].flags.orphan = true,
            }
        }

        let ids: Vec<PackageId> = self.nodes.iter().map(|n| n.id.clone()).collect();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.dependencies = self.children[i].iter().map(|&c| ids[c].clone()).collect();
            node.dependents = self.parents[i].iter().map(|&p| ids[p].clone()).collect();
        }

        DependencyTree {
            roots: roots.iter().map(|&r| ids[r].clone()).collect(),
            cycles: cycles
                .into_iter()
                .map(|c| c.into_iter().map(|n| ids[n].clone()).collect())
                .collect(),
            nodes: self.nodes,
            index: self.index,
            max_depth,
            total_edges: self.edge_count,
            warnings: self.warnings,
            roots_fallback,
        }
    }
}

/// Multi-source BFS; `None` marks nodes no root reaches
fn shortest_depths(children: &[Vec<usize>], roots: &[usize]) -> Vec<Option<usize>> {
    let mut depths = vec![None; children.len()];
    let mut queue = VecDeque::new();
    for &r in roots {
        if depths[r].is_none() {
            depths[r] = Some(0);
            queue.push_back(r);
        }
    }
    while let Some(node) = queue.pop_front() {
        let next = depths[node].map_or(0, |d| d + 1);
        for &child in &children[node] {
            if depths[child].is_none() {
                depths[child] = Some(next);
                queue.push_back(child);
            }
        }
    }
    depths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dependency, DependencyKind, DocumentMetadata, Package, SbomFormat};

    fn sbom(packages: &[&str], edges: &[(&str, &str)]) -> SbomData {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
        for p in packages {
            sbom.add_package(Package::new(*p, *p)).unwrap();
        }
        for (s, t) in edges {
            sbom.add_dependency(Dependency::depends_on(*s, *t));
        }
        sbom
    }

    fn ids(list: &[PackageId]) -> Vec<&str> {
        list.iter().map(PackageId::value).collect()
    }

    #[test]
    fn test_roots_and_depths() {
        let tree = build_tree(&sbom(&["A", "B", "C"], &[("A", "B")])).unwrap();
        assert_eq!(ids(tree.roots()), vec!["A", "C"]);
        assert_eq!(tree.depth_of(&"A".into()), Some(0));
        assert_eq!(tree.depth_of(&"B".into()), Some(1));
        assert_eq!(tree.depth_of(&"C".into()), Some(0));
        assert_eq!(tree.max_depth(), 1);
        assert!(tree.cycles().is_empty());
    }

    #[test]
    fn test_shortest_path_depth() {
        // A -> B -> C -> D and A -> D
        let tree = build_tree(&sbom(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
        ))
        .unwrap();
        assert_eq!(tree.depth_of(&"D".into()), Some(1));
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_full_cycle_falls_back_to_all_roots() {
        let tree = build_tree(&sbom(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")])).unwrap();
        assert!(tree.roots_fallback());
        assert_eq!(ids(tree.roots()), vec!["A", "B", "C"]);
        assert!(tree.warnings().contains(&GraphWarning::NoRoots));
        assert_eq!(tree.cycles().len(), 1);
        assert_eq!(ids(&tree.cycles()[0]), vec!["A", "B", "C"]);
        assert!(tree.nodes().iter().all(|n| n.flags.in_cycle && !n.flags.orphan));
    }

    #[test]
    fn test_unreached_cycle_is_orphaned() {
        let tree = build_tree(&sbom(&["A", "B", "C"], &[("B", "C"), ("C", "B")])).unwrap();
        assert_eq!(ids(tree.roots()), vec!["A"]);
        let orphans: Vec<&str> = tree.orphans().map(|n| n.id.value()).collect();
        assert_eq!(orphans, vec!["B", "C"]);
        assert_eq!(tree.depth_of(&"B".into()), Some(0));
        assert_eq!(tree.cycles().len(), 1);
    }

    #[test]
    fn test_dangling_reference_becomes_unresolved() {
        let tree = build_tree(&sbom(&["A"], &[("A", "ghost")])).unwrap();
        let ghost = tree.node(&"ghost".into()).unwrap();
        assert!(ghost.flags.unresolved);
        assert_eq!(ghost.depth, 1);
        assert!(matches!(
            tree.warnings()[0],
            GraphWarning::DanglingReference { index: 0, .. }
        ));
    }

    #[test]
    fn test_missing_endpoint_is_skipped() {
        let mut data = sbom(&["A"], &[]);
        data.add_dependency(Dependency {
            source: Some("A".into()),
            target: None,
            kind: DependencyKind::DependsOn,
        });
        let tree = build_tree(&data).unwrap();
        assert_eq!(tree.total_edges(), 0);
        assert_eq!(
            tree.warnings(),
            &[GraphWarning::MissingEndpoint {
                index: 0,
                missing: Endpoint::Target
            }]
        );
    }

    #[test]
    fn test_edge_without_endpoints_is_structural() {
        let mut data = sbom(&["A", "B"], &[("A", "B")]);
        data.add_dependency(Dependency {
            source: None,
            target: Some(PackageId::new("  ")),
            kind: DependencyKind::DependsOn,
        });
        match build_tree(&data) {
            Err(SbomError::Structural { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicates_and_non_dependency_kinds() {
        let mut data = sbom(&["A", "B", "A"], &[("A", "B"), ("A", "B")]);
        data.add_dependency(Dependency::new("B", "A", DependencyKind::Contains));
        let tree = build_tree(&data).unwrap();

        assert_eq!(tree.node_count(), 2);
        assert!(tree.node(&"A".into()).unwrap().flags.duplicate);
        assert_eq!(tree.total_edges(), 1);
        assert_eq!(ids(tree.roots()), vec!["A"]);
        assert!(tree
            .warnings()
            .contains(&GraphWarning::DuplicatePackage { id: "A".into(), count: 2 }));
    }

    #[test]
    fn test_size_caps() {
        let data = sbom(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let small_nodes = GraphBuilder::new(GraphConfig {
            max_nodes: 2,
            max_edges: 10,
        })
        .unwrap();
        assert!(matches!(small_nodes.build(&data), Err(SbomError::TooLarge { .. })));

        let small_edges = GraphBuilder::new(GraphConfig {
            max_nodes: 10,
            max_edges: 1,
        })
        .unwrap();
        assert!(matches!(small_edges.build(&data), Err(SbomError::TooLarge { .. })));
    }

    #[test]
    fn test_expired_deadline() {
        let data = sbom(&["A"], &[]);
        let builder = GraphBuilder::default().with_deadline(Instant::now());
        assert!(matches!(builder.build(&data), Err(SbomError::TooLarge { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = GraphBuilder::new(GraphConfig {
            max_nodes: 0,
            max_edges: 10,
        })
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_transitive_dependents() {
        let tree = build_tree(&sbom(
            &["app", "web", "core", "util"],
            &[("app", "web"), ("web", "core"), ("app", "core"), ("core", "util")],
        ))
        .unwrap();
        assert_eq!(tree.transitive_dependent_count(&"util".into()), 3);
        assert_eq!(tree.transitive_dependent_count(&"app".into()), 0);
        assert_eq!(ids(tree.dependents_of(&"core".into())), vec!["web", "app"]);
    }

    #[test]
    fn test_render_text() {
        let tree = build_tree(&sbom(
            &["app", "web", "core"],
            &[("app", "web"), ("app", "core"), ("web", "core"), ("core", "web"), ("web", "gone")],
        ))
        .unwrap();
        insta::assert_snapshot!(tree.render_text(None), @r"
        app
        |-- web
        |   |-- core
        |   |   `-- web (cycle)
        |   `-- gone [unresolved]
        `-- core (*)
        ");
    }

    #[test]
    fn test_render_depth_limit() {
        let tree = build_tree(&sbom(&["a", "b", "c"], &[("a", "b"), ("b", "c")])).unwrap();
        assert_eq!(tree.render_text(Some(0)), "a\n");
        assert_eq!(tree.render_text(Some(1)), "a\n`-- b\n");
    }
}
