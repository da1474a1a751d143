//! Integration tests for dependency graph construction.

use sbom_analyzer::config::GraphConfig;
use sbom_analyzer::graph::{build_tree, GraphBuilder, GraphWarning};
use sbom_analyzer::model::{
    Dependency, DependencyKind, DocumentMetadata, Package, PackageId, SbomData, SbomFormat,
};
use sbom_analyzer::SbomError;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Helper to build an SBOM from package ids and depends-on edges
fn make_sbom(ids: &[&str], edges: &[(&str, &str)]) -> SbomData {
    let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"));
    for id in ids {
        sbom.add_package(Package::new(*id, *id)).unwrap();
    }
    for (from, to) in edges {
        sbom.add_dependency(Dependency::depends_on(*from, *to));
    }
    sbom
}

fn id(value: &str) -> PackageId {
    PackageId::new(value)
}

#[test]
fn test_triangle_reports_one_cycle() {
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
    let tree = build_tree(&sbom).unwrap();

    assert_eq!(tree.cycles().len(), 1);
    let members: BTreeSet<_> = tree.cycles()[0].iter().map(PackageId::value).collect();
    assert_eq!(members, BTreeSet::from(["A", "B", "C"]));
    assert!(tree.nodes().iter().all(|n| n.flags.in_cycle));
}

#[test]
fn test_chain_has_no_cycles() {
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let tree = build_tree(&sbom).unwrap();

    assert!(tree.cycles().is_empty());
    assert_eq!(tree.max_depth(), 2);
    assert_eq!(tree.depth_of(&id("C")), Some(2));
}

#[test]
fn test_roots_are_in_degree_zero() {
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "B")]);
    let tree = build_tree(&sbom).unwrap();

    assert_eq!(tree.roots(), &[id("A"), id("C")]);
    assert_eq!(tree.depth_of(&id("A")), Some(0));
    assert_eq!(tree.depth_of(&id("C")), Some(0));
    assert_eq!(tree.depth_of(&id("B")), Some(1));
}

#[test]
fn test_isolated_package_is_its_own_root() {
    let sbom = make_sbom(&["solo"], &[]);
    let tree = build_tree(&sbom).unwrap();

    assert_eq!(tree.roots(), &[id("solo")]);
    assert_eq!(tree.depth_of(&id("solo")), Some(0));
    assert!(!tree.roots_fallback());
}

#[test]
fn test_depth_is_shortest_path() {
    // A -> B -> C and A -> C: C sits at depth 1
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
    let tree = build_tree(&sbom).unwrap();
    assert_eq!(tree.depth_of(&id("C")), Some(1));
    assert_eq!(tree.max_depth(), 1);
}

#[test]
fn test_dangling_edge_creates_unresolved_node() {
    let sbom = make_sbom(&["A"], &[("A", "ghost")]);
    let tree = build_tree(&sbom).unwrap();

    let ghost = tree.node(&id("ghost")).unwrap();
    assert!(ghost.flags.unresolved);
    assert_eq!(ghost.depth, 1);
    assert_eq!(tree.unresolved().count(), 1);
    assert!(tree
        .warnings()
        .iter()
        .any(|w| matches!(w, GraphWarning::DanglingReference { index: 0, id } if id.value() == "ghost")));
}

#[test]
fn test_edge_without_endpoints_is_structural() {
    let mut sbom = make_sbom(&["A", "B"], &[("A", "B")]);
    sbom.add_dependency(Dependency {
        source: None,
        target: Some(id("  ")),
        kind: DependencyKind::DependsOn,
    });

    match build_tree(&sbom) {
        Err(SbomError::Structural { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected a structural error, got {other:?}"),
    }
}

#[test]
fn test_edge_with_one_endpoint_is_skipped() {
    let mut sbom = make_sbom(&["A", "B"], &[]);
    sbom.add_dependency(Dependency {
        source: Some(id("A")),
        target: None,
        kind: DependencyKind::DependsOn,
    });
    let tree = build_tree(&sbom).unwrap();

    assert_eq!(tree.total_edges(), 0);
    assert!(matches!(
        tree.warnings(),
        [GraphWarning::MissingEndpoint { index: 0, .. }]
    ));
}

#[test]
fn test_contains_edges_do_not_shape_the_graph() {
    let mut sbom = make_sbom(&["parent", "child"], &[]);
    sbom.add_dependency(Dependency::new("parent", "child", DependencyKind::Contains));
    let tree = build_tree(&sbom).unwrap();

    assert_eq!(tree.total_edges(), 0);
    assert_eq!(tree.roots().len(), 2);
}

#[test]
fn test_every_node_with_inbound_edge_falls_back_to_all_roots() {
    let sbom = make_sbom(&["A", "B"], &[("A", "B"), ("B", "A")]);
    let tree = build_tree(&sbom).unwrap();

    assert!(tree.roots_fallback());
    assert_eq!(tree.roots().len(), 2);
    assert!(tree.warnings().contains(&GraphWarning::NoRoots));
}

#[test]
fn test_duplicate_ids_are_flagged() {
    let sbom = make_sbom(&["A", "A", "B"], &[]);
    let tree = build_tree(&sbom).unwrap();

    assert_eq!(tree.node_count(), 2);
    assert!(tree.node(&id("A")).unwrap().flags.duplicate);
    assert!(tree
        .warnings()
        .contains(&GraphWarning::DuplicatePackage { id: id("A"), count: 2 }));
}

#[test]
fn test_unreachable_cycle_is_orphaned() {
    let sbom = make_sbom(&["root", "x", "y"], &[("x", "y"), ("y", "x")]);
    let tree = build_tree(&sbom).unwrap();

    let orphans: Vec<_> = tree.orphans().map(|n| n.id.value()).collect();
    assert_eq!(orphans, vec!["x", "y"]);
    assert_eq!(tree.cycles().len(), 1);
}

#[test]
fn test_node_cap_is_enforced() {
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "D")]);
    let builder = GraphBuilder::new(GraphConfig {
        max_nodes: 3,
        max_edges: 10,
    })
    .unwrap();

    assert!(matches!(builder.build(&sbom), Err(SbomError::TooLarge { .. })));
}

#[test]
fn test_edge_cap_is_enforced() {
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "B"), ("A", "C")]);
    let builder = GraphBuilder::new(GraphConfig {
        max_nodes: 10,
        max_edges: 1,
    })
    .unwrap();

    assert!(matches!(builder.build(&sbom), Err(SbomError::TooLarge { .. })));
}

#[test]
fn test_expired_deadline_fails() {
    let sbom = make_sbom(&["A"], &[]);
    let deadline = Instant::now()
        .checked_sub(Duration::from_secs(1))
        .unwrap_or_else(Instant::now);
    let builder = GraphBuilder::default().with_deadline(deadline);

    assert!(matches!(builder.build(&sbom), Err(SbomError::TooLarge { .. })));
}

#[test]
fn test_zero_node_cap_is_a_config_error() {
    let err = GraphBuilder::new(GraphConfig {
        max_nodes: 0,
        max_edges: 10,
    })
    .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let ids: Vec<String> = (0..50_000).map(|i| format!("p{i}")).collect();
    let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
    for id in &ids {
        sbom.add_package(Package::new(id.as_str(), id.as_str())).unwrap();
    }
    for pair in ids.windows(2) {
        sbom.add_dependency(Dependency::depends_on(pair[0].as_str(), pair[1].as_str()));
    }
    // close the loop so cycle detection walks the whole chain
    sbom.add_dependency(Dependency::depends_on("p49999", "p1"));

    let tree = build_tree(&sbom).unwrap();
    assert_eq!(tree.max_depth(), 49_999);
    assert_eq!(tree.cycles().len(), 1);
    assert_eq!(tree.cycles()[0].len(), 49_999);
}

#[test]
fn test_render_text_respects_max_depth() {
    let sbom = make_sbom(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let tree = build_tree(&sbom).unwrap();

    let shallow = tree.render_text(Some(1));
    assert!(shallow.contains('B'));
    assert!(!shallow.contains('C'));
    assert!(tree.render_text(None).contains('C'));
}
