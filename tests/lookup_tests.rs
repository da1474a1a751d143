//! Integration tests for package lookup.

use sbom_analyzer::config::{AppConfig, ConfigPreset, LookupConfig};
use sbom_analyzer::graph::build_tree;
use sbom_analyzer::lookup::{find, LookupResult, MatchKind, PackageLookup};
use sbom_analyzer::model::{
    Dependency, DocumentMetadata, License, Package, SbomData, SbomFormat, Severity, Vulnerability,
};

/// shop -> flask -> {jinja2, werkzeug}, jinja2 -> markupsafe, flask -> ghost (undeclared)
fn sbom() -> SbomData {
    let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
    sbom.add_package(Package::new("SPDXRef-shop", "shop").with_version("2.0"))
        .unwrap();
    sbom.add_package(
        Package::new("SPDXRef-flask", "Flask")
            .with_version("2.0.1")
            .with_license(License::new("BSD-3-Clause"))
            .with_description("A simple framework for building complex web applications"),
    )
    .unwrap();
    sbom.add_package(Package::new("SPDXRef-jinja2", "Jinja2").with_version("3.1.2"))
        .unwrap();
    sbom.add_package(
        Package::new("SPDXRef-werkzeug", "Werkzeug")
            .with_version("2.3.7")
            .with_description("The comprehensive WSGI web application library"),
    )
    .unwrap();
    sbom.add_package(Package::new("SPDXRef-markupsafe", "MarkupSafe"))
        .unwrap();

    sbom.add_dependency(Dependency::depends_on("SPDXRef-shop", "SPDXRef-flask"));
    sbom.add_dependency(Dependency::depends_on("SPDXRef-flask", "SPDXRef-jinja2"));
    sbom.add_dependency(Dependency::depends_on("SPDXRef-flask", "SPDXRef-werkzeug"));
    sbom.add_dependency(Dependency::depends_on("SPDXRef-jinja2", "SPDXRef-markupsafe"));
    sbom.add_dependency(Dependency::depends_on("SPDXRef-flask", "SPDXRef-ghost"));
    sbom.add_vulnerability(Vulnerability::new(
        "CVE-2023-30861",
        Severity::High,
        "SPDXRef-flask",
    ));
    sbom
}

#[test]
fn test_exact_lookup_reports_neighbourhood() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();

    let LookupResult::Found(info) = find(&sbom, &tree, "FLASK") else {
        panic!("flask should be found");
    };
    assert_eq!(info.match_kind, MatchKind::Exact);
    assert!((info.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(info.depth, Some(1));
    assert_eq!(info.licenses, vec!["BSD-3-Clause"]);
    assert_eq!(info.vulnerabilities.len(), 1);

    let deps: Vec<&str> = info.dependencies.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(deps, vec!["Jinja2", "Werkzeug", "SPDXRef-ghost"]);
    assert!(info.dependencies[2].unresolved);

    let dependents: Vec<&str> = info.dependents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(dependents, vec!["shop"]);
}

#[test]
fn test_transitive_dependents() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();

    let info = find(&sbom, &tree, "markupsafe");
    let info = info.info().unwrap();
    // jinja2, flask, shop
    assert_eq!(info.transitive_dependents, 3);
    assert_eq!(info.depth, Some(3));
    assert!(info.dependencies.is_empty());
}

#[test]
fn test_misspelling_resolves_fuzzily() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();

    let result = find(&sbom, &tree, "werkzueg");
    let info = result.info().unwrap();
    assert_eq!(info.match_kind, MatchKind::Fuzzy);
    assert_eq!(info.package.name, "Werkzeug");
    assert!(info.score >= 0.6 && info.score < 1.0);
}

#[test]
fn test_threshold_turns_match_into_suggestion() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();
    let config = LookupConfig {
        fuzzy_threshold: 0.95,
        suggestion_floor: 0.4,
    };
    let lookup = PackageLookup::new(&sbom, &tree, config).unwrap();

    match lookup.find("flsk") {
        LookupResult::NotFound { query, suggestion } => {
            assert_eq!(query, "flsk");
            assert_eq!(suggestion.unwrap().name, "Flask");
        }
        LookupResult::Found(info) => panic!("unexpected match {}", info.package.name),
    }
}

#[test]
fn test_presets_are_accepted() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();
    for preset in ConfigPreset::all() {
        let config = AppConfig::from_preset(*preset).lookup;
        let lookup = PackageLookup::new(&sbom, &tree, config).unwrap();
        assert!(lookup.find("jinja2").is_found());
    }
}

#[test]
fn test_search_matches_descriptions() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();
    let lookup = PackageLookup::new(&sbom, &tree, LookupConfig::default()).unwrap();

    let names: Vec<&str> = lookup.search("WEB").iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Flask", "Werkzeug"]);
    assert!(lookup.search("nothing-like-this").is_empty());
    assert_eq!(lookup.list().len(), 5);
}

#[test]
fn test_not_found_serializes_with_tag() {
    let sbom = sbom();
    let tree = build_tree(&sbom).unwrap();

    let result = find(&sbom, &tree, "qqqqqqqqqqqq");
    assert!(!result.is_found());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["result"], "not_found");
    assert_eq!(json["query"], "qqqqqqqqqqqq");
}
