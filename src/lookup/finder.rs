//! Exact-then-fuzzy package resolution.

use super::similarity::name_similarity;
use crate::config::{LookupConfig, Validatable};
use crate::error::Result;
use crate::graph::{DependencyTree, NodeFlags};
use crate::model::{Package, PackageId, SbomData, Vulnerability};
use serde::{Deserialize, Serialize};

/// How a query was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// A package related to the one looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPackage {
    pub id: PackageId,
    pub name: String,
    pub version: Option<String>,
    /// Referenced by an edge but never declared
    pub unresolved: bool,
}

/// Everything known about one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub package: Package,
    pub match_kind: MatchKind,
    /// Name similarity to the query; 1.0 for exact matches
    pub score: f64,
    /// Direct dependencies
    pub dependencies: Vec<RelatedPackage>,
    /// Direct dependents
    pub dependents: Vec<RelatedPackage>,
    /// Number of packages that reach this one through any path
    pub transitive_dependents: usize,
    pub licenses: Vec<String>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub depth: Option<usize>,
    pub flags: NodeFlags,
}

/// Closest candidate offered when nothing matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: PackageId,
    pub name: String,
    pub score: f64,
}

/// Outcome of a lookup; a miss is a normal result, not an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LookupResult {
    Found(Box<PackageInfo>),
    NotFound {
        query: String,
        suggestion: Option<Suggestion>,
    },
}

impl LookupResult {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn info(&self) -> Option<&PackageInfo> {
        match self {
            Self::Found(info) => Some(info),
            Self::NotFound { .. } => None,
        }
    }
}

/// Resolves package names against one document and its tree
#[derive(Debug, Clone)]
pub struct PackageLookup<'a> {
    sbom: &'a SbomData,
    tree: &'a DependencyTree,
    config: LookupConfig,
}

impl<'a> PackageLookup<'a> {
    pub fn new(sbom: &'a SbomData, tree: &'a DependencyTree, config: LookupConfig) -> Result<Self> {
        config.ensure_valid()?;
        Ok(Self { sbom, tree, config })
    }

    /// Resolve `name`: case-insensitive exact match first, then the most
    /// similar name at or above the fuzzy threshold. Ties keep the package
    /// declared first.
    pub fn find(&self, name: &str) -> LookupResult {
        let query = name.trim();
        let folded = query.to_lowercase();
        if let Some(package) = self
            .sbom
            .packages()
            .iter()
            .find(|p| p.name.to_lowercase() == folded)
        {
            tracing::debug!(query, kind = "exact", "Package lookup");
            return LookupResult::Found(Box::new(self.info(package, MatchKind::Exact, 1.0)));
        }

        let mut best: Option<(&Package, f64)> = None;
        for package in self.sbom.packages() {
            let score = name_similarity(query, &package.name);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((package, score));
            }
        }

        match best {
            Some((package, score)) if score >= self.config.fuzzy_threshold => {
                tracing::debug!(query, kind = "fuzzy", matched = %package.name, score, "Package lookup");
                LookupResult::Found(Box::new(self.info(package, MatchKind::Fuzzy, score)))
            }
            best => {
                tracing::debug!(query, kind = "none", "Package lookup");
                LookupResult::NotFound {
                    query: query.to_string(),
                    suggestion: best
                        .filter(|(_, score)| *score >= self.config.suggestion_floor)
                        .map(|(package, score)| Suggestion {
                            id: package.id.clone(),
                            name: package.name.clone(),
                            score,
                        }),
                }
            }
        }
    }

    /// Packages whose name or description contains `term`, ignoring case
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&'a Package> {
        let needle = term.trim().to_lowercase();
        self.sbom
            .packages()
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// All packages in declaration order
    #[must_use]
    pub fn list(&self) -> &'a [Package] {
        self.sbom.packages()
    }

    fn related(&self, ids: &[PackageId]) -> Vec<RelatedPackage> {
        ids.iter()
            .map(|id| match self.tree.node(id) {
                Some(node) => RelatedPackage {
                    id: id.clone(),
                    name: node.name.clone(),
                    version: node.version.clone(),
                    unresolved: node.flags.unresolved,
                },
                None => RelatedPackage {
                    id: id.clone(),
                    name: id.to_string(),
                    version: None,
                    unresolved: true,
                },
            })
            .collect()
    }

    fn info(&self, package: &Package, match_kind: MatchKind, score: f64) -> PackageInfo {
        let node = self.tree.node(&package.id);
        PackageInfo {
            package: package.clone(),
            match_kind,
            score,
            dependencies: self.related(self.tree.children_of(&package.id)),
            dependents: self.related(self.tree.dependents_of(&package.id)),
            transitive_dependents: self.tree.transitive_dependent_count(&package.id),
            licenses: package
                .licenses
                .iter()
                .map(|l| l.identifier.clone())
                .collect(),
            vulnerabilities: self
                .sbom
                .vulnerabilities_for(&package.id)
                .cloned()
                .collect(),
            depth: node.map(|n| n.depth),
            flags: node.map(|n| n.flags).unwrap_or_default(),
        }
    }
}

/// Look up a package with the default thresholds
pub fn find(sbom: &SbomData, tree: &DependencyTree, name: &str) -> LookupResult {
    PackageLookup {
        sbom,
        tree,
        config: LookupConfig::default(),
    }
    .find(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tree;
    use crate::model::{Dependency, DocumentMetadata, License, SbomFormat, Severity};

    fn sbom() -> SbomData {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
        sbom.add_package(Package::new("app", "app")).unwrap();
        sbom.add_package(
            Package::new("flask", "Flask")
                .with_version("3.0.0")
                .with_license(License::new("BSD-3-Clause"))
                .with_description("A micro web framework"),
        )
        .unwrap();
        sbom.add_package(Package::new("werkzeug", "werkzeug")).unwrap();
        sbom.add_dependency(Dependency::depends_on("app", "flask"));
        sbom.add_dependency(Dependency::depends_on("flask", "werkzeug"));
        sbom.add_dependency(Dependency::depends_on("flask", "ghost"));
        sbom.add_vulnerability(Vulnerability::new("CVE-2023-30861", Severity::High, "flask"));
        sbom
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        let result = find(&sbom, &tree, "flask");
        let info = result.info().unwrap();
        assert_eq!(info.match_kind, MatchKind::Exact);
        assert_eq!(info.licenses, vec!["BSD-3-Clause".to_string()]);
        assert_eq!(info.vulnerabilities.len(), 1);
        assert_eq!(info.depth, Some(1));
        assert_eq!(info.transitive_dependents, 1);

        let deps: Vec<_> = info.dependencies.iter().map(|d| d.id.value()).collect();
        assert_eq!(deps, vec!["werkzeug", "ghost"]);
        assert!(info.dependencies[1].unresolved);
        assert_eq!(info.dependents[0].id.value(), "app");
    }

    #[test]
    fn test_exact_match_folds_unicode_case() {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"));
        sbom.add_package(Package::new("olpaket", "Olpaket")).unwrap();
        sbom.add_package(Package::new("oelpaket", "Ölpaket")).unwrap();
        let tree = build_tree(&sbom).unwrap();

        for query in ["ölpaket", "ÖLPAKET"] {
            let result = find(&sbom, &tree, query);
            let info = result.info().unwrap();
            assert_eq!(info.match_kind, MatchKind::Exact, "query {query}");
            assert_eq!(info.package.name, "Ölpaket");
            assert!((info.score - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_fuzzy_tie_keeps_first_declared() {
        let declared = |names: [&str; 2]| {
            let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"));
            for name in names {
                sbom.add_package(Package::new(name, name)).unwrap();
            }
            sbom
        };

        for (names, expected) in [(["foo-a", "foo-b"], "foo-a"), (["foo-b", "foo-a"], "foo-b")] {
            let sbom = declared(names);
            let tree = build_tree(&sbom).unwrap();
            assert!(
                (name_similarity("foo", "foo-a") - name_similarity("foo", "foo-b")).abs()
                    < f64::EPSILON
            );
            let result = find(&sbom, &tree, "foo");
            let info = result.info().unwrap();
            assert_eq!(info.match_kind, MatchKind::Fuzzy);
            assert_eq!(info.package.name, expected);
        }
    }

    #[test]
    fn test_fuzzy_match() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        let result = find(&sbom, &tree, "flsk");
        let info = result.info().unwrap();
        assert_eq!(info.match_kind, MatchKind::Fuzzy);
        assert_eq!(info.package.name, "Flask");
    }

    #[test]
    fn test_not_found_without_suggestion() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        match find(&sbom, &tree, "zzz-nonexistent") {
            LookupResult::NotFound { query, suggestion } => {
                assert_eq!(query, "zzz-nonexistent");
                assert!(suggestion.is_none());
            }
            LookupResult::Found(info) => panic!("unexpected match {}", info.package.name),
        }
    }

    #[test]
    fn test_below_threshold_suggests() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        let config = LookupConfig {
            fuzzy_threshold: 0.99,
            suggestion_floor: 0.4,
        };
        let lookup = PackageLookup::new(&sbom, &tree, config).unwrap();
        match lookup.find("flsk") {
            LookupResult::NotFound { suggestion, .. } => {
                assert_eq!(suggestion.map(|s| s.name), Some("Flask".to_string()));
            }
            LookupResult::Found(_) => panic!("fuzzy match should be below threshold"),
        }
    }

    #[test]
    fn test_search_and_list() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        let lookup = PackageLookup::new(&sbom, &tree, LookupConfig::default()).unwrap();
        let names: Vec<_> = lookup.search("WEB").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Flask"]);
        assert_eq!(lookup.list().len(), 3);
    }

    #[test]
    fn test_floor_above_threshold_rejected() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        let config = LookupConfig {
            fuzzy_threshold: 0.5,
            suggestion_floor: 0.7,
        };
        assert!(PackageLookup::new(&sbom, &tree, config).is_err());
    }
}
