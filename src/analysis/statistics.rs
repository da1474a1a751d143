//! Distribution and coverage metrics.

use crate::graph::DependencyTree;
use crate::model::{Package, SbomData, Severity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// License bucket for packages that declare no license
pub const UNLICENSED: &str = "unlicensed";

/// Ecosystem bucket for packages without a parseable PURL
pub const UNKNOWN_ECOSYSTEM: &str = "unknown";

/// Count and share of packages carrying a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub count: usize,
    /// Percentage of all packages (0-100)
    pub percent: f64,
}

impl FieldCoverage {
    fn of(count: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        Self { count, percent }
    }
}

/// Per-field coverage over the declared packages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageStatistics {
    pub total: usize,
    pub with_version: FieldCoverage,
    pub with_description: FieldCoverage,
    pub with_licenses: FieldCoverage,
    pub with_dependencies: FieldCoverage,
    pub with_vulnerabilities: FieldCoverage,
    pub with_supplier: FieldCoverage,
    pub with_purl: FieldCoverage,
}

impl PackageStatistics {
    #[must_use]
    pub fn from_sbom(sbom: &SbomData, tree: &DependencyTree) -> Self {
        let packages = sbom.packages();

        Self {
            total: packages.len(),
            with_version: coverage(packages, Package::has_version),
            with_description: coverage(packages, Package::has_description),
            with_licenses: coverage(packages, Package::has_license),
            with_dependencies: coverage(packages, |p| !tree.children_of(&p.id).is_empty()),
            with_vulnerabilities: coverage(packages, |p| {
                sbom.vulnerabilities_for(&p.id).next().is_some()
            }),
            with_supplier: coverage(packages, Package::has_supplier),
            with_purl: coverage(packages, Package::has_purl),
        }
    }

    /// Packages lacking a license
    #[must_use]
    pub const fn missing_licenses(&self) -> usize {
        self.total - self.with_licenses.count
    }

    /// Packages lacking a version
    #[must_use]
    pub const fn missing_versions(&self) -> usize {
        self.total - self.with_version.count
    }
}

fn coverage(packages: &[Package], pred: impl Fn(&Package) -> bool) -> FieldCoverage {
    FieldCoverage::of(packages.iter().filter(|p| pred(p)).count(), packages.len())
}

/// License identifier -> number of packages declaring it.
///
/// Packages with no license count towards [`UNLICENSED`].
#[must_use]
pub fn license_distribution(sbom: &SbomData) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for package in sbom.packages() {
        if package.licenses.is_empty() {
            *distribution.entry(UNLICENSED.to_string()).or_insert(0) += 1;
            continue;
        }
        let ids: BTreeSet<&str> = package
            .licenses
            .iter()
            .map(|l| l.identifier.as_str())
            .collect();
        for id in ids {
            *distribution.entry(id.to_string()).or_insert(0) += 1;
        }
    }
    distribution
}

/// PURL type -> number of packages
#[must_use]
pub fn ecosystem_distribution(sbom: &SbomData) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for package in sbom.packages() {
        let ecosystem = package
            .ecosystem()
            .unwrap_or_else(|| UNKNOWN_ECOSYSTEM.to_string());
        *distribution.entry(ecosystem).or_insert(0) += 1;
    }
    distribution
}

/// Vulnerability counts keyed by every severity level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilitySummary {
    pub total: usize,
    /// Always holds all five severities, most severe first
    pub by_severity: IndexMap<Severity, usize>,
}

impl VulnerabilitySummary {
    #[must_use]
    pub fn from_sbom(sbom: &SbomData) -> Self {
        let mut by_severity: IndexMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for vuln in sbom.vulnerabilities() {
            *by_severity.entry(vuln.severity).or_insert(0) += 1;
        }
        Self {
            total: sbom.vulnerabilities().len(),
            by_severity,
        }
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Depth metrics taken from the dependency tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthStatistics {
    pub root_count: usize,
    pub max_depth: usize,
    /// Mean depth over nodes reachable from a root
    pub average_depth: f64,
    pub total_edges: usize,
    /// Depth -> number of reachable nodes at that depth
    pub distribution: BTreeMap<usize, usize>,
    pub orphan_count: usize,
    pub cycle_count: usize,
    pub unresolved_count: usize,
    pub roots_fallback: bool,
}

impl DepthStatistics {
    #[must_use]
    pub fn from_tree(tree: &DependencyTree) -> Self {
        let mut distribution = BTreeMap::new();
        let mut depth_sum = 0usize;
        let mut reachable = 0usize;
        for node in tree.nodes().iter().filter(|n| !n.flags.orphan) {
            *distribution.entry(node.depth).or_insert(0) += 1;
            depth_sum += node.depth;
            reachable += 1;
        }
        let average_depth = if reachable == 0 {
            0.0
        } else {
            depth_sum as f64 / reachable as f64
        };

        Self {
            root_count: tree.roots().len(),
            max_depth: tree.max_depth(),
            average_depth,
            total_edges: tree.total_edges(),
            distribution,
            orphan_count: tree.orphans().count(),
            cycle_count: tree.cycles().len(),
            unresolved_count: tree.unresolved().count(),
            roots_fallback: tree.roots_fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tree;
    use crate::model::{Dependency, DocumentMetadata, License, SbomFormat, Vulnerability};

    fn sample() -> SbomData {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"));
        sbom.add_package(
            Package::new("a", "a")
                .with_license(License::new("MIT"))
                .with_license(License::new("Apache-2.0"))
                .with_purl("pkg:npm/a@1.0.0"),
        )
        .unwrap();
        sbom.add_package(Package::new("b", "b").with_license(License::new("MIT")))
            .unwrap();
        sbom.add_package(Package::new("c", "c").with_version("1.0")).unwrap();
        sbom.add_dependency(Dependency::depends_on("a", "b"));
        sbom.add_vulnerability(Vulnerability::new("CVE-1", Severity::High, "b"));
        sbom
    }

    #[test]
    fn test_license_distribution_has_unlicensed_bucket() {
        let dist = license_distribution(&sample());
        assert_eq!(dist.get("MIT"), Some(&2));
        assert_eq!(dist.get("Apache-2.0"), Some(&1));
        assert_eq!(dist.get(UNLICENSED), Some(&1));
    }

    #[test]
    fn test_ecosystems() {
        let dist = ecosystem_distribution(&sample());
        assert_eq!(dist.get("npm"), Some(&1));
        assert_eq!(dist.get(UNKNOWN_ECOSYSTEM), Some(&2));
    }

    #[test]
    fn test_vulnerability_summary_keys() {
        let summary = VulnerabilitySummary::from_sbom(&sample());
        assert_eq!(summary.by_severity.len(), 5);
        assert_eq!(summary.count(Severity::High), 1);
        assert_eq!(summary.count(Severity::Critical), 0);
        let keys: Vec<Severity> = summary.by_severity.keys().copied().collect();
        assert_eq!(keys, Severity::ALL.to_vec());
    }

    #[test]
    fn test_package_statistics() {
        let sbom = sample();
        let tree = build_tree(&sbom).unwrap();
        let stats = PackageStatistics::from_sbom(&sbom, &tree);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.with_licenses.count, 2);
        assert_eq!(stats.missing_versions(), 2);
        assert_eq!(stats.with_dependencies.count, 1);
        assert_eq!(stats.with_vulnerabilities.count, 1);
        assert!((stats.with_purl.percent - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_statistics() {
        let sbom = sample();
        let tree = build_tree(&sbom).unwrap();
        let depth = DepthStatistics::from_tree(&tree);
        assert_eq!(depth.root_count, 2);
        assert_eq!(depth.max_depth, 1);
        assert_eq!(depth.distribution.get(&0), Some(&2));
        assert_eq!(depth.distribution.get(&1), Some(&1));
        assert!((depth.average_depth - 1.0 / 3.0).abs() < 1e-9);
    }
}
