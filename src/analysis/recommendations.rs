//! Deterministic recommendation rules.
//!
//! Rules run in the order of [`RecommendationKind::ALL`]; each fires at most
//! once per analysis. A document without packages gets only the
//! empty-document recommendation.

use super::statistics::{DepthStatistics, PackageStatistics, VulnerabilitySummary};
use crate::config::AnalysisConfig;
use crate::model::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition a recommendation reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RecommendationKind {
    EmptyDocument,
    MissingLicenses,
    MissingVersions,
    OrphanPackages,
    Cycles,
    UnresolvedReferences,
    DuplicateIdentifiers,
    CriticalVulnerabilities,
    HighVulnerabilities,
    LicenseDiversity,
    DeepTree,
}

impl RecommendationKind {
    /// Evaluation order; priorities never decrease along it
    pub const ALL: [Self; 11] = [
        Self::EmptyDocument,
        Self::MissingLicenses,
        Self::MissingVersions,
        Self::OrphanPackages,
        Self::Cycles,
        Self::UnresolvedReferences,
        Self::DuplicateIdentifiers,
        Self::CriticalVulnerabilities,
        Self::HighVulnerabilities,
        Self::LicenseDiversity,
        Self::DeepTree,
    ];

    /// Priority (1 = highest, 3 = lowest), consistent with evaluation order
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::EmptyDocument | Self::MissingLicenses | Self::MissingVersions => 1,
            Self::OrphanPackages
            | Self::Cycles
            | Self::UnresolvedReferences
            | Self::DuplicateIdentifiers
            | Self::CriticalVulnerabilities
            | Self::HighVulnerabilities => 2,
            Self::LicenseDiversity | Self::DeepTree => 3,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EmptyDocument => "empty-document",
            Self::MissingLicenses => "missing-licenses",
            Self::MissingVersions => "missing-versions",
            Self::OrphanPackages => "orphan-packages",
            Self::Cycles => "cycles",
            Self::UnresolvedReferences => "unresolved-references",
            Self::DuplicateIdentifiers => "duplicate-identifiers",
            Self::CriticalVulnerabilities => "critical-vulnerabilities",
            Self::HighVulnerabilities => "high-vulnerabilities",
            Self::LicenseDiversity => "license-diversity",
            Self::DeepTree => "deep-tree",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single finding with advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    /// Priority (1 = highest, 3 = lowest)
    pub priority: u8,
    /// Human-readable message
    pub message: String,
    /// Number of packages, cycles or vulnerabilities involved
    pub affected_count: usize,
}

impl Recommendation {
    fn new(kind: RecommendationKind, affected_count: usize, message: String) -> Self {
        Self {
            kind,
            priority: kind.priority(),
            message,
            affected_count,
        }
    }
}

/// Everything the rules look at
pub(crate) struct RuleInput<'a> {
    pub packages: &'a PackageStatistics,
    pub depth: &'a DepthStatistics,
    pub vulnerabilities: &'a VulnerabilitySummary,
    pub unique_license_count: usize,
    pub duplicate_id_count: usize,
}

pub(crate) fn generate(input: &RuleInput<'_>, config: &AnalysisConfig) -> Vec<Recommendation> {
    if input.packages.total == 0 {
        return vec![Recommendation::new(
            RecommendationKind::EmptyDocument,
            0,
            "SBOM completeness is low: the document declares no packages; add package information"
                .to_string(),
        )];
    }
    RecommendationKind::ALL
        .into_iter()
        .filter_map(|kind| evaluate(kind, input, config))
        .collect()
}

fn evaluate(
    kind: RecommendationKind,
    input: &RuleInput<'_>,
    config: &AnalysisConfig,
) -> Option<Recommendation> {
    let total = input.packages.total;
    let (count, message) = match kind {
        RecommendationKind::EmptyDocument => return None,
        RecommendationKind::MissingLicenses => {
            let n = input.packages.missing_licenses();
            (n, format!("{n} of {total} packages have no license information; add license details"))
        }
        RecommendationKind::MissingVersions => {
            let n = input.packages.missing_versions();
            (n, format!("{n} of {total} packages have no version; add version information"))
        }
        RecommendationKind::OrphanPackages => {
            let n = input.depth.orphan_count;
            (n, format!("{n} packages are unreachable from any root; check their relationships"))
        }
        RecommendationKind::Cycles => {
            let n = input.depth.cycle_count;
            (n, format!("{n} circular dependencies found; consider breaking the cycles"))
        }
        RecommendationKind::UnresolvedReferences => {
            let n = input.depth.unresolved_count;
            (n, format!("{n} dependencies reference undeclared packages; declare them or fix the references"))
        }
        RecommendationKind::DuplicateIdentifiers => {
            let n = input.duplicate_id_count;
            (n, format!("{n} package identifiers are declared more than once; make identifiers unique"))
        }
        RecommendationKind::CriticalVulnerabilities => {
            let n = input.vulnerabilities.count(Severity::Critical);
            (n, format!("{n} critical vulnerabilities detected; immediate action required"))
        }
        RecommendationKind::HighVulnerabilities => {
            let n = input.vulnerabilities.count(Severity::High);
            if n <= config.high_vulnerability_threshold {
                return None;
            }
            (n, format!("{n} high-severity vulnerabilities; review the security posture"))
        }
        RecommendationKind::LicenseDiversity => {
            let n = input.unique_license_count;
            if n <= config.license_diversity_threshold {
                return None;
            }
            (n, format!("{n} distinct licenses in use; consider a license compliance review"))
        }
        RecommendationKind::DeepTree => {
            let n = input.depth.max_depth;
            if n <= config.deep_tree_threshold {
                return None;
            }
            (n, format!("dependency tree is {n} levels deep; consider flattening dependencies"))
        }
    };

    (count > 0).then(|| Recommendation::new(kind, count, message))
}
