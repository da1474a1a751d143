//! The analyzer: aggregates statistics, scores and recommendations.

use super::completeness::CompletenessBreakdown;
use super::recommendations::{self, Recommendation, RuleInput};
use super::statistics::{
    ecosystem_distribution, license_distribution, DepthStatistics, PackageStatistics,
    VulnerabilitySummary, UNLICENSED,
};
use crate::config::{AnalysisConfig, Validatable};
use crate::error::Result;
use crate::graph::DependencyTree;
use crate::model::{SbomData, SbomFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Result of analyzing one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct AnalysisResult {
    pub document_name: Option<String>,
    pub format: SbomFormat,
    pub spec_version: String,
    /// xxh3 fingerprint of the normalized document, hex encoded
    pub content_hash: String,
    /// Declared packages, duplicates included
    pub total_packages: usize,
    /// Distinct package identifiers
    pub unique_packages: usize,
    /// Distinct license identifiers, sorted
    pub unique_licenses: Vec<String>,
    pub license_distribution: BTreeMap<String, usize>,
    pub ecosystem_distribution: BTreeMap<String, usize>,
    pub vulnerability_summary: VulnerabilitySummary,
    pub statistics: PackageStatistics,
    pub depth: DepthStatistics,
    /// 0-100
    pub completeness_score: f64,
    pub completeness: CompletenessBreakdown,
    pub recommendations: Vec<Recommendation>,
}

/// Computes [`AnalysisResult`]s with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer; invalid weights are rejected here, not per request
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.ensure_valid()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a document and its dependency tree
    pub fn analyze(&self, sbom: &SbomData, tree: &DependencyTree) -> AnalysisResult {
        let license_distribution = license_distribution(sbom);
        let unique_licenses: Vec<String> = license_distribution
            .keys()
            .filter(|k| k.as_str() != UNLICENSED)
            .cloned()
            .collect();
        let unique_packages = sbom
            .packages()
            .iter()
            .map(|p| &p.id)
            .collect::<HashSet<_>>()
            .len();

        let statistics = PackageStatistics::from_sbom(sbom, tree);
        let depth = DepthStatistics::from_tree(tree);
        let vulnerability_summary = VulnerabilitySummary::from_sbom(sbom);
        let completeness = CompletenessBreakdown::from_sbom(sbom);
        let completeness_score = completeness.score(&self.config.completeness);

        let recommendations = recommendations::generate(
            &RuleInput {
                packages: &statistics,
                depth: &depth,
                vulnerabilities: &vulnerability_summary,
                unique_license_count: unique_licenses.len(),
                duplicate_id_count: sbom.duplicate_ids().len(),
            },
            &self.config,
        );

        tracing::info!(
            packages = statistics.total,
            completeness = format_args!("{completeness_score:.1}"),
            recommendations = recommendations.len(),
            "Analyzed SBOM"
        );

        AnalysisResult {
            document_name: sbom.document.name.clone(),
            format: sbom.document.format,
            spec_version: sbom.document.spec_version.clone(),
            content_hash: format!("{:016x}", sbom.content_hash()),
            total_packages: statistics.total,
            unique_packages,
            unique_licenses,
            license_distribution,
            ecosystem_distribution: ecosystem_distribution(sbom),
            vulnerability_summary,
            statistics,
            depth,
            completeness_score,
            completeness,
            recommendations,
        }
    }
}

/// Analyze with the default configuration
pub fn analyze(sbom: &SbomData, tree: &DependencyTree) -> AnalysisResult {
    Analyzer::default().analyze(sbom, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompletenessWeights;
    use crate::graph::build_tree;
    use crate::model::{DocumentMetadata, License, Package, Severity};

    fn sbom() -> SbomData {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
        sbom.add_package(Package::new("a", "a").with_license(License::new("MIT")))
            .unwrap();
        sbom.add_package(Package::new("a", "a-again")).unwrap();
        sbom
    }

    #[test]
    fn test_unique_counts() {
        let sbom = sbom();
        let tree = build_tree(&sbom).unwrap();
        let result = analyze(&sbom, &tree);
        assert_eq!(result.total_packages, 2);
        assert_eq!(result.unique_packages, 1);
        assert_eq!(result.unique_licenses, vec!["MIT".to_string()]);
        assert_eq!(result.license_distribution.get(UNLICENSED), Some(&1));
        assert_eq!(result.vulnerability_summary.count(Severity::Unknown), 0);
        assert_eq!(result.content_hash.len(), 16);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let config = AnalysisConfig {
            completeness: CompletenessWeights {
                version: -1.0,
                ..CompletenessWeights::default()
            },
            ..AnalysisConfig::default()
        };
        assert!(Analyzer::new(config).unwrap_err().is_config());
    }
}
