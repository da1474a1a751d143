//! Completeness scoring.
//!
//! The score is a weighted mean of field-presence fractions:
//! `100 * sum(weight * fraction) / sum(weight)`. Every fraction can only grow
//! when a field is filled in, so the score never drops as data is added.

use crate::config::CompletenessWeights;
use crate::model::{DocumentMetadata, SbomData};
use serde::{Deserialize, Serialize};

/// Presence fractions (0.0-1.0) feeding the completeness score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletenessBreakdown {
    pub version: f64,
    pub licenses: f64,
    pub supplier: f64,
    pub description: f64,
    pub purl: f64,
    pub checksums: f64,
    pub document: f64,
}

impl CompletenessBreakdown {
    #[must_use]
    pub fn from_sbom(sbom: &SbomData) -> Self {
        let packages = sbom.packages();
        let total = packages.len();
        let fraction = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };
        let count = |pred: fn(&crate::model::Package) -> bool| packages.iter().filter(|p| pred(p)).count();

        Self {
            version: fraction(count(|p| p.has_version())),
            licenses: fraction(count(|p| p.has_license())),
            supplier: fraction(count(|p| p.has_supplier())),
            description: fraction(count(|p| p.has_description())),
            purl: fraction(count(|p| p.has_purl())),
            checksums: fraction(count(|p| !p.checksums.is_empty())),
            document: sbom.document.populated_fields() as f64
                / DocumentMetadata::REQUIRED_FIELDS as f64,
        }
    }

    /// Weighted score on a 0-100 scale
    #[must_use]
    pub fn score(&self, weights: &CompletenessWeights) -> f64 {
        let total = weights.total();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted = weights.version * self.version
            + weights.licenses * self.licenses
            + weights.supplier * self.supplier
            + weights.description * self.description
            + weights.purl * self.purl
            + weights.checksums * self.checksums
            + weights.document * self.document;
        (weighted / total * 100.0).clamp(0.0, 100.0)
    }
}

/// Completeness score (0-100) of a document
#[must_use]
pub fn completeness_score(sbom: &SbomData, weights: &CompletenessWeights) -> f64 {
    CompletenessBreakdown::from_sbom(sbom).score(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Checksum, Creator, HashAlgorithm, License, Package, SbomFormat};

    fn doc() -> SbomData {
        SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"))
    }

    #[test]
    fn test_empty_document_scores_zero() {
        assert!(completeness_score(&doc(), &CompletenessWeights::default()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fully_populated_scores_hundred() {
        let mut sbom = doc();
        sbom.document.name = Some("app".to_string());
        sbom.document.namespace = Some("https://example.com/app".to_string());
        sbom.document.created = Some(chrono::Utc::now());
        sbom.document.creators.push(Creator::tool("syft"));
        let mut pkg = Package::new("a", "a")
            .with_version("1.0")
            .with_license(License::new("MIT"))
            .with_supplier("ACME")
            .with_description("a package")
            .with_purl("pkg:npm/a@1.0");
        pkg.checksums.push(Checksum::new(HashAlgorithm::Sha256, "abc"));
        sbom.add_package(pkg).unwrap();

        let score = completeness_score(&sbom, &CompletenessWeights::default());
        assert!((score - 100.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_half_versions() {
        let mut sbom = doc();
        sbom.add_package(Package::new("a", "a").with_version("1")).unwrap();
        sbom.add_package(Package::new("b", "b")).unwrap();
        // version weight 20 of 100, half the packages
        let score = completeness_score(&sbom, &CompletenessWeights::default());
        assert!((score - 10.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let weights = CompletenessWeights {
            version: 0.0,
            licenses: 0.0,
            supplier: 0.0,
            description: 0.0,
            purl: 0.0,
            checksums: 0.0,
            document: 0.0,
        };
        assert!(completeness_score(&doc(), &weights).abs() < f64::EPSILON);
    }
}
