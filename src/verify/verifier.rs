use super::checks;
use super::result::VerificationResult;
use crate::config::{Validatable, VerificationConfig};
use crate::error::Result;
use crate::graph::DependencyTree;
use crate::model::SbomData;

/// Runs the checklist and scores the outcome
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerificationConfig,
}

impl Verifier {
    pub fn new(config: VerificationConfig) -> Result<Self> {
        config.ensure_valid()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Verify a document against its dependency tree.
    ///
    /// Every check runs even after a failure so the report is complete.
    pub fn verify(&self, sbom: &SbomData, tree: &DependencyTree) -> VerificationResult {
        let checks = checks::run_all(sbom, tree);
        let result = VerificationResult::new(
            sbom.document.format,
            sbom.document.spec_version.clone(),
            checks,
            self.config.issue_penalty,
            self.config.warning_penalty,
        );

        tracing::info!(
            status = %result.status,
            score = format_args!("{:.1}", result.score),
            issues = result.issues().count(),
            warnings = result.warnings().count(),
            "Verified SBOM"
        );
        for check in result.issues() {
            tracing::debug!(check = %check.id, "{}", check.message);
        }

        result
    }
}

/// Verify with the default penalties
pub fn verify(sbom: &SbomData, tree: &DependencyTree) -> VerificationResult {
    Verifier::default().verify(sbom, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tree;
    use crate::model::{
        Creator, Dependency, DocumentMetadata, License, Package, SbomFormat, Severity,
        Vulnerability,
    };
    use crate::verify::{CheckOutcome, VerificationStatus, CHECK_IDS};
    use chrono::Utc;

    fn complete_package(id: &str) -> Package {
        Package::new(id, id)
            .with_version("1.0.0")
            .with_license(License::new("MIT"))
            .with_supplier("Acme")
            .with_description("a package")
    }

    fn complete_sbom() -> SbomData {
        let mut document = DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3");
        document.name = Some("demo".to_string());
        document.created = Some(Utc::now());
        document.creators.push(Creator::tool("sbom-gen"));
        let mut sbom = SbomData::new(document);
        sbom.add_package(complete_package("app")).unwrap();
        sbom.add_package(complete_package("lib")).unwrap();
        sbom.add_dependency(Dependency::depends_on("app", "lib"));
        sbom
    }

    fn run(sbom: &SbomData) -> VerificationResult {
        verify(sbom, &build_tree(sbom).unwrap())
    }

    #[test]
    fn test_complete_document_is_valid() {
        let result = run(&complete_sbom());
        assert_eq!(result.status, VerificationStatus::Valid);
        assert!((result.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.passed, CHECK_IDS.len());
        let ids: Vec<_> = result.checks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, CHECK_IDS);
    }

    #[test]
    fn test_bad_spec_version_is_issue() {
        let mut sbom = complete_sbom();
        sbom.document.spec_version = "2.3".to_string();
        let result = run(&sbom);
        assert_eq!(result.status, VerificationStatus::Malformed);
        assert!(!result.is_valid());
        assert_eq!(
            result.check("spec-version").map(|c| c.outcome),
            Some(CheckOutcome::Issue)
        );
        assert!((result.score - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_version_is_warning() {
        let mut sbom = complete_sbom();
        sbom.add_package(Package::new("loose", "loose").with_license(License::new("MIT")))
            .unwrap();
        sbom.add_dependency(Dependency::depends_on("app", "loose"));
        let result = run(&sbom);
        assert_eq!(result.status, VerificationStatus::Incomplete);
        assert!(result.is_valid());
        let check = result.check("package-versions").unwrap();
        assert_eq!(check.outcome, CheckOutcome::Warning);
        assert_eq!(check.affected, vec!["loose".to_string()]);
    }

    #[test]
    fn test_dangling_edge_warns_unresolved() {
        let mut sbom = complete_sbom();
        sbom.add_dependency(Dependency::depends_on("lib", "ghost"));
        let result = run(&sbom);
        let check = result.check("unresolved-references").unwrap();
        assert_eq!(check.outcome, CheckOutcome::Warning);
        assert_eq!(check.affected, vec!["ghost".to_string()]);
    }

    #[test]
    fn test_undeclared_vulnerability_target_is_issue() {
        let mut sbom = complete_sbom();
        sbom.add_vulnerability(Vulnerability::new("CVE-2024-0001", Severity::High, "ghost"));
        let result = run(&sbom);
        assert_eq!(
            result.check("vulnerability-references").map(|c| c.outcome),
            Some(CheckOutcome::Issue)
        );
    }

    #[test]
    fn test_score_floors_at_zero() {
        let verifier = Verifier::new(VerificationConfig {
            issue_penalty: 60.0,
            warning_penalty: 2.0,
        })
        .unwrap();
        let mut sbom = complete_sbom();
        sbom.document.spec_version = "bogus".to_string();
        sbom.add_package(complete_package("app")).unwrap();
        let result = verifier.verify(&sbom, &build_tree(&sbom).unwrap());
        assert_eq!(result.issues().count(), 2);
        assert!(result.score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_document() {
        let sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"));
        let result = run(&sbom);
        assert_eq!(
            result.check("empty-document").map(|c| c.outcome),
            Some(CheckOutcome::Warning)
        );
        assert_eq!(
            result.check("spec-version").map(|c| c.outcome),
            Some(CheckOutcome::Pass)
        );
    }

    #[test]
    fn test_swid_version_prefix() {
        let sbom = SbomData::new(DocumentMetadata::new(
            SbomFormat::Swid,
            "ISO/IEC 19770-2:2015",
        ));
        let result = run(&sbom);
        assert_eq!(
            result.check("spec-version").map(|c| c.outcome),
            Some(CheckOutcome::Pass)
        );
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let config = VerificationConfig {
            issue_penalty: -1.0,
            warning_penalty: 2.0,
        };
        assert!(Verifier::new(config).unwrap_err().is_config());
    }
}
