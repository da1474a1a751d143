//! SARIF 2.1.0 rendering of verification results.

use crate::verify::{CheckOutcome, CheckResult, VerificationResult};
use serde::Serialize;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";
const RULE_PREFIX: &str = "SBOM-VERIFY";

/// Build a SARIF report with one result per failed check
pub(crate) fn build_report(result: &VerificationResult, artifact_uri: &str) -> impl Serialize {
    let failed: Vec<&CheckResult> = result
        .checks
        .iter()
        .filter(|c| c.outcome != CheckOutcome::Pass)
        .collect();

    let rules = failed
        .iter()
        .map(|check| SarifRule {
            id: rule_id(check),
            name: check.id.clone(),
            short_description: SarifMessage {
                text: format!("{} check: {}", check.category.name(), check.id),
            },
            default_configuration: SarifConfiguration {
                level: SarifLevel::from(check.outcome),
            },
        })
        .collect();

    let results = failed
        .iter()
        .map(|check| SarifResult {
            rule_id: rule_id(check),
            level: SarifLevel::from(check.outcome),
            message: SarifMessage {
                text: check.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: Some(SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: artifact_uri.to_string(),
                    },
                }),
            }],
        })
        .collect();

    SarifReport {
        schema: SARIF_SCHEMA.to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://spdx.dev/".to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

fn rule_id(check: &CheckResult) -> String {
    format!("{RULE_PREFIX}-{}", check.id.to_uppercase())
}

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    information_uri: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifConfiguration {
    level: SarifLevel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: SarifLevel,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    physical_location: Option<SarifPhysicalLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum SarifLevel {
    Note,
    Warning,
    Error,
}

impl From<CheckOutcome> for SarifLevel {
    fn from(outcome: CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Issue => Self::Error,
            CheckOutcome::Warning => Self::Warning,
            CheckOutcome::Pass => Self::Note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tree;
    use crate::model::{DocumentMetadata, Package, SbomData, SbomFormat};
    use crate::verify::verify;

    #[test]
    fn test_failed_checks_become_results() {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "bogus"));
        sbom.add_package(Package::new("a", "a")).unwrap();
        let result = verify(&sbom, &build_tree(&sbom).unwrap());

        let value = serde_json::to_value(build_report(&result, "bom.json")).unwrap();
        assert_eq!(value["version"], "2.1.0");
        let results = value["runs"][0]["results"].as_array().unwrap();
        assert_eq!(
            results.len(),
            result.issues().count() + result.warnings().count()
        );
        assert_eq!(results[0]["ruleId"], "SBOM-VERIFY-SPEC-VERSION");
        assert_eq!(results[0]["level"], "error");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "bom.json"
        );
    }
}
