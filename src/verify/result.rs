//! Verification result types.

use crate::model::SbomFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    /// Completeness gap in an otherwise well-formed document
    Warning,
    /// Correctness problem; the model cannot be fully trusted
    Issue,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Warning => f.write_str("warning"),
            Self::Issue => f.write_str("issue"),
        }
    }
}

/// Area a check covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    Format,
    Document,
    Packages,
    Dependencies,
    Vulnerabilities,
}

impl CheckCategory {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Format => "Format",
            Self::Document => "Document",
            Self::Packages => "Packages",
            Self::Dependencies => "Dependencies",
            Self::Vulnerabilities => "Vulnerabilities",
        }
    }
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Stable identifier, e.g. `duplicate-ids`
    pub id: String,
    pub category: CheckCategory,
    pub outcome: CheckOutcome,
    pub message: String,
    /// Identifiers of the packages, vulnerabilities or records involved
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub affected: Vec<String>,
}

/// Overall verdict on a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Every check passed
    Valid,
    /// Well-formed but missing optional data (warnings only)
    Incomplete,
    /// At least one structural issue
    Malformed,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Incomplete => f.write_str("incomplete"),
            Self::Malformed => f.write_str("malformed"),
        }
    }
}

/// Outcome of verifying one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct VerificationResult {
    pub format: SbomFormat,
    pub spec_version: String,
    pub status: VerificationStatus,
    /// 0-100
    pub score: f64,
    /// Number of checks that passed
    pub passed: usize,
    /// Every check, in evaluation order
    pub checks: Vec<CheckResult>,
}

impl VerificationResult {
    pub(crate) fn new(
        format: SbomFormat,
        spec_version: String,
        checks: Vec<CheckResult>,
        issue_penalty: f64,
        warning_penalty: f64,
    ) -> Self {
        let count = |outcome| checks.iter().filter(|c| c.outcome == outcome).count();
        let issues = count(CheckOutcome::Issue);
        let warnings = count(CheckOutcome::Warning);

        let status = if issues > 0 {
            VerificationStatus::Malformed
        } else if warnings > 0 {
            VerificationStatus::Incomplete
        } else {
            VerificationStatus::Valid
        };
        let penalty = issues as f64 * issue_penalty + warnings as f64 * warning_penalty;

        Self {
            format,
            spec_version,
            status,
            score: (100.0 - penalty).clamp(0.0, 100.0),
            passed: count(CheckOutcome::Pass),
            checks,
        }
    }

    /// No check reported an issue (warnings are allowed)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status != VerificationStatus::Malformed
    }

    pub fn issues(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.outcome == CheckOutcome::Issue)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.outcome == CheckOutcome::Warning)
    }

    #[must_use]
    pub fn check(&self, id: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.id == id)
    }
}
