//! Configuration validation for sbom-analyzer.
//!
//! Components validate their configuration once, at construction, and refuse
//! to start with an invalid one.

use super::types::{
    AnalysisConfig, AppConfig, CompletenessWeights, GraphConfig, InputConfig, LookupConfig,
    VerificationConfig,
};
use crate::error::SbomError;

// ============================================================================
// Configuration Error
// ============================================================================

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validate and collapse every failure into one [`SbomError::Config`].
    fn ensure_valid(&self) -> Result<(), SbomError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(SbomError::config(joined))
        }
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.graph.validate());
        errors.extend(self.analysis.validate());
        errors.extend(self.verification.validate());
        errors.extend(self.lookup.validate());
        errors.extend(self.input.validate());
        errors
    }
}

impl Validatable for GraphConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_nodes == 0 {
            errors.push(ConfigError::new("graph.max_nodes", "must be greater than 0"));
        }
        if self.max_edges == 0 {
            errors.push(ConfigError::new("graph.max_edges", "must be greater than 0"));
        }
        errors
    }
}

impl Validatable for AnalysisConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.completeness.validate()
    }
}

impl Validatable for CompletenessWeights {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (name, weight) in self.named() {
            if !weight.is_finite() || weight < 0.0 {
                errors.push(ConfigError {
                    field: format!("analysis.completeness.{name}"),
                    message: format!("Weight must be a non-negative number, got {weight}"),
                });
            }
        }
        if errors.is_empty() && self.total() <= 0.0 {
            errors.push(ConfigError::new(
                "analysis.completeness",
                "At least one completeness weight must be positive",
            ));
        }
        errors
    }
}

impl Validatable for VerificationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("verification.issue_penalty", self.issue_penalty),
            ("verification.warning_penalty", self.warning_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(
                    field,
                    format!("Penalty must be a non-negative number, got {value}"),
                ));
            }
        }
        errors
    }
}

impl Validatable for LookupConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("lookup.fuzzy_threshold", self.fuzzy_threshold),
            ("lookup.suggestion_floor", self.suggestion_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(
                    field,
                    format!("Threshold must be between 0.0 and 1.0, got {value}"),
                ));
            }
        }
        if errors.is_empty() && self.suggestion_floor > self.fuzzy_threshold {
            errors.push(ConfigError::new(
                "lookup.suggestion_floor",
                format!(
                    "Suggestion floor {} is above the fuzzy threshold {}",
                    self.suggestion_floor, self.fuzzy_threshold
                ),
            ));
        }
        errors
    }
}

impl Validatable for InputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        if self.max_file_size == 0 {
            vec![ConfigError::new("input.max_file_size", "must be greater than 0")]
        } else {
            Vec::new()
        }
    }
}
