//! Configuration types for sbom-analyzer.
//!
//! Every scoring weight and threshold used by the graph builder, analyzer,
//! verifier and package lookup lives here, so callers can override them
//! without code changes.

use super::defaults::{
    DEFAULT_DEEP_TREE_THRESHOLD, DEFAULT_FUZZY_THRESHOLD, DEFAULT_HIGH_VULN_THRESHOLD,
    DEFAULT_ISSUE_PENALTY, DEFAULT_LICENSE_DIVERSITY_THRESHOLD, DEFAULT_MAX_EDGES,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_NODES, DEFAULT_SUGGESTION_FLOOR, DEFAULT_WARNING_PENALTY,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration loaded from defaults, a config file
/// and CLI overrides (in that order of precedence, lowest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Dependency graph size caps
    pub graph: GraphConfig,
    /// Analyzer weights and recommendation thresholds
    pub analysis: AnalysisConfig,
    /// Verifier penalties
    pub verification: VerificationConfig,
    /// Package lookup thresholds
    pub lookup: LookupConfig,
    /// Input handling
    pub input: InputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the fuzzy-match acceptance threshold.
    pub const fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.config.lookup.fuzzy_threshold = threshold;
        self
    }

    /// Set the maximum number of graph nodes.
    pub const fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.config.graph.max_nodes = max_nodes;
        self
    }

    /// Set the maximum number of graph edges.
    pub const fn max_edges(mut self, max_edges: usize) -> Self {
        self.config.graph.max_edges = max_edges;
        self
    }

    /// Set the verifier penalties.
    pub const fn penalties(mut self, issue: f64, warning: f64) -> Self {
        self.config.verification.issue_penalty = issue;
        self.config.verification.warning_penalty = warning;
        self
    }

    /// Replace the completeness weights.
    pub const fn completeness_weights(mut self, weights: CompletenessWeights) -> Self {
        self.config.analysis.completeness = weights;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section types
// ============================================================================

/// Size caps for the dependency graph builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of nodes (declared plus unresolved)
    pub max_nodes: usize,
    /// Maximum number of depends-on edges
    pub max_edges: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_edges: DEFAULT_MAX_EDGES,
        }
    }
}

/// Analyzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Weights of the completeness score
    pub completeness: CompletenessWeights,
    /// Distinct license count above which license diversity is reported
    pub license_diversity_threshold: usize,
    /// Maximum depth above which the tree is reported as deep
    pub deep_tree_threshold: usize,
    /// High-severity vulnerability count above which a recommendation fires
    pub high_vulnerability_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            completeness: CompletenessWeights::default(),
            license_diversity_threshold: DEFAULT_LICENSE_DIVERSITY_THRESHOLD,
            deep_tree_threshold: DEFAULT_DEEP_TREE_THRESHOLD,
            high_vulnerability_threshold: DEFAULT_HIGH_VULN_THRESHOLD,
        }
    }
}

/// Weights for the completeness score.
///
/// Package weights apply to the fraction of packages carrying the field;
/// `document` applies to the fraction of required document metadata present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompletenessWeights {
    pub version: f64,
    pub licenses: f64,
    pub supplier: f64,
    pub description: f64,
    pub purl: f64,
    pub checksums: f64,
    pub document: f64,
}

impl CompletenessWeights {
    /// Sum of all weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.version
            + self.licenses
            + self.supplier
            + self.description
            + self.purl
            + self.checksums
            + self.document
    }

    pub(crate) fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("version", self.version),
            ("licenses", self.licenses),
            ("supplier", self.supplier),
            ("description", self.description),
            ("purl", self.purl),
            ("checksums", self.checksums),
            ("document", self.document),
        ]
    }
}

impl Default for CompletenessWeights {
    fn default() -> Self {
        Self {
            version: 20.0,
            licenses: 20.0,
            supplier: 10.0,
            description: 15.0,
            purl: 10.0,
            checksums: 5.0,
            document: 20.0,
        }
    }
}

/// Verifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VerificationConfig {
    /// Points deducted per failed issue-level check
    pub issue_penalty: f64,
    /// Points deducted per failed warning-level check
    pub warning_penalty: f64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            issue_penalty: DEFAULT_ISSUE_PENALTY,
            warning_penalty: DEFAULT_WARNING_PENALTY,
        }
    }
}

/// Package lookup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LookupConfig {
    /// Minimum similarity (0.0-1.0) for a fuzzy candidate to be returned as a match
    pub fuzzy_threshold: f64,
    /// Minimum similarity for a below-threshold candidate to be offered as a hint
    pub suggestion_floor: f64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            suggestion_floor: DEFAULT_SUGGESTION_FLOOR,
        }
    }
}

/// Input handling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InputConfig {
    /// Largest SBOM file accepted, in bytes
    pub max_file_size: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}
