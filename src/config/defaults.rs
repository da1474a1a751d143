//! Default values and named presets for sbom-analyzer.

use super::types::{AppConfig, LookupConfig, VerificationConfig};

/// Default fuzzy-match acceptance threshold.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;

/// Default minimum similarity for a "did you mean" hint.
pub const DEFAULT_SUGGESTION_FLOOR: f64 = 0.4;

/// Default verifier penalty per issue.
pub const DEFAULT_ISSUE_PENALTY: f64 = 10.0;

/// Default verifier penalty per warning.
pub const DEFAULT_WARNING_PENALTY: f64 = 2.0;

/// Default node cap for the dependency graph.
pub const DEFAULT_MAX_NODES: usize = 250_000;

/// Default edge cap for the dependency graph.
pub const DEFAULT_MAX_EDGES: usize = 1_000_000;

/// Default largest accepted SBOM file (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const DEFAULT_LICENSE_DIVERSITY_THRESHOLD: usize = 10;
pub const DEFAULT_DEEP_TREE_THRESHOLD: usize = 5;
pub const DEFAULT_HIGH_VULN_THRESHOLD: usize = 5;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Balanced settings suitable for most documents
    Default,
    /// Heavier penalties and a tighter fuzzy threshold
    Strict,
    /// Lighter penalties and a looser fuzzy threshold for messy documents
    Lenient,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "strict" => Some(Self::Strict),
            "lenient" | "permissive" | "loose" => Some(Self::Lenient),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Balanced weights and thresholds",
            Self::Strict => "Issues cost 20 points, warnings 5; fuzzy matches need 0.8 similarity",
            Self::Lenient => "Issues cost 5 points, warnings 1; fuzzy matches need 0.5 similarity",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Strict, Self::Lenient]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Strict => Self::strict_preset(),
            ConfigPreset::Lenient => Self::lenient_preset(),
        }
    }

    /// Strict preset for well-maintained documents.
    #[must_use]
    pub fn strict_preset() -> Self {
        Self {
            verification: VerificationConfig {
                issue_penalty: 20.0,
                warning_penalty: 5.0,
            },
            lookup: LookupConfig {
                fuzzy_threshold: 0.8,
                suggestion_floor: 0.5,
            },
            ..Self::default()
        }
    }

    /// Lenient preset for generated or partial documents.
    #[must_use]
    pub fn lenient_preset() -> Self {
        Self {
            verification: VerificationConfig {
                issue_penalty: 5.0,
                warning_penalty: 1.0,
            },
            lookup: LookupConfig {
                fuzzy_threshold: 0.5,
                suggestion_floor: 0.3,
            },
            ..Self::default()
        }
    }
}
