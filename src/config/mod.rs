//! Configuration module for sbom-analyzer.
//!
//! This module provides:
//! - Typed configuration sections with defaults
//! - Validation, surfaced as [`SbomError::Config`](crate::SbomError::Config)
//! - Named presets
//! - YAML config file discovery and `SBOM_*` environment overrides
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_analyzer::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::from_preset(ConfigPreset::Strict);
//!
//! let config = AppConfig::builder()
//!     .fuzzy_threshold(0.75)
//!     .max_nodes(10_000)
//!     .build();
//!
//! use sbom_analyzer::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-analyzer.yaml` file in your project root or
//! `~/.config/sbom-analyzer/`:
//!
//! ```yaml
//! lookup:
//!   fuzzy_threshold: 0.75
//! verification:
//!   issue_penalty: 15
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, DEFAULT_FUZZY_THRESHOLD, DEFAULT_ISSUE_PENALTY, DEFAULT_MAX_EDGES,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_NODES, DEFAULT_SUGGESTION_FLOOR, DEFAULT_WARNING_PENALTY,
};
pub use types::{
    AnalysisConfig, AppConfig, AppConfigBuilder, CompletenessWeights, GraphConfig, InputConfig,
    LookupConfig, VerificationConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and autocomplete `.sbom-analyzer.yaml`.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
