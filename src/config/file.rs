//! Configuration file loading and discovery.
//!
//! Configuration is layered: built-in defaults (or a named preset), then a
//! discovered YAML file, then CLI flags (which clap also reads from `SBOM_*`
//! environment variables).

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".sbom-analyzer.yaml",
    ".sbom-analyzer.yml",
    "sbom-analyzer.yaml",
    "sbom-analyzer.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-analyzer/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_config_in_dir(&config_dir.join("sbom-analyzer")) {
            return Some(path);
        }
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
///
/// Sections and fields missing from the file keep their defaults.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# sbom-analyzer configuration
# Place this file at .sbom-analyzer.yaml in your project root or ~/.config/sbom-analyzer/

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# sbom-analyzer Configuration File
# ================================
#
# Place it at:
#   - .sbom-analyzer.yaml in your project root
#   - ~/.config/sbom-analyzer/sbom-analyzer.yaml for global config
#
# CLI arguments override file settings. --fuzzy-threshold and --max-nodes
# also read SBOM_FUZZY_THRESHOLD and SBOM_MAX_NODES.

# Dependency graph limits
graph:
  # Nodes include declared packages and unresolved references
  max_nodes: 250000
  max_edges: 1000000

# Analyzer settings
analysis:
  # Completeness score weights (need not sum to 100)
  completeness:
    version: 20.0
    licenses: 20.0
    supplier: 10.0
    description: 15.0
    purl: 10.0
    checksums: 5.0
    document: 20.0
  # Recommend review when more distinct licenses than this are present
  license_diversity_threshold: 10
  # Recommend flattening when the tree is deeper than this
  deep_tree_threshold: 5
  # Recommend triage when more HIGH vulnerabilities than this are present
  high_vulnerability_threshold: 5

# Verifier scoring
verification:
  issue_penalty: 10.0
  warning_penalty: 2.0

# Package lookup
lookup:
  # Minimum similarity (0.0-1.0) for a fuzzy match
  fuzzy_threshold: 0.6
  # Minimum similarity for a 'did you mean' hint
  suggestion_floor: 0.4

# Input limits
input:
  # Bytes (100 MiB)
  max_file_size: 104857600
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
