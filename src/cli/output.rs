//! Shared plumbing for command handlers: output targets, formats, colors and
//! document loading.

use crate::config::AppConfig;
use crate::error::SbomError;
use crate::graph::{DependencyTree, GraphBuilder};
use crate::model::SbomData;
use crate::parsers::parse_sbom;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Process exit codes
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Verification found issues, or a score fell below `--min-score`
    pub const CHECK_FAILED: i32 = 1;
    /// Package lookup found nothing
    pub const NOT_FOUND: i32 = 2;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Output format for `analyze`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AnalyzeFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// Output format for `verify`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum VerifyFormat {
    #[default]
    Text,
    Json,
    Sarif,
}

/// Output format for `dep`, `check-pkg`, `search` and `list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewFormat {
    #[default]
    Text,
    Json,
}

/// Target for output - either stdout or a file
#[derive(Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Whether ANSI colors should be used given the flag and `NO_COLOR`
#[must_use]
pub fn should_use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var_os("NO_COLOR").is_none()
}

/// ANSI escape pair for text output; empty strings when colors are off
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    pub(crate) const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub(crate) const fn green(self) -> &'static str {
        if self.enabled { "\x1b[32m" } else { "" }
    }

    pub(crate) const fn yellow(self) -> &'static str {
        if self.enabled { "\x1b[33m" } else { "" }
    }

    pub(crate) const fn red(self) -> &'static str {
        if self.enabled { "\x1b[31m" } else { "" }
    }

    pub(crate) const fn bold(self) -> &'static str {
        if self.enabled { "\x1b[1m" } else { "" }
    }

    pub(crate) const fn reset(self) -> &'static str {
        if self.enabled { "\x1b[0m" } else { "" }
    }

    /// Green at or above 80, yellow at or above 50, red below
    pub(crate) const fn for_score(self, score: f64) -> &'static str {
        if score >= 80.0 {
            self.green()
        } else if score >= 50.0 {
            self.yellow()
        } else {
            self.red()
        }
    }
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
            Ok(())
        }
    }
}

/// A parsed document together with its dependency tree
#[derive(Debug)]
pub struct LoadedDocument {
    pub sbom: SbomData,
    pub tree: DependencyTree,
}

/// Parse `path` and build its dependency tree under the configured limits
pub fn load_document(path: &Path, config: &AppConfig) -> Result<LoadedDocument> {
    let sbom = parse_sbom(path, config.input.max_file_size)
        .map_err(|e| SbomError::parse(path.display().to_string(), e))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let tree = GraphBuilder::new(config.graph.clone())?
        .build(&sbom)
        .with_context(|| format!("Failed to build dependency graph for {}", path.display()))?;
    Ok(LoadedDocument { sbom, tree })
}

/// File name of `path` for report headers
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}
