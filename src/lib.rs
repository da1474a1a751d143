//! **Dependency-graph, quality and verification analysis for Software Bills of Materials.**
//!
//! `sbom-analyzer` normalizes SPDX, CycloneDX and SWID documents into one
//! canonical model and answers four questions about them:
//!
//! - **What depends on what?** The [`graph`] module builds a
//!   [`DependencyTree`] with roots, shortest-path depths, cycles and
//!   unresolved references.
//! - **How complete is it?** The [`analysis`] module computes distributions,
//!   a weighted completeness score and prioritized recommendations.
//! - **Is it well-formed?** The [`verify`] module runs a fixed checklist and
//!   separates structural issues from completeness warnings.
//! - **Where is package X?** The [`lookup`] module resolves possibly
//!   misspelled names with exact-then-fuzzy matching.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`SbomData`], the format-independent document. Parsers
//!   produce it; every other component only reads it.
//! - **[`parsers`]**: format detection and the SPDX, CycloneDX and SWID
//!   parsers behind the [`SbomParser`] trait.
//! - **[`config`]**: weights and thresholds with documented defaults,
//!   presets and YAML config files.
//! - **[`cli`]**: command handlers used by the `sbom-analyzer` binary.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use sbom_analyzer::{analyze, build_tree, parse_sbom, verify};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sbom = parse_sbom(Path::new("bom.cdx.json"), 100 * 1024 * 1024)?;
//!     let tree = build_tree(&sbom)?;
//!
//!     let analysis = analyze(&sbom, &tree);
//!     println!("Completeness: {:.1}/100", analysis.completeness_score);
//!
//!     let verification = verify(&sbom, &tree);
//!     println!("Status: {} ({:.1}/100)", verification.status, verification.score);
//!
//!     print!("{}", tree.render_text(Some(3)));
//!     Ok(())
//! }
//! ```
//!
//! ### Looking up a package
//!
//! ```no_run
//! use std::path::Path;
//! use sbom_analyzer::lookup::{find, LookupResult};
//! use sbom_analyzer::{build_tree, parse_sbom};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sbom = parse_sbom(Path::new("app.spdx.json"), 100 * 1024 * 1024)?;
//!     let tree = build_tree(&sbom)?;
//!
//!     match find(&sbom, &tree, "reqests") {
//!         LookupResult::Found(info) => {
//!             println!("{} has {} direct dependents", info.package.name, info.dependents.len());
//!         }
//!         LookupResult::NotFound { query, suggestion } => {
//!             println!("{query} not found");
//!             if let Some(s) = suggestion {
//!                 println!("did you mean {}?", s.name);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Ratios and percentages over package counts
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod lookup;
pub mod model;
pub mod parsers;
pub mod verify;

// Re-export main types for convenience
pub use analysis::{analyze, AnalysisResult, Analyzer};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, ConfigPreset, Validatable};
pub use error::{ErrorContext, Result, SbomError};
pub use graph::{build_tree, DependencyTree, GraphBuilder};
pub use lookup::{LookupResult, PackageInfo, PackageLookup};
pub use model::{Dependency, DocumentMetadata, Package, PackageId, SbomData, SbomFormat};
pub use parsers::{parse_sbom, parse_sbom_str, FormatDetector, SbomParser};
pub use verify::{verify, VerificationResult, VerificationStatus, Verifier};
