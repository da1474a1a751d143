//! SBOM analysis.
//!
//! Provides aggregate metrics over a document and its dependency tree:
//!
//! - **Distributions**: licenses (with an explicit `unlicensed` bucket),
//!   ecosystems and vulnerability severities (all five keys, always)
//! - **Depth statistics** taken from the [`DependencyTree`](crate::graph::DependencyTree)
//! - **Completeness score** (0-100), a weighted mean of field coverage
//! - **Recommendations** from fixed-order rules
//!
//! # Usage
//!
//! ```no_run
//! use sbom_analyzer::analysis::analyze;
//! use sbom_analyzer::graph::build_tree;
//! use sbom_analyzer::parsers::parse_sbom;
//! use std::path::Path;
//!
//! let sbom = parse_sbom(Path::new("sbom.json"), 100 * 1024 * 1024).unwrap();
//! let tree = build_tree(&sbom).unwrap();
//! let result = analyze(&sbom, &tree);
//!
//! println!("Completeness: {:.1}/100", result.completeness_score);
//! for rec in &result.recommendations {
//!     println!("- {}", rec.message);
//! }
//! ```

mod analyzer;
mod completeness;
mod recommendations;
mod statistics;

pub use analyzer::{analyze, AnalysisResult, Analyzer};
pub use completeness::{completeness_score, CompletenessBreakdown};
pub use recommendations::{Recommendation, RecommendationKind};
pub use statistics::{
    ecosystem_distribution, license_distribution, DepthStatistics, FieldCoverage,
    PackageStatistics, VulnerabilitySummary, UNKNOWN_ECOSYSTEM, UNLICENSED,
};
