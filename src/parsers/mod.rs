//! SBOM format parsers.
//!
//! This module provides parsers for SPDX, CycloneDX and SWID documents,
//! converting them to the canonical [`SbomData`] model.
//!
//! ## Format Detection
//!
//! Each parser inspects the raw text and may claim it with a
//! [`FormatConfidence`]; the strongest claim wins. A claim also records the
//! [`Encoding`] and, when visible, the spec version, so detection never needs
//! a trial parse.
//!
//! ```no_run
//! use sbom_analyzer::parsers::{detect_format, parse_sbom};
//! use std::path::Path;
//!
//! let sbom = parse_sbom(Path::new("sbom.json"), 100 * 1024 * 1024)?;
//!
//! let content = std::fs::read_to_string("sbom.json")?;
//! if let Some(found) = detect_format(&content) {
//!     println!("{} {} ({})", found.format, found.encoding, found.confidence);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cyclonedx;
mod detection;
mod spdx;
mod swid;
mod traits;

pub use cyclonedx::CycloneDxParser;
pub use detection::{Detection, FormatDetector, FAMILIES, MIN_CONFIDENCE};
pub use spdx::SpdxParser;
pub use swid::{SwidParser, SWID_SPEC_VERSION};
pub use traits::{Encoding, FormatConfidence, FormatMatch, ParseError, SbomParser};

use crate::model::{SbomData, SbomFormat};
use std::path::Path;

/// Family and encoding of a recognized document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedFormat {
    pub format: SbomFormat,
    pub encoding: Encoding,
    pub confidence: FormatConfidence,
    pub spec_version: Option<String>,
}

/// Recognize a document without parsing it
#[must_use]
pub fn detect_format(content: &str) -> Option<DetectedFormat> {
    match FormatDetector::new().detect(content) {
        Detection::Found { format, claim } => Some(DetectedFormat {
            format,
            encoding: claim.encoding,
            confidence: claim.confidence,
            spec_version: claim.spec_version,
        }),
        Detection::Unknown { .. } => None,
    }
}

/// Detect SBOM format from file content and parse accordingly
///
/// Files larger than `max_file_size` bytes are rejected before they are read.
pub fn parse_sbom(path: &Path, max_file_size: u64) -> Result<SbomData, ParseError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > max_file_size {
        return Err(ParseError::TooLarge {
            path: path.display().to_string(),
            size: metadata.len(),
            limit: max_file_size,
        });
    }
    let content = std::fs::read_to_string(path)?;

    tracing::info!(path = %path.display(), bytes = metadata.len(), "Parsing SBOM");
    let sbom = parse_sbom_str(&content)?;
    tracing::info!(
        path = %path.display(),
        format = %sbom.document.format,
        packages = sbom.package_count(),
        dependencies = sbom.dependencies().len(),
        "Parsed SBOM"
    );
    Ok(sbom)
}

/// Parse SBOM from string content
///
/// Uses confidence-based detection to select the best parser.
pub fn parse_sbom_str(content: &str) -> Result<SbomData, ParseError> {
    FormatDetector::new().parse_str(content)
}
