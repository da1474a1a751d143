//! The seam every SBOM family parser plugs into.
//!
//! Detection is a cheap look at the raw text (braces, markers, namespaces)
//! that yields a [`FormatMatch`]; parsing is the full normalization into
//! [`SbomData`]. Parsers never resolve references or judge completeness.

use crate::model::{SbomData, SbomFormat};
use std::fmt;
use thiserror::Error;

/// Why a document could not be normalized
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("cannot read input: {0}")]
    Io(String),

    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("invalid {format} document: {message}")]
    Structure { format: SbomFormat, message: String },

    #[error("unrecognized SBOM format: {0}")]
    UnknownFormat(String),

    #[error("{format} document lacks {field}")]
    MissingField {
        format: SbomFormat,
        field: &'static str,
    },

    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<quick_xml::DeError> for ParseError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Textual encoding a document is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Json,
    Xml,
    /// SPDX `Tag: value` lines
    TagValue,
}

impl Encoding {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::TagValue => "tag-value",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How sure a parser is that it owns a document, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatConfidence {
    /// Generic structure only
    Low,
    /// Format-specific fields without the identifying marker
    Medium,
    /// Identifying marker present
    High,
    /// Marker plus a second independent signal
    Certain,
}

impl FormatConfidence {
    /// Score in 0.0..=1.0 for reports
    #[must_use]
    pub const fn score(self) -> f32 {
        match self {
            Self::Low => 0.25,
            Self::Medium => 0.5,
            Self::High => 0.75,
            Self::Certain => 1.0,
        }
    }
}

impl fmt::Display for FormatConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.score() * 100.0)
    }
}

/// A parser's claim on a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatMatch {
    pub confidence: FormatConfidence,
    pub encoding: Encoding,
    /// Version read from the document, without any family prefix
    pub spec_version: Option<String>,
    /// Why the claim is weaker than it could be
    pub note: Option<&'static str>,
}

impl FormatMatch {
    #[must_use]
    pub const fn new(confidence: FormatConfidence, encoding: Encoding) -> Self {
        Self {
            confidence,
            encoding,
            spec_version: None,
            note: None,
        }
    }

    #[must_use]
    pub fn with_spec_version(mut self, version: Option<String>) -> Self {
        self.spec_version = version;
        self
    }

    #[must_use]
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }
}

/// One SBOM family: SPDX, `CycloneDX` or SWID
pub trait SbomParser {
    /// Family this parser normalizes
    fn format(&self) -> SbomFormat;

    /// Claim `content` without parsing it; `None` when it is not this family
    fn detect(&self, content: &str) -> Option<FormatMatch>;

    /// Normalize `content` into the canonical model
    fn parse_str(&self, content: &str) -> Result<SbomData, ParseError>;

    fn confidence(&self, content: &str) -> Option<FormatConfidence> {
        self.detect(content).map(|m| m.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_orders_weakest_first() {
        assert!(FormatConfidence::Low < FormatConfidence::Medium);
        assert!(FormatConfidence::High < FormatConfidence::Certain);
        assert_eq!(FormatConfidence::High.to_string(), "75%");
    }

    #[test]
    fn test_error_messages_name_the_family() {
        let err = ParseError::MissingField {
            format: SbomFormat::Swid,
            field: "tagId or name",
        };
        assert_eq!(err.to_string(), "SWID document lacks tagId or name");

        let err = ParseError::TooLarge {
            path: "bom.json".to_string(),
            size: 20,
            limit: 10,
        };
        assert_eq!(err.to_string(), "bom.json is 20 bytes, over the 10 byte limit");
    }
}
