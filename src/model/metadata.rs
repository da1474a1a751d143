//! Document-level metadata structures.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Standard every SWID tag's spec version names
pub const SWID_SPEC_VERSION_PREFIX: &str = "ISO/IEC 19770-2";

/// SBOM format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SbomFormat {
    Spdx,
    #[serde(rename = "cyclonedx")]
    CycloneDx,
    Swid,
}

impl SbomFormat {
    /// Human-readable format name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spdx => "SPDX",
            Self::CycloneDx => "CycloneDX",
            Self::Swid => "SWID",
        }
    }
}

impl std::fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// SBOM format type
    pub format: SbomFormat,
    /// Raw specification version tag as written in the document
    /// (e.g. "SPDX-2.3" for SPDX, "1.5" for `CycloneDX`)
    pub spec_version: String,
    /// Document name
    pub name: Option<String>,
    /// Document namespace or serial number
    pub namespace: Option<String>,
    /// Creation timestamp, when the document carries a parseable one
    pub created: Option<DateTime<Utc>>,
    /// Creators/authors
    pub creators: Vec<Creator>,
    /// Free-form format-specific properties, in document order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

impl DocumentMetadata {
    /// Create metadata for a format and spec version with every optional field empty.
    pub fn new(format: SbomFormat, spec_version: impl Into<String>) -> Self {
        Self {
            format,
            spec_version: spec_version.into(),
            name: None,
            namespace: None,
            created: None,
            creators: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    /// Number of required document fields that are filled in, out of
    /// [`Self::REQUIRED_FIELDS`].
    #[must_use]
    pub fn populated_fields(&self) -> usize {
        [
            self.name.as_deref().is_some_and(|n| !n.trim().is_empty()),
            !self.creators.is_empty(),
            self.created.is_some(),
            self.namespace.as_deref().is_some_and(|n| !n.trim().is_empty()),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Document fields counted by [`Self::populated_fields`]
    pub const REQUIRED_FIELDS: usize = 4;
}

/// Creator information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Creator type
    pub creator_type: CreatorType,
    /// Creator name or identifier
    pub name: String,
}

impl Creator {
    /// Parse an SPDX-style creator string ("Tool: name", "Organization: name",
    /// "Person: name"). Unprefixed values are treated as tools.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let (creator_type, name) = if let Some(rest) = value.strip_prefix("Tool:") {
            (CreatorType::Tool, rest)
        } else if let Some(rest) = value.strip_prefix("Organization:") {
            (CreatorType::Organization, rest)
        } else if let Some(rest) = value.strip_prefix("Person:") {
            (CreatorType::Person, rest)
        } else {
            (CreatorType::Tool, value)
        };
        Self {
            creator_type,
            name: name.trim().to_string(),
        }
    }

    /// Create a tool creator
    pub fn tool(name: impl Into<String>) -> Self {
        Self {
            creator_type: CreatorType::Tool,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Creator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.creator_type {
            CreatorType::Person => "Person",
            CreatorType::Organization => "Organization",
            CreatorType::Tool => "Tool",
        };
        write!(f, "{kind}: {}", self.name)
    }
}

/// Type of creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorType {
    Person,
    Organization,
    Tool,
}
