//! SWID tag parser.
//!
//! Reads ISO/IEC 19770-2 `SoftwareIdentity` tags in XML, plus the JSON
//! rendering with a top-level `softwareIdentity` object. A tag describes a
//! single product, so every document yields exactly one package.

use crate::model::{
    Creator, CreatorType, Dependency, DependencyKind, DocumentMetadata, Package, SbomData,
    SbomFormat,
};
use crate::parsers::traits::{Encoding, FormatConfidence, FormatMatch, ParseError, SbomParser};
use serde::Deserialize;

/// Spec version tag recorded for every SWID document
pub const SWID_SPEC_VERSION: &str = "ISO/IEC 19770-2:2015";

const SWID_NAMESPACE: &str = "standards.iso.org/iso/19770/-2";

/// Parser for SWID tags
#[derive(Debug, Default, Clone, Copy)]
pub struct SwidParser;

impl SwidParser {
    /// Create a new SWID parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn parse_xml(&self, content: &str) -> Result<SbomData, ParseError> {
        let tag: SwidTag = quick_xml::de::from_str(content)?;
        self.convert(tag)
    }

    fn parse_json(&self, content: &str) -> Result<SbomData, ParseError> {
        let doc: SwidJsonDocument = serde_json::from_str(content)?;
        self.convert(doc.software_identity)
    }

    fn convert(&self, tag: SwidTag) -> Result<SbomData, ParseError> {
        if tag.tag_id.trim().is_empty() && tag.name.trim().is_empty() {
            return Err(ParseError::MissingField {
                format: SbomFormat::Swid,
                field: "tagId or name",
            });
        }

        let mut document = DocumentMetadata::new(SbomFormat::Swid, SWID_SPEC_VERSION);
        document.name = Some(tag.name.clone()).filter(|n| !n.trim().is_empty());
        document.namespace = Some(tag.tag_id.clone()).filter(|t| !t.trim().is_empty());
        for entity in tag.entities.iter().filter(|e| e.has_role("tagCreator")) {
            if let Some(name) = entity.name.as_deref().filter(|n| !n.trim().is_empty()) {
                document.creators.push(Creator {
                    creator_type: CreatorType::Organization,
                    name: name.trim().to_string(),
                });
            }
        }
        if let Some(scheme) = &tag.version_scheme {
            document
                .properties
                .insert("versionScheme".to_string(), scheme.clone());
        }

        let package_id = if tag.tag_id.trim().is_empty() {
            tag.name.clone()
        } else {
            tag.tag_id.clone()
        };
        let mut package = Package::new(package_id.clone(), tag.name.clone());
        package.version.clone_from(&tag.version);
        package.supplier = supplier_of(&tag);
        package.description = tag
            .meta
            .iter()
            .find_map(|m| m.description.clone().or_else(|| m.summary.clone()));

        let mut sbom = SbomData::new(document);
        sbom.add_package(package)
            .map_err(|e| ParseError::Structure {
                format: SbomFormat::Swid,
                message: e.to_string(),
            })?;

        for link in tag.links.iter().filter(|l| l.rel.eq_ignore_ascii_case("requires")) {
            let target = link_target(&link.href);
            if target.is_empty() {
                tracing::debug!(href = %link.href, "Skipping requires link without target");
                continue;
            }
            sbom.add_dependency(Dependency::new(
                package_id.clone(),
                target,
                DependencyKind::DependsOn,
            ));
        }

        Ok(sbom)
    }
}

impl SbomParser for SwidParser {
    fn format(&self) -> SbomFormat {
        SbomFormat::Swid
    }

    fn detect(&self, content: &str) -> Option<FormatMatch> {
        let trimmed = content.trim();

        if trimmed.starts_with('<') {
            if !content.contains("<SoftwareIdentity") && !content.contains(":SoftwareIdentity") {
                return None;
            }
            let found = if content.contains(SWID_NAMESPACE) {
                FormatMatch::new(FormatConfidence::Certain, Encoding::Xml)
            } else {
                FormatMatch::new(FormatConfidence::High, Encoding::Xml)
                    .with_note("no SWID namespace")
            };
            return Some(found.with_spec_version(Some(SWID_SPEC_VERSION.to_string())));
        }

        if trimmed.starts_with('{') && content.contains("\"softwareIdentity\"") {
            let confidence = if content.contains("\"tagId\"") {
                FormatConfidence::High
            } else {
                FormatConfidence::Medium
            };
            return Some(FormatMatch::new(confidence, Encoding::Json));
        }

        None
    }

    fn parse_str(&self, content: &str) -> Result<SbomData, ParseError> {
        let trimmed = content.trim();
        if trimmed.starts_with('<') {
            self.parse_xml(content)
        } else if trimmed.starts_with('{') {
            self.parse_json(content)
        } else {
            Err(ParseError::UnknownFormat(
                "SWID tags must be XML or JSON".to_string(),
            ))
        }
    }
}

/// Supplier: the software creator entity, then the tag creator, then a regid.
fn supplier_of(tag: &SwidTag) -> Option<String> {
    let by_role = |role: &str| {
        tag.entities
            .iter()
            .filter(|e| e.has_role(role))
            .find_map(|e| e.name.clone().filter(|n| !n.trim().is_empty()))
    };
    by_role("softwareCreator")
        .or_else(|| by_role("tagCreator"))
        .or_else(|| tag.regid.clone())
        .or_else(|| tag.entities.iter().find_map(|e| e.regid.clone()))
        .filter(|s| !s.trim().is_empty())
}

/// Strip the `swid:` scheme from a link reference.
fn link_target(href: &str) -> String {
    let href = href.trim();
    href.strip_prefix("swid:").unwrap_or(href).trim().to_string()
}

// ============================================================================
// SWID structures for deserialization
// The same struct reads XML attributes (`@name`) and JSON keys (`name`).
// ============================================================================

#[derive(Debug, Deserialize)]
struct SwidJsonDocument {
    #[serde(rename = "softwareIdentity")]
    software_identity: SwidTag,
}

#[derive(Debug, Default, Deserialize)]
struct SwidTag {
    #[serde(rename = "@tagId", alias = "tagId", default)]
    tag_id: String,
    #[serde(rename = "@name", alias = "name", default)]
    name: String,
    #[serde(rename = "@version", alias = "version")]
    version: Option<String>,
    #[serde(rename = "@versionScheme", alias = "versionScheme")]
    version_scheme: Option<String>,
    #[serde(rename = "@regid", alias = "regid")]
    regid: Option<String>,
    #[serde(rename = "Entity", alias = "entity", alias = "entities", default)]
    entities: Vec<SwidEntity>,
    #[serde(rename = "Link", alias = "link", alias = "links", default)]
    links: Vec<SwidLink>,
    #[serde(rename = "Meta", alias = "meta", default)]
    meta: Vec<SwidMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct SwidEntity {
    #[serde(rename = "@name", alias = "name")]
    name: Option<String>,
    #[serde(rename = "@regid", alias = "regid")]
    regid: Option<String>,
    #[serde(rename = "@role", alias = "role", default)]
    role: String,
}

impl SwidEntity {
    /// Roles are a space-separated list
    fn has_role(&self, role: &str) -> bool {
        self.role.split_whitespace().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SwidLink {
    #[serde(rename = "@rel", alias = "rel", default)]
    rel: String,
    #[serde(rename = "@href", alias = "href", default)]
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct SwidMeta {
    #[serde(rename = "@description", alias = "description")]
    description: Option<String>,
    #[serde(rename = "@summary", alias = "summary")]
    summary: Option<String>,
}
