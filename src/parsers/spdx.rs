//! SPDX SBOM parser.
//!
//! Supports SPDX 2.2 and 2.3 in JSON and tag-value formats.

use crate::model::{
    Checksum, Creator, Dependency, DependencyKind, DocumentMetadata, HashAlgorithm, License,
    Package, PackageId, SbomData, SbomFormat,
};
use crate::parsers::traits::{Encoding, FormatConfidence, FormatMatch, ParseError, SbomParser};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Parser for SPDX SBOM format
#[derive(Debug, Default, Clone, Copy)]
pub struct SpdxParser;

impl SpdxParser {
    /// Create a new SPDX parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse SPDX JSON format
    fn parse_json(&self, content: &str) -> Result<SbomData, ParseError> {
        let spdx: SpdxDocument = serde_json::from_str(content)?;
        self.convert(spdx)
    }

    /// Parse SPDX tag-value format
    fn parse_tag_value(&self, content: &str) -> Result<SbomData, ParseError> {
        let spdx = self.parse_tag_value_format(content);
        self.convert(spdx)
    }

    /// Parse tag-value format into an `SpdxDocument`
    fn parse_tag_value_format(&self, content: &str) -> SpdxDocument {
        let mut doc = SpdxDocument::default();
        let mut creation_info = SpdxCreationInfo::default();
        let mut current_package: Option<SpdxPackage> = None;
        let mut lines = content.lines();

        while let Some(line) = lines.next() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = read_tag_value(value.trim(), &mut lines);

            match key {
                "SPDXVersion" => doc.spdx_version = value,
                "SPDXID" => match current_package.as_mut() {
                    Some(pkg) => pkg.spdx_id = value,
                    None => doc.spdx_id = value,
                },
                "DocumentName" => doc.name = Some(value),
                "DataLicense" => doc.data_license = Some(value),
                "DocumentNamespace" => doc.document_namespace = Some(value),
                "Creator" => creation_info.creators.push(value),
                "Created" => creation_info.created = Some(value),
                "LicenseListVersion" => creation_info.license_list_version = Some(value),
                "PackageName" => {
                    if let Some(pkg) = current_package.take() {
                        doc.packages.push(pkg);
                    }
                    current_package = Some(SpdxPackage {
                        name: value,
                        ..SpdxPackage::default()
                    });
                }
                "Relationship" => {
                    if let Some(rel) = parse_relationship_line(&value) {
                        doc.relationships.push(rel);
                    }
                }
                _ => {
                    if let Some(pkg) = current_package.as_mut() {
                        apply_package_tag(pkg, key, value);
                    }
                }
            }
        }

        if let Some(pkg) = current_package {
            doc.packages.push(pkg);
        }
        doc.creation_info = Some(creation_info);
        doc
    }

    /// Convert an SPDX document into the canonical model
    fn convert(&self, spdx: SpdxDocument) -> Result<SbomData, ParseError> {
        let mut sbom = SbomData::new(convert_metadata(&spdx));

        for pkg in &spdx.packages {
            sbom.add_package(convert_package(pkg))
                .map_err(|e| ParseError::Structure {
                    format: SbomFormat::Spdx,
                    message: e.to_string(),
                })?;
        }

        for rel in &spdx.relationships {
            if let Some(dependency) = convert_relationship(rel) {
                sbom.add_dependency(dependency);
            }
        }

        Ok(sbom)
    }

    /// Extract SPDX version from JSON content (quick heuristic)
    fn extract_json_version(content: &str) -> Option<String> {
        let idx = content.find("\"spdxVersion\"")?;
        let after = &content[idx + "\"spdxVersion\"".len()..];
        let value_part = &after[after.find(':')? + 1..];
        let after_quote = &value_part[value_part.find('"')? + 1..];
        let version = &after_quote[..after_quote.find('"')?];
        Some(version.strip_prefix("SPDX-").unwrap_or(version).to_string())
    }

    /// Extract SPDX version from tag-value content
    fn extract_tag_value_version(content: &str) -> Option<String> {
        content.lines().find_map(|line| {
            line.trim().strip_prefix("SPDXVersion:").map(|rest| {
                let version = rest.trim();
                version.strip_prefix("SPDX-").unwrap_or(version).to_string()
            })
        })
    }

    fn is_tag_value(trimmed: &str) -> bool {
        trimmed.starts_with("SPDXVersion:") || trimmed.contains("\nSPDXVersion:")
    }
}

impl SbomParser for SpdxParser {
    fn format(&self) -> SbomFormat {
        SbomFormat::Spdx
    }

    fn detect(&self, content: &str) -> Option<FormatMatch> {
        let trimmed = content.trim();

        if trimmed.starts_with('{') {
            let has_version = content.contains("\"spdxVersion\"");
            let has_id = content.contains("\"SPDXID\"");
            let has_data_license = content.contains("\"dataLicense\"");

            let found = if has_version && has_id {
                FormatMatch::new(FormatConfidence::Certain, Encoding::Json)
            } else if has_version || (has_id && has_data_license) {
                FormatMatch::new(FormatConfidence::High, Encoding::Json)
            } else if has_data_license && content.contains("\"packages\"") {
                FormatMatch::new(FormatConfidence::Medium, Encoding::Json)
                    .with_note("no spdxVersion field")
            } else {
                return None;
            };
            return Some(found.with_spec_version(Self::extract_json_version(content)));
        }

        if Self::is_tag_value(trimmed) {
            let confidence = if content.contains("SPDXID:") && content.contains("DataLicense:") {
                FormatConfidence::Certain
            } else {
                FormatConfidence::High
            };
            return Some(
                FormatMatch::new(confidence, Encoding::TagValue)
                    .with_spec_version(Self::extract_tag_value_version(content)),
            );
        }

        None
    }

    fn parse_str(&self, content: &str) -> Result<SbomData, ParseError> {
        let trimmed = content.trim();
        if trimmed.starts_with('{') {
            self.parse_json(content)
        } else if Self::is_tag_value(trimmed) {
            self.parse_tag_value(content)
        } else {
            Err(ParseError::UnknownFormat(
                "SPDX must be JSON or tag-value".to_string(),
            ))
        }
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn convert_metadata(spdx: &SpdxDocument) -> DocumentMetadata {
    let mut document = DocumentMetadata::new(SbomFormat::Spdx, spdx.spdx_version.trim());
    document.name = spdx.name.clone().filter(|n| !n.trim().is_empty());
    document.namespace = spdx.document_namespace.clone();

    if let Some(info) = &spdx.creation_info {
        document.created = info.created.as_deref().and_then(parse_timestamp);
        document.creators = info
            .creators
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| Creator::parse(c))
            .collect();
        if let Some(version) = &info.license_list_version {
            document
                .properties
                .insert("licenseListVersion".to_string(), version.clone());
        }
    }
    if let Some(data_license) = &spdx.data_license {
        document
            .properties
            .insert("dataLicense".to_string(), data_license.clone());
    }
    document
}

fn convert_package(pkg: &SpdxPackage) -> Package {
    let id = if pkg.spdx_id.trim().is_empty() {
        pkg.name.clone()
    } else {
        pkg.spdx_id.clone()
    };
    let mut package = Package::new(id, pkg.name.clone());
    package.version = pkg.version_info.clone();
    package.description = pkg.description.clone().or_else(|| pkg.summary.clone());
    package.homepage = pkg.homepage.clone().filter(|h| !License::is_placeholder(h));
    package.source_info = pkg.source_info.clone();

    for expr in [&pkg.license_declared, &pkg.license_concluded]
        .into_iter()
        .flatten()
    {
        if !License::is_placeholder(expr) {
            package.add_license(License::new(expr.clone()));
        }
    }

    package.supplier = pkg.supplier.as_deref().and_then(strip_actor_prefix);

    package.purl = pkg
        .external_refs
        .iter()
        .find(|r| r.reference_type == "purl" && r.reference_locator.starts_with("pkg:"))
        .map(|r| r.reference_locator.clone());

    package.checksums = pkg
        .checksums
        .iter()
        .map(|c| Checksum::new(HashAlgorithm::parse(&c.algorithm), c.checksum_value.clone()))
        .collect();

    package
}

/// Map a relationship onto a dependency pointing from dependent to dependency.
///
/// Relationships whose related element is `NONE`/`NOASSERTION` carry no edge.
fn convert_relationship(rel: &SpdxRelationship) -> Option<Dependency> {
    let element = endpoint(rel.spdx_element_id.as_deref());
    let related = endpoint(rel.related_spdx_element.as_deref());
    if matches!(
        rel.related_spdx_element.as_deref().map(str::trim),
        Some("NONE" | "NOASSERTION")
    ) {
        return None;
    }

    let rel_type = rel.relationship_type.trim().to_uppercase();
    let (kind, reversed) = match rel_type.as_str() {
        "DEPENDS_ON" => (DependencyKind::DependsOn, false),
        "DEPENDENCY_OF" => (DependencyKind::DependsOn, true),
        "DEV_DEPENDENCY_OF" => (DependencyKind::DevDependsOn, true),
        "BUILD_DEPENDENCY_OF" => (DependencyKind::BuildDependsOn, true),
        "TEST_DEPENDENCY_OF" => (DependencyKind::TestDependsOn, true),
        "RUNTIME_DEPENDENCY_OF" => (DependencyKind::RuntimeDependsOn, true),
        "OPTIONAL_DEPENDENCY_OF" => (DependencyKind::OptionalDependsOn, true),
        "CONTAINS" => (DependencyKind::Contains, false),
        "DESCRIBES" => (DependencyKind::Describes, false),
        other => (DependencyKind::Other(other.to_lowercase()), false),
    };

    let (source, target) = if reversed {
        (related, element)
    } else {
        (element, related)
    };
    Some(Dependency {
        source,
        target,
        kind,
    })
}

fn endpoint(value: Option<&str>) -> Option<PackageId> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PackageId::new)
}

/// Strip the `Organization:` / `Person:` / `Tool:` actor prefix from a supplier.
fn strip_actor_prefix(value: &str) -> Option<String> {
    let name = ["Organization:", "Person:", "Tool:"]
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value)
        .trim();
    if name.is_empty() || License::is_placeholder(name) {
        None
    } else {
        Some(name.to_string())
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// Tag-value helpers
// ============================================================================

/// Read a tag value, following `<text>...</text>` blocks across lines.
fn read_tag_value<'a, I>(value: &str, lines: &mut I) -> String
where
    I: Iterator<Item = &'a str>,
{
    let Some(rest) = value.strip_prefix("<text>") else {
        return value.to_string();
    };
    if let Some(end) = rest.find("</text>") {
        return rest[..end].trim().to_string();
    }

    let mut text = rest.to_string();
    for line in lines.by_ref() {
        if let Some(end) = line.find("</text>") {
            text.push('\n');
            text.push_str(&line[..end]);
            break;
        }
        text.push('\n');
        text.push_str(line);
    }
    text.trim().to_string()
}

fn apply_package_tag(pkg: &mut SpdxPackage, key: &str, value: String) {
    match key {
        "PackageVersion" => pkg.version_info = Some(value),
        "PackageLicenseConcluded" => pkg.license_concluded = Some(value),
        "PackageLicenseDeclared" => pkg.license_declared = Some(value),
        "PackageSupplier" => pkg.supplier = Some(value),
        "PackageDescription" => pkg.description = Some(value),
        "PackageSummary" => pkg.summary = Some(value),
        "PackageHomePage" => pkg.homepage = Some(value),
        "PackageSourceInfo" => pkg.source_info = Some(value),
        "ExternalRef" => {
            let parts: Vec<&str> = value.split_whitespace().collect();
            if let [category, ref_type, locator, ..] = parts.as_slice() {
                pkg.external_refs.push(SpdxExternalRef {
                    reference_category: (*category).to_string(),
                    reference_type: (*ref_type).to_string(),
                    reference_locator: (*locator).to_string(),
                });
            }
        }
        "PackageChecksum" => {
            if let Some((algorithm, checksum)) = value.split_once(':') {
                pkg.checksums.push(SpdxChecksum {
                    algorithm: algorithm.trim().to_string(),
                    checksum_value: checksum.trim().to_string(),
                });
            }
        }
        _ => {}
    }
}

/// Parse a relationship line from tag-value format.
fn parse_relationship_line(value: &str) -> Option<SpdxRelationship> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if let [element, rel_type, related, ..] = parts.as_slice() {
        Some(SpdxRelationship {
            spdx_element_id: Some((*element).to_string()),
            relationship_type: (*rel_type).to_string(),
            related_spdx_element: Some((*related).to_string()),
        })
    } else {
        None
    }
}

// ============================================================================
// SPDX JSON structures for deserialization
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    spdx_version: String,
    #[serde(rename = "SPDXID", default)]
    spdx_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data_license: Option<String>,
    #[serde(default)]
    document_namespace: Option<String>,
    #[serde(default)]
    creation_info: Option<SpdxCreationInfo>,
    #[serde(default)]
    packages: Vec<SpdxPackage>,
    #[serde(default)]
    relationships: Vec<SpdxRelationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxCreationInfo {
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    creators: Vec<String>,
    #[serde(default)]
    license_list_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    #[serde(rename = "SPDXID", default)]
    spdx_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    version_info: Option<String>,
    #[serde(default)]
    license_concluded: Option<String>,
    #[serde(default)]
    license_declared: Option<String>,
    #[serde(default)]
    supplier: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    source_info: Option<String>,
    #[serde(default)]
    checksums: Vec<SpdxChecksum>,
    #[serde(default)]
    external_refs: Vec<SpdxExternalRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxChecksum {
    algorithm: String,
    checksum_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    #[serde(default)]
    reference_category: String,
    reference_type: String,
    reference_locator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    #[serde(default)]
    spdx_element_id: Option<String>,
    relationship_type: String,
    #[serde(default, alias = "relatedSpdxElementId")]
    related_spdx_element: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_DOC: &str = r#"{
        "spdxVersion": "SPDX-2.3",
        "SPDXID": "SPDXRef-DOCUMENT",
        "name": "demo",
        "dataLicense": "CC0-1.0",
        "creationInfo": {
            "created": "2024-01-15T10:00:00Z",
            "creators": ["Tool: syft-1.0", "Organization: Acme"]
        },
        "packages": [
            {
                "SPDXID": "SPDXRef-app",
                "name": "app",
                "versionInfo": "1.0.0",
                "licenseDeclared": "MIT",
                "licenseConcluded": "NOASSERTION",
                "supplier": "Organization: Acme Corp",
                "externalRefs": [
                    {"referenceCategory": "PACKAGE-MANAGER", "referenceType": "purl", "referenceLocator": "pkg:npm/app@1.0.0"}
                ],
                "checksums": [{"algorithm": "SHA256", "checksumValue": "abc"}]
            },
            {"SPDXID": "SPDXRef-lib", "name": "lib", "supplier": "NOASSERTION"},
            {"SPDXID": "SPDXRef-tool", "name": "tool"}
        ],
        "relationships": [
            {"spdxElementId": "SPDXRef-DOCUMENT", "relationshipType": "DESCRIBES", "relatedSpdxElement": "SPDXRef-app"},
            {"spdxElementId": "SPDXRef-app", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "SPDXRef-lib"},
            {"spdxElementId": "SPDXRef-tool", "relationshipType": "DEV_DEPENDENCY_OF", "relatedSpdxElement": "SPDXRef-app"},
            {"spdxElementId": "SPDXRef-lib", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "NONE"}
        ]
    }"#;

    #[test]
    fn test_parse_json_document() {
        let sbom = SpdxParser::new().parse_str(JSON_DOC).unwrap();
        assert_eq!(sbom.document.format, SbomFormat::Spdx);
        assert_eq!(sbom.document.spec_version, "SPDX-2.3");
        assert_eq!(sbom.document.name.as_deref(), Some("demo"));
        assert!(sbom.document.created.is_some());
        assert_eq!(sbom.document.creators.len(), 2);
        assert_eq!(sbom.package_count(), 3);

        let app = &sbom.packages()[0];
        assert_eq!(app.id.value(), "SPDXRef-app");
        assert_eq!(app.licenses.len(), 1, "NOASSERTION is skipped");
        assert_eq!(app.supplier.as_deref(), Some("Acme Corp"));
        assert_eq!(app.purl.as_deref(), Some("pkg:npm/app@1.0.0"));
        assert_eq!(app.checksums.len(), 1);
        assert!(sbom.packages()[1].supplier.is_none());
    }

    #[test]
    fn test_reverse_dependency_relationships() {
        let sbom = SpdxParser::new().parse_str(JSON_DOC).unwrap();
        let deps = sbom.dependencies();
        assert_eq!(deps.len(), 3, "relationship to NONE is dropped");

        assert_eq!(deps[0].kind, DependencyKind::Describes);

        let dev = &deps[2];
        assert_eq!(dev.kind, DependencyKind::DevDependsOn);
        assert_eq!(dev.source_id().map(PackageId::value), Some("SPDXRef-app"));
        assert_eq!(dev.target_id().map(PackageId::value), Some("SPDXRef-tool"));
    }

    #[test]
    fn test_missing_relationship_endpoint_survives() {
        let content = r#"{
            "spdxVersion": "SPDX-2.3",
            "SPDXID": "SPDXRef-DOCUMENT",
            "packages": [{"SPDXID": "SPDXRef-a", "name": "a"}],
            "relationships": [{"spdxElementId": "SPDXRef-a", "relationshipType": "DEPENDS_ON"}]
        }"#;
        let sbom = SpdxParser::new().parse_str(content).unwrap();
        assert_eq!(sbom.dependencies().len(), 1);
        assert!(sbom.dependencies()[0].target_id().is_none());
    }

    #[test]
    fn test_parse_tag_value() {
        let content = "\
SPDXVersion: SPDX-2.3
DataLicense: CC0-1.0
SPDXID: SPDXRef-DOCUMENT
DocumentName: tv-demo
Creator: Tool: example
Created: 2024-02-01T00:00:00Z

PackageName: flask
SPDXID: SPDXRef-flask
PackageVersion: 2.0.1
PackageLicenseDeclared: BSD-3-Clause
PackageDescription: <text>A micro
web framework</text>
ExternalRef: PACKAGE-MANAGER purl pkg:pypi/flask@2.0.1
PackageChecksum: SHA1: 85ed0817af83a24ad8da68c2b5094de69833983c

PackageName: werkzeug
SPDXID: SPDXRef-werkzeug

Relationship: SPDXRef-flask DEPENDS_ON SPDXRef-werkzeug
";
        let sbom = SpdxParser::new().parse_str(content).unwrap();
        assert_eq!(sbom.document.name.as_deref(), Some("tv-demo"));
        assert_eq!(sbom.package_count(), 2);

        let flask = &sbom.packages()[0];
        assert_eq!(flask.id.value(), "SPDXRef-flask");
        assert_eq!(flask.version.as_deref(), Some("2.0.1"));
        assert_eq!(flask.description.as_deref(), Some("A micro\nweb framework"));
        assert_eq!(flask.ecosystem().as_deref(), Some("pypi"));
        assert_eq!(flask.checksums[0].algorithm, HashAlgorithm::Sha1);

        assert_eq!(sbom.dependencies().len(), 1);
        assert_eq!(sbom.dependencies()[0].kind, DependencyKind::DependsOn);
    }

    #[test]
    fn test_nameless_package_rejected() {
        let content = r#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [{"SPDXID": "SPDXRef-a", "name": ""}]
        }"#;
        let err = SpdxParser::new().parse_str(content).unwrap_err();
        assert!(matches!(err, ParseError::Structure { format: SbomFormat::Spdx, .. }));
    }

    #[test]
    fn test_detect_versions() {
        let parser = SpdxParser::new();
        let json = parser.detect(JSON_DOC).unwrap();
        assert_eq!(json.confidence, FormatConfidence::Certain);
        assert_eq!(json.spec_version.as_deref(), Some("2.3"));

        let tv = parser
            .detect("SPDXVersion: SPDX-2.2\nSPDXID: SPDXRef-DOCUMENT\nDataLicense: CC0-1.0")
            .unwrap();
        assert_eq!(tv.encoding, Encoding::TagValue);
        assert_eq!(tv.spec_version.as_deref(), Some("2.2"));

        let partial = parser
            .detect(r#"{"dataLicense": "CC0-1.0", "packages": []}"#)
            .unwrap();
        assert_eq!(partial.confidence, FormatConfidence::Medium);
        assert_eq!(partial.note, Some("no spdxVersion field"));

        assert_eq!(parser.confidence(r#"{"bomFormat": "CycloneDX"}"#), None);
    }
}
