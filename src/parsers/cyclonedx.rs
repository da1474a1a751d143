//! CycloneDX SBOM parser.
//!
//! Supports CycloneDX 1.4, 1.5 and 1.6 in JSON and XML formats.

use crate::model::{
    Checksum, Creator, CreatorType, Dependency, DependencyKind, DocumentMetadata, HashAlgorithm,
    License, Package, SbomData, SbomFormat, Severity, Vulnerability,
};
use crate::parsers::traits::{Encoding, FormatConfidence, FormatMatch, ParseError, SbomParser};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Parser for CycloneDX SBOM format
#[derive(Debug, Default, Clone, Copy)]
pub struct CycloneDxParser;

impl CycloneDxParser {
    /// Create a new CycloneDX parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse a CycloneDX BOM from JSON
    fn parse_json(&self, content: &str) -> Result<SbomData, ParseError> {
        let cdx: CycloneDxBom = serde_json::from_str(content)?;
        self.convert(cdx)
    }

    /// Parse a CycloneDX BOM from XML
    ///
    /// XML carries the spec version in the namespace rather than in an
    /// element, so it is read from the raw content.
    fn parse_xml(&self, content: &str) -> Result<SbomData, ParseError> {
        let cdx: CycloneDxBomXml = quick_xml::de::from_str(content)?;

        let bom = CycloneDxBom {
            spec_version: Self::extract_xml_version(content).unwrap_or_default(),
            serial_number: cdx.serial_number,
            version: cdx.bom_version,
            metadata: cdx.metadata.map(CdxMetadataXml::into_json),
            components: cdx
                .components
                .map(CdxComponentsXml::into_json)
                .unwrap_or_default(),
            dependencies: cdx
                .dependencies
                .map(|d| d.dependency.into_iter().map(CdxDependencyXml::into_json).collect())
                .unwrap_or_default(),
            vulnerabilities: cdx
                .vulnerabilities
                .map(|v| {
                    v.vulnerability
                        .into_iter()
                        .map(CdxVulnerabilityXml::into_json)
                        .collect()
                })
                .unwrap_or_default(),
        };

        self.convert(bom)
    }

    /// Convert a CycloneDX BOM into the canonical model
    fn convert(&self, cdx: CycloneDxBom) -> Result<SbomData, ParseError> {
        let mut sbom = SbomData::new(convert_metadata(&cdx));

        let meta_component = cdx.metadata.as_ref().and_then(|m| m.component.as_ref());
        let declared = meta_component.into_iter().chain(cdx.components.iter());
        for component in declared {
            add_component_tree(&mut sbom, component, None)?;
        }

        for dep in &cdx.dependencies {
            let source = dep.ref_field.as_deref();
            for target in &dep.depends_on {
                sbom.add_dependency(Dependency {
                    source: non_blank_id(source),
                    target: non_blank_id(Some(target.as_str())),
                    kind: DependencyKind::DependsOn,
                });
            }
        }

        for vuln in &cdx.vulnerabilities {
            let severity = highest_severity(&vuln.ratings);
            if vuln.affects.is_empty() {
                tracing::debug!(id = %vuln.id, "Skipping vulnerability without affected components");
            }
            for affected in &vuln.affects {
                let mut record = Vulnerability::new(vuln.id.clone(), severity, affected.ref_field.clone());
                record.description.clone_from(&vuln.description);
                sbom.add_vulnerability(record);
            }
        }

        Ok(sbom)
    }

    /// Extract version from JSON content (quick heuristic, not full parse)
    fn extract_json_version(content: &str) -> Option<String> {
        let idx = content.find("\"specVersion\"")?;
        let after = &content[idx + "\"specVersion\"".len()..];
        let value_part = &after[after.find(':')? + 1..];
        let after_quote = &value_part[value_part.find('"')? + 1..];
        Some(after_quote[..after_quote.find('"')?].to_string())
    }

    /// Extract the spec version from the XML namespace
    /// (`http://cyclonedx.org/schema/bom/1.5`).
    fn extract_xml_version(content: &str) -> Option<String> {
        const MARKER: &str = "cyclonedx.org/schema/bom/";
        let idx = content.find(MARKER)?;
        let rest = &content[idx + MARKER.len()..];
        let end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
        (end > 0).then(|| rest[..end].to_string())
    }
}

impl SbomParser for CycloneDxParser {
    fn format(&self) -> SbomFormat {
        SbomFormat::CycloneDx
    }

    fn detect(&self, content: &str) -> Option<FormatMatch> {
        let trimmed = content.trim();

        if trimmed.starts_with('{') {
            let has_bom_format = content.contains("\"bomFormat\"");
            let names_cyclonedx = content.contains("CycloneDX") || content.contains("cyclonedx");
            let has_schema = content.contains("\"$schema\"") && content.contains("cyclonedx");

            let found = if has_bom_format && names_cyclonedx {
                FormatMatch::new(FormatConfidence::Certain, Encoding::Json)
            } else if has_bom_format || has_schema {
                FormatMatch::new(FormatConfidence::High, Encoding::Json)
            } else if content.contains("\"specVersion\"") && content.contains("\"components\"") {
                FormatMatch::new(FormatConfidence::Medium, Encoding::Json)
                    .with_note("no bomFormat field")
            } else {
                return None;
            };
            return Some(found.with_spec_version(Self::extract_json_version(content)));
        }

        if trimmed.starts_with('<') && content.contains("<bom") {
            let found = if content.contains("cyclonedx.org") {
                FormatMatch::new(FormatConfidence::Certain, Encoding::Xml)
            } else {
                FormatMatch::new(FormatConfidence::Medium, Encoding::Xml)
                    .with_note("no CycloneDX namespace")
            };
            return Some(found.with_spec_version(Self::extract_xml_version(content)));
        }

        None
    }

    fn parse_str(&self, content: &str) -> Result<SbomData, ParseError> {
        let trimmed = content.trim();
        if trimmed.starts_with('{') {
            self.parse_json(content)
        } else if trimmed.starts_with('<') {
            self.parse_xml(content)
        } else {
            Err(ParseError::UnknownFormat(
                "CycloneDX must be JSON or XML".to_string(),
            ))
        }
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn convert_metadata(cdx: &CycloneDxBom) -> DocumentMetadata {
    let mut document = DocumentMetadata::new(SbomFormat::CycloneDx, cdx.spec_version.trim());
    document.namespace.clone_from(&cdx.serial_number);
    if let Some(version) = cdx.version {
        document
            .properties
            .insert("bomVersion".to_string(), version.to_string());
    }

    let Some(meta) = &cdx.metadata else {
        return document;
    };

    document.name = meta
        .component
        .as_ref()
        .map(|c| c.name.clone())
        .filter(|n| !n.trim().is_empty());
    document.created = meta.timestamp.as_deref().and_then(|t| {
        DateTime::parse_from_rfc3339(t.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    });

    for tool in meta.tools.iter().flatten() {
        let name = format!(
            "{} {}",
            tool.name.as_deref().unwrap_or("unknown"),
            tool.version.as_deref().unwrap_or("")
        );
        document.creators.push(Creator::tool(name.trim()));
    }
    for author in &meta.authors {
        if let Some(name) = author.name.as_deref().filter(|n| !n.trim().is_empty()) {
            document.creators.push(Creator {
                creator_type: CreatorType::Person,
                name: name.trim().to_string(),
            });
        }
    }

    document
}

/// Add a component and its nested components in pre-order, linking each
/// child to its parent with a `contains` relationship.
fn add_component_tree(
    sbom: &mut SbomData,
    component: &CdxComponent,
    parent: Option<&Package>,
) -> Result<(), ParseError> {
    let package = convert_component(component);
    if let Some(parent) = parent {
        sbom.add_dependency(Dependency::new(
            parent.id.clone(),
            package.id.clone(),
            DependencyKind::Contains,
        ));
    }
    sbom.add_package(package.clone())
        .map_err(|e| ParseError::Structure {
            format: SbomFormat::CycloneDx,
            message: e.to_string(),
        })?;

    for child in &component.components {
        add_component_tree(sbom, child, Some(&package))?;
    }
    Ok(())
}

fn convert_component(cdx: &CdxComponent) -> Package {
    let id = cdx
        .bom_ref
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| cdx.name.clone());
    let mut package = Package::new(id, cdx.name.clone());
    package.version.clone_from(&cdx.version);
    package.description.clone_from(&cdx.description);
    package.purl.clone_from(&cdx.purl);
    package.supplier = cdx
        .supplier
        .as_ref()
        .and_then(|s| s.name.clone())
        .or_else(|| cdx.publisher.clone())
        .filter(|s| !s.trim().is_empty());

    for choice in &cdx.licenses {
        if let Some(license) = convert_license(choice) {
            package.add_license(license);
        }
    }

    package.checksums = cdx
        .hashes
        .iter()
        .map(|h| Checksum::new(HashAlgorithm::parse(&h.alg), h.content.clone()))
        .collect();

    package.homepage = cdx
        .external_references
        .iter()
        .find(|r| r.ref_type == "website")
        .map(|r| r.url.clone());

    package
}

fn convert_license(choice: &CdxLicenseChoice) -> Option<License> {
    if let Some(expr) = choice.expression.as_deref() {
        return (!License::is_placeholder(expr)).then(|| License::new(expr));
    }

    let lic = choice.license.as_ref()?;
    let mut license = match (lic.id.as_deref(), lic.name.as_deref()) {
        (Some(id), name) if !License::is_placeholder(id) => {
            let license = License::new(id);
            match name {
                Some(name) => license.with_name(name),
                None => license,
            }
        }
        (_, Some(name)) if !License::is_placeholder(name) => License::new(name),
        _ => return None,
    };
    license.url.clone_from(&lic.url);
    Some(license)
}

/// Highest severity across all ratings; scores stand in for missing labels.
fn highest_severity(ratings: &[CdxRating]) -> Severity {
    ratings
        .iter()
        .map(|rating| {
            let labelled = rating
                .severity
                .as_deref()
                .map_or(Severity::Unknown, Severity::parse);
            match (labelled, rating.score) {
                (Severity::Unknown, Some(score)) => Severity::from_cvss(score),
                (severity, _) => severity,
            }
        })
        .min()
        .unwrap_or(Severity::Unknown)
}

fn non_blank_id(value: Option<&str>) -> Option<crate::model::PackageId> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(crate::model::PackageId::new)
}

// ============================================================================
// CycloneDX JSON structures for deserialization
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom {
    spec_version: String,
    serial_number: Option<String>,
    version: Option<u32>,
    metadata: Option<CdxMetadata>,
    #[serde(default)]
    components: Vec<CdxComponent>,
    #[serde(default)]
    dependencies: Vec<CdxDependency>,
    #[serde(default)]
    vulnerabilities: Vec<CdxVulnerability>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxMetadata {
    timestamp: Option<String>,
    /// Array of tools (1.4) or object with components/services (1.5+)
    #[serde(default, deserialize_with = "deserialize_tools")]
    tools: Option<Vec<CdxTool>>,
    #[serde(default)]
    authors: Vec<CdxAuthor>,
    component: Option<CdxComponent>,
}

#[derive(Debug, Deserialize)]
struct CdxToolsObject {
    #[serde(default)]
    components: Vec<CdxTool>,
    #[serde(default)]
    services: Vec<CdxTool>,
}

#[derive(Debug, Deserialize)]
struct CdxTool {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxAuthor {
    name: Option<String>,
}

/// Accept both the array (1.4) and object (1.5+) forms of `metadata.tools`.
fn deserialize_tools<'de, D>(deserializer: D) -> Result<Option<Vec<CdxTool>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct ToolsVisitor;

    impl<'de> Visitor<'de> for ToolsVisitor {
        type Value = Option<Vec<CdxTool>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an array of tools or an object with components/services")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut tools = Vec::new();
            while let Some(tool) = seq.next_element::<CdxTool>()? {
                tools.push(tool);
            }
            Ok(Some(tools))
        }

        fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let tools_obj: CdxToolsObject =
                Deserialize::deserialize(de::value::MapAccessDeserializer::new(map))?;
            let tools: Vec<CdxTool> = tools_obj
                .components
                .into_iter()
                .chain(tools_obj.services)
                .collect();
            Ok(if tools.is_empty() { None } else { Some(tools) })
        }
    }

    deserializer.deserialize_any(ToolsVisitor)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponent {
    #[serde(alias = "bom-ref")]
    bom_ref: Option<String>,
    #[serde(default)]
    name: String,
    version: Option<String>,
    description: Option<String>,
    publisher: Option<String>,
    purl: Option<String>,
    supplier: Option<CdxSupplier>,
    #[serde(default)]
    licenses: Vec<CdxLicenseChoice>,
    #[serde(default)]
    hashes: Vec<CdxHash>,
    #[serde(default)]
    external_references: Vec<CdxExternalReference>,
    #[serde(default)]
    components: Vec<CdxComponent>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxLicenseChoice {
    license: Option<CdxLicense>,
    expression: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxLicense {
    id: Option<String>,
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxSupplier {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxHash {
    alg: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CdxExternalReference {
    #[serde(rename = "type")]
    ref_type: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxDependency {
    #[serde(rename = "ref", default)]
    ref_field: Option<String>,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CdxVulnerability {
    #[serde(default)]
    id: String,
    description: Option<String>,
    #[serde(default)]
    ratings: Vec<CdxRating>,
    #[serde(default)]
    affects: Vec<CdxAffects>,
}

#[derive(Debug, Deserialize)]
struct CdxRating {
    score: Option<f32>,
    severity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxAffects {
    #[serde(rename = "ref")]
    ref_field: String,
}

// ============================================================================
// CycloneDX XML structures for deserialization
// XML wraps collections (<components><component>...) and keeps
// identifiers in attributes.
// ============================================================================

#[derive(Debug, Deserialize)]
struct CycloneDxBomXml {
    #[serde(rename = "@serialNumber")]
    serial_number: Option<String>,
    #[serde(rename = "@version")]
    bom_version: Option<u32>,
    metadata: Option<CdxMetadataXml>,
    components: Option<CdxComponentsXml>,
    dependencies: Option<CdxDependenciesXml>,
    vulnerabilities: Option<CdxVulnerabilitiesXml>,
}

#[derive(Debug, Deserialize)]
struct CdxMetadataXml {
    timestamp: Option<String>,
    tools: Option<CdxToolsXml>,
    authors: Option<CdxAuthorsXml>,
    component: Option<CdxComponentXml>,
}

impl CdxMetadataXml {
    fn into_json(self) -> CdxMetadata {
        let tools = self.tools.map(|t| {
            let mut tools = t.tool;
            if let Some(components) = t.components {
                tools.extend(components.component.into_iter().map(|c| CdxTool {
                    name: Some(c.name),
                    version: c.version,
                }));
            }
            tools
        });
        CdxMetadata {
            timestamp: self.timestamp,
            tools,
            authors: self.authors.map(|a| a.author).unwrap_or_default(),
            component: self.component.map(CdxComponentXml::into_json),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdxToolsXml {
    #[serde(default)]
    tool: Vec<CdxTool>,
    components: Option<CdxComponentsXml>,
}

#[derive(Debug, Deserialize)]
struct CdxAuthorsXml {
    #[serde(default)]
    author: Vec<CdxAuthor>,
}

#[derive(Debug, Deserialize)]
struct CdxComponentsXml {
    #[serde(default)]
    component: Vec<CdxComponentXml>,
}

impl CdxComponentsXml {
    fn into_json(self) -> Vec<CdxComponent> {
        self.component
            .into_iter()
            .map(CdxComponentXml::into_json)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CdxComponentXml {
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    #[serde(default)]
    name: String,
    version: Option<String>,
    description: Option<String>,
    publisher: Option<String>,
    purl: Option<String>,
    supplier: Option<CdxSupplier>,
    licenses: Option<CdxLicensesXml>,
    hashes: Option<CdxHashesXml>,
    #[serde(rename = "externalReferences")]
    external_references: Option<CdxExternalReferencesXml>,
    components: Option<CdxComponentsXml>,
}

impl CdxComponentXml {
    fn into_json(self) -> CdxComponent {
        let licenses = self
            .licenses
            .map(|l| {
                let expressions = l.expression.into_iter().map(|e| CdxLicenseChoice {
                    license: None,
                    expression: Some(e),
                });
                l.license
                    .into_iter()
                    .map(|lic| CdxLicenseChoice {
                        license: Some(lic),
                        expression: None,
                    })
                    .chain(expressions)
                    .collect()
            })
            .unwrap_or_default();

        CdxComponent {
            bom_ref: self.bom_ref,
            name: self.name,
            version: self.version,
            description: self.description,
            publisher: self.publisher,
            purl: self.purl,
            supplier: self.supplier,
            licenses,
            hashes: self
                .hashes
                .map(|h| {
                    h.hash
                        .into_iter()
                        .map(|x| CdxHash {
                            alg: x.alg,
                            content: x.content,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            external_references: self
                .external_references
                .map(|r| {
                    r.reference
                        .into_iter()
                        .map(|x| CdxExternalReference {
                            ref_type: x.ref_type,
                            url: x.url,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            components: self
                .components
                .map(CdxComponentsXml::into_json)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdxLicensesXml {
    #[serde(default)]
    license: Vec<CdxLicense>,
    #[serde(default)]
    expression: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CdxHashesXml {
    #[serde(default)]
    hash: Vec<CdxHashXml>,
}

#[derive(Debug, Deserialize)]
struct CdxHashXml {
    #[serde(rename = "@alg")]
    alg: String,
    #[serde(rename = "$text", default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct CdxExternalReferencesXml {
    #[serde(default)]
    reference: Vec<CdxExternalReferenceXml>,
}

#[derive(Debug, Deserialize)]
struct CdxExternalReferenceXml {
    #[serde(rename = "@type")]
    ref_type: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct CdxDependenciesXml {
    #[serde(default)]
    dependency: Vec<CdxDependencyXml>,
}

#[derive(Debug, Deserialize)]
struct CdxDependencyXml {
    #[serde(rename = "@ref")]
    ref_field: Option<String>,
    #[serde(default)]
    dependency: Vec<CdxDependencyRefXml>,
}

impl CdxDependencyXml {
    fn into_json(self) -> CdxDependency {
        CdxDependency {
            ref_field: self.ref_field,
            depends_on: self.dependency.into_iter().map(|d| d.ref_field).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdxDependencyRefXml {
    #[serde(rename = "@ref")]
    ref_field: String,
}

#[derive(Debug, Deserialize)]
struct CdxVulnerabilitiesXml {
    #[serde(default)]
    vulnerability: Vec<CdxVulnerabilityXml>,
}

#[derive(Debug, Deserialize)]
struct CdxVulnerabilityXml {
    #[serde(default)]
    id: String,
    description: Option<String>,
    ratings: Option<CdxRatingsXml>,
    affects: Option<CdxAffectsXml>,
}

impl CdxVulnerabilityXml {
    fn into_json(self) -> CdxVulnerability {
        CdxVulnerability {
            id: self.id,
            description: self.description,
            ratings: self.ratings.map(|r| r.rating).unwrap_or_default(),
            affects: self
                .affects
                .map(|a| {
                    a.target
                        .into_iter()
                        .map(|t| CdxAffects { ref_field: t.ref_field })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdxRatingsXml {
    #[serde(default)]
    rating: Vec<CdxRating>,
}

#[derive(Debug, Deserialize)]
struct CdxAffectsXml {
    #[serde(default)]
    target: Vec<CdxTargetXml>,
}

#[derive(Debug, Deserialize)]
struct CdxTargetXml {
    #[serde(rename = "ref")]
    ref_field: String,
}
