//! Package data structure.

use super::{Checksum, License, PackageId};
use packageurl::PackageUrl;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A software package declared by an SBOM document.
///
/// The name is never empty (enforced by [`super::SbomData::add_package`]);
/// every other field is optional and its absence is a completeness gap,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Document-local identifier
    pub id: PackageId,
    /// Package name
    pub name: String,
    /// Package version
    pub version: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Declared or concluded licenses, treated as a set
    pub licenses: Vec<License>,
    /// Package URL
    pub purl: Option<String>,
    /// Supplier or vendor name
    pub supplier: Option<String>,
    /// Homepage URL
    pub homepage: Option<String>,
    /// Download location or other source information
    pub source_info: Option<String>,
    /// Checksums
    pub checksums: Vec<Checksum>,
}

impl Package {
    /// Create a package with only an identifier and a name
    pub fn new(id: impl Into<PackageId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: None,
            description: None,
            licenses: Vec::new(),
            purl: None,
            supplier: None,
            homepage: None,
            source_info: None,
            checksums: Vec::new(),
        }
    }

    /// Builder: set version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Builder: add a license
    #[must_use]
    pub fn with_license(mut self, license: License) -> Self {
        self.add_license(license);
        self
    }

    /// Builder: set supplier
    #[must_use]
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Builder: set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set PURL
    #[must_use]
    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    /// Add a license unless an identical identifier is already present.
    pub fn add_license(&mut self, license: License) {
        if !self
            .licenses
            .iter()
            .any(|l| l.identifier == license.identifier)
        {
            self.licenses.push(license);
        }
    }

    /// Whether a non-blank version is present
    #[must_use]
    pub fn has_version(&self) -> bool {
        non_blank(self.version.as_deref())
    }

    /// Whether at least one license is present
    #[must_use]
    pub fn has_license(&self) -> bool {
        !self.licenses.is_empty()
    }

    /// Whether a non-blank supplier is present
    #[must_use]
    pub fn has_supplier(&self) -> bool {
        non_blank(self.supplier.as_deref())
    }

    /// Whether a non-blank description is present
    #[must_use]
    pub fn has_description(&self) -> bool {
        non_blank(self.description.as_deref())
    }

    /// Whether a non-blank PURL is present
    #[must_use]
    pub fn has_purl(&self) -> bool {
        non_blank(self.purl.as_deref())
    }

    /// Parse the PURL, if present. `None` when absent, `Some(Err)` when malformed.
    #[must_use]
    pub fn parsed_purl(&self) -> Option<Result<PackageUrl<'static>, packageurl::Error>> {
        self.purl
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PackageUrl::from_str)
    }

    /// Package ecosystem derived from the PURL type (e.g. "npm", "pypi").
    #[must_use]
    pub fn ecosystem(&self) -> Option<String> {
        match self.parsed_purl() {
            Some(Ok(purl)) => Some(purl.ty().to_string()),
            _ => None,
        }
    }

    /// "name@version" or just "name"
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.version.as_deref() {
            Some(v) if !v.trim().is_empty() => format!("{}@{}", self.name, v),
            _ => self.name.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_presence() {
        let pkg = Package::new("p1", "serde")
            .with_version(" ")
            .with_supplier("dtolnay");
        assert!(!pkg.has_version(), "blank version counts as absent");
        assert!(pkg.has_supplier());
        assert!(!pkg.has_license());
    }

    #[test]
    fn test_duplicate_license_ignored() {
        let pkg = Package::new("p1", "serde")
            .with_license(License::new("MIT"))
            .with_license(License::new("MIT"))
            .with_license(License::new("Apache-2.0"));
        assert_eq!(pkg.licenses.len(), 2);
    }

    #[test]
    fn test_ecosystem_from_purl() {
        let pkg = Package::new("p1", "flask").with_purl("pkg:pypi/flask@2.0.1");
        assert_eq!(pkg.ecosystem().as_deref(), Some("pypi"));

        let bad = Package::new("p2", "x").with_purl("not a purl");
        assert!(matches!(bad.parsed_purl(), Some(Err(_))));
        assert_eq!(bad.ecosystem(), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            Package::new("a", "flask").with_version("2.0").display_name(),
            "flask@2.0"
        );
        assert_eq!(Package::new("a", "flask").display_name(), "flask");
    }
}
