//! The SBOM document root.

use super::{Dependency, DocumentMetadata, Package, PackageId, Vulnerability};
use crate::error::{Result, SbomError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use xxhash_rust::xxh3::xxh3_64;

/// Normalized SBOM document, produced by a format parser and read by every
/// analysis component.
///
/// Packages keep declaration order; that order drives every tie-break in the
/// graph, analysis and lookup layers. The value is treated as immutable once
/// built: analysis never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SbomData {
    /// Document-level metadata
    pub document: DocumentMetadata,
    /// Packages in declaration order; identifiers may repeat in malformed input
    packages: Vec<Package>,
    /// Relationships in declaration order
    dependencies: Vec<Dependency>,
    /// Known vulnerabilities
    vulnerabilities: Vec<Vulnerability>,
}

impl SbomData {
    /// Create an empty document
    #[must_use]
    pub const fn new(document: DocumentMetadata) -> Self {
        Self {
            document,
            packages: Vec::new(),
            dependencies: Vec::new(),
            vulnerabilities: Vec::new(),
        }
    }

    /// Append a package.
    ///
    /// An empty name is the one hard violation rejected here; duplicate
    /// identifiers are accepted and surface later as flags and issues.
    pub fn add_package(&mut self, package: Package) -> Result<()> {
        if package.name.trim().is_empty() {
            return Err(SbomError::structural(
                self.packages.len(),
                format!("package '{}' has an empty name", package.id),
            ));
        }
        self.packages.push(package);
        Ok(())
    }

    /// Append a relationship
    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies.push(dependency);
    }

    /// Append a vulnerability
    pub fn add_vulnerability(&mut self, vulnerability: Vulnerability) {
        self.vulnerabilities.push(vulnerability);
    }

    /// Packages in declaration order
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Relationships in declaration order
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Vulnerabilities in declaration order
    #[must_use]
    pub fn vulnerabilities(&self) -> &[Vulnerability] {
        &self.vulnerabilities
    }

    /// Number of declared packages, duplicates included
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// First package declared with this identifier
    #[must_use]
    pub fn package(&self, id: &PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| &p.id == id)
    }

    /// Vulnerabilities recorded against a package
    pub fn vulnerabilities_for<'a>(
        &'a self,
        id: &'a PackageId,
    ) -> impl Iterator<Item = &'a Vulnerability> + 'a {
        self.vulnerabilities.iter().filter(move |v| &v.package_id == id)
    }

    /// Identifiers declared more than once, with their occurrence counts,
    /// in order of first declaration.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<(PackageId, usize)> {
        let mut counts: HashMap<&PackageId, usize> = HashMap::new();
        for pkg in &self.packages {
            *counts.entry(&pkg.id).or_insert(0) += 1;
        }

        let mut seen = std::collections::HashSet::new();
        self.packages
            .iter()
            .filter_map(|pkg| {
                let count = counts.get(&pkg.id).copied().unwrap_or(0);
                (count > 1 && seen.insert(&pkg.id)).then(|| (pkg.id.clone(), count))
            })
            .collect()
    }

    /// Stable content fingerprint of the whole document.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        serde_json::to_vec(self).map_or(0, |bytes| xxh3_64(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SbomFormat;

    fn doc() -> SbomData {
        SbomData::new(DocumentMetadata::new(SbomFormat::CycloneDx, "1.5"))
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut sbom = doc();
        sbom.add_package(Package::new("a", "alpha")).unwrap();
        let err = sbom.add_package(Package::new("b", "  ")).unwrap_err();
        match err {
            SbomError::Structural { index, .. } => assert_eq!(index, 1),
            other => panic!("expected structural error, got {other:?}"),
        }
        assert_eq!(sbom.package_count(), 1);
    }

    #[test]
    fn test_duplicate_ids_in_declaration_order() {
        let mut sbom = doc();
        for (id, name) in [("b", "beta"), ("a", "alpha"), ("b", "beta2"), ("a", "alpha2"), ("a", "alpha3")] {
            sbom.add_package(Package::new(id, name)).unwrap();
        }
        let dups = sbom.duplicate_ids();
        assert_eq!(
            dups,
            vec![(PackageId::new("b"), 2), (PackageId::new("a"), 3)]
        );
    }

    #[test]
    fn test_package_lookup_returns_first() {
        let mut sbom = doc();
        sbom.add_package(Package::new("a", "first")).unwrap();
        sbom.add_package(Package::new("a", "second")).unwrap();
        assert_eq!(sbom.package(&PackageId::new("a")).unwrap().name, "first");
    }

    #[test]
    fn test_content_hash_is_stable() {
        let mut sbom = doc();
        sbom.add_package(Package::new("a", "alpha")).unwrap();
        let copy = sbom.clone();
        assert_eq!(sbom.content_hash(), copy.content_hash());

        sbom.add_package(Package::new("b", "beta")).unwrap();
        assert_ne!(sbom.content_hash(), copy.content_hash());
    }
}
