//! Dependency relationships between packages.

use super::PackageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship between two packages.
///
/// Formats disagree on direction ("A `DEV_DEPENDENCY_OF` B" in SPDX); parsers
/// normalize so that `source` always depends on `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    DependsOn,
    DevDependsOn,
    BuildDependsOn,
    TestDependsOn,
    RuntimeDependsOn,
    OptionalDependsOn,
    Contains,
    Describes,
    Other(String),
}

impl DependencyKind {
    /// Whether this relationship participates in the dependency graph.
    #[must_use]
    pub const fn is_dependency(&self) -> bool {
        matches!(
            self,
            Self::DependsOn
                | Self::DevDependsOn
                | Self::BuildDependsOn
                | Self::TestDependsOn
                | Self::RuntimeDependsOn
                | Self::OptionalDependsOn
        )
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependsOn => write!(f, "depends-on"),
            Self::DevDependsOn => write!(f, "dev-depends-on"),
            Self::BuildDependsOn => write!(f, "build-depends-on"),
            Self::TestDependsOn => write!(f, "test-depends-on"),
            Self::RuntimeDependsOn => write!(f, "runtime-depends-on"),
            Self::OptionalDependsOn => write!(f, "optional-depends-on"),
            Self::Contains => write!(f, "contains"),
            Self::Describes => write!(f, "describes"),
            Self::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// A directed relationship: `source` depends on (or contains) `target`.
///
/// Endpoints are optional so a malformed record survives normalization and
/// can be reported by position instead of being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependent package
    pub source: Option<PackageId>,
    /// Package depended upon
    pub target: Option<PackageId>,
    /// Relationship kind
    pub kind: DependencyKind,
}

impl Dependency {
    /// Create a depends-on relationship
    pub fn depends_on(source: impl Into<PackageId>, target: impl Into<PackageId>) -> Self {
        Self::new(source, target, DependencyKind::DependsOn)
    }

    /// Create a relationship of the given kind
    pub fn new(
        source: impl Into<PackageId>,
        target: impl Into<PackageId>,
        kind: DependencyKind,
    ) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            kind,
        }
    }

    /// Source endpoint, treating a blank identifier as missing
    #[must_use]
    pub fn source_id(&self) -> Option<&PackageId> {
        self.source.as_ref().filter(|id| !id.is_blank())
    }

    /// Target endpoint, treating a blank identifier as missing
    #[must_use]
    pub fn target_id(&self) -> Option<&PackageId> {
        self.target.as_ref().filter(|id| !id.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_class() {
        assert!(DependencyKind::DependsOn.is_dependency());
        assert!(DependencyKind::DevDependsOn.is_dependency());
        assert!(!DependencyKind::Contains.is_dependency());
        assert!(!DependencyKind::Other("GENERATES".to_string()).is_dependency());
    }

    #[test]
    fn test_blank_endpoints_are_missing() {
        let dep = Dependency::depends_on("", "b");
        assert!(dep.source_id().is_none());
        assert_eq!(dep.target_id().map(PackageId::value), Some("b"));
    }

    #[test]
    fn test_kind_display_is_kebab_case() {
        assert_eq!(DependencyKind::BuildDependsOn.to_string(), "build-depends-on");
        assert_eq!(
            serde_json::to_string(&DependencyKind::DependsOn).unwrap(),
            "\"depends-on\""
        );
    }
}
