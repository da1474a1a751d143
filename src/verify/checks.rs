//! The verification checklist.
//!
//! Each check has a fixed failure outcome: issues for structural problems,
//! warnings for completeness gaps.

use super::result::{CheckCategory, CheckOutcome, CheckResult};
use crate::graph::{DependencyTree, GraphWarning};
use crate::model::{Package, SbomData, SbomFormat, SWID_SPEC_VERSION_PREFIX};
use std::collections::HashSet;

/// Names listed in a message before it is abbreviated
const MAX_LISTED: usize = 5;

/// Check identifiers in evaluation order
pub const CHECK_IDS: [&str; 17] = [
    "spec-version",
    "duplicate-ids",
    "vulnerability-references",
    "document-name",
    "creators",
    "created",
    "package-versions",
    "package-licenses",
    "license-expressions",
    "package-suppliers",
    "package-descriptions",
    "purl-format",
    "unresolved-references",
    "isolated-packages",
    "cycles",
    "natural-roots",
    "empty-document",
];

struct Check {
    id: &'static str,
    category: CheckCategory,
    failure: CheckOutcome,
}

impl Check {
    const fn issue(id: &'static str, category: CheckCategory) -> Self {
        Self {
            id,
            category,
            failure: CheckOutcome::Issue,
        }
    }

    const fn warning(id: &'static str, category: CheckCategory) -> Self {
        Self {
            id,
            category,
            failure: CheckOutcome::Warning,
        }
    }

    fn pass(&self, message: impl Into<String>) -> CheckResult {
        CheckResult {
            id: self.id.to_string(),
            category: self.category,
            outcome: CheckOutcome::Pass,
            message: message.into(),
            affected: Vec::new(),
        }
    }

    fn fail(&self, message: impl Into<String>, affected: Vec<String>) -> CheckResult {
        CheckResult {
            id: self.id.to_string(),
            category: self.category,
            outcome: self.failure,
            message: message.into(),
            affected,
        }
    }

    /// Fail when `affected` is non-empty
    fn from_affected(&self, affected: Vec<String>, what: &str, ok: &str) -> CheckResult {
        if affected.is_empty() {
            self.pass(ok)
        } else {
            let message = format!("{} {what}: {}", affected.len(), list(&affected));
            self.fail(message, affected)
        }
    }
}

fn list(items: &[String]) -> String {
    let shown = items
        .iter()
        .take(MAX_LISTED)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > MAX_LISTED {
        format!("{shown} and {} more", items.len() - MAX_LISTED)
    } else {
        shown
    }
}

fn packages_where(sbom: &SbomData, pred: impl Fn(&Package) -> bool) -> Vec<String> {
    sbom.packages()
        .iter()
        .filter(|p| pred(p))
        .map(|p| p.id.to_string())
        .collect()
}

pub(crate) fn run_all(sbom: &SbomData, tree: &DependencyTree) -> Vec<CheckResult> {
    vec![
        spec_version(sbom),
        duplicate_ids(sbom),
        vulnerability_references(sbom),
        document_name(sbom),
        creators(sbom),
        created(sbom),
        package_versions(sbom),
        package_licenses(sbom),
        license_expressions(sbom),
        package_suppliers(sbom),
        package_descriptions(sbom),
        purl_format(sbom),
        unresolved_references(tree),
        isolated_packages(sbom, tree),
        cycles(tree),
        natural_roots(tree),
        empty_document(sbom),
    ]
}

// ============================================================================
// Issues
// ============================================================================

fn spec_version(sbom: &SbomData) -> CheckResult {
    let check = Check::issue("spec-version", CheckCategory::Format);
    let version = sbom.document.spec_version.trim();
    let (ok, expected) = match sbom.document.format {
        SbomFormat::Spdx => (version.starts_with("SPDX-"), "SPDX-<major>.<minor>"),
        SbomFormat::CycloneDx => (version.starts_with("1."), "1.<minor>"),
        SbomFormat::Swid => (
            version.starts_with(SWID_SPEC_VERSION_PREFIX),
            SWID_SPEC_VERSION_PREFIX,
        ),
    };
    if ok {
        check.pass(format!("{} version '{version}'", sbom.document.format))
    } else {
        check.fail(
            format!(
                "invalid {} version '{version}', expected {expected}",
                sbom.document.format
            ),
            Vec::new(),
        )
    }
}

fn duplicate_ids(sbom: &SbomData) -> CheckResult {
    let check = Check::issue("duplicate-ids", CheckCategory::Packages);
    let duplicates: Vec<String> = sbom
        .duplicate_ids()
        .into_iter()
        .map(|(id, _)| id.to_string())
        .collect();
    check.from_affected(
        duplicates,
        "package identifiers declared more than once",
        "package identifiers are unique",
    )
}

fn vulnerability_references(sbom: &SbomData) -> CheckResult {
    let check = Check::issue("vulnerability-references", CheckCategory::Vulnerabilities);
    let declared: HashSet<_> = sbom.packages().iter().map(|p| &p.id).collect();
    let dangling: Vec<String> = sbom
        .vulnerabilities()
        .iter()
        .filter(|v| !declared.contains(&v.package_id))
        .map(|v| format!("{} -> {}", v.id, v.package_id))
        .collect();
    check.from_affected(
        dangling,
        "vulnerabilities reference undeclared packages",
        "every vulnerability references a declared package",
    )
}

// ============================================================================
// Warnings: document metadata
// ============================================================================

fn document_name(sbom: &SbomData) -> CheckResult {
    let check = Check::warning("document-name", CheckCategory::Document);
    match sbom.document.name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => check.pass(format!("document name '{name}'")),
        None => check.fail("missing document name", Vec::new()),
    }
}

fn creators(sbom: &SbomData) -> CheckResult {
    let check = Check::warning("creators", CheckCategory::Document);
    if sbom.document.creators.is_empty() {
        check.fail("missing creator information", Vec::new())
    } else {
        check.pass(format!("{} creators", sbom.document.creators.len()))
    }
}

fn created(sbom: &SbomData) -> CheckResult {
    let check = Check::warning("created", CheckCategory::Document);
    match sbom.document.created {
        Some(ts) => check.pass(format!("created {}", ts.to_rfc3339())),
        None => check.fail("missing creation timestamp", Vec::new()),
    }
}

// ============================================================================
// Warnings: packages
// ============================================================================

fn package_versions(sbom: &SbomData) -> CheckResult {
    Check::warning("package-versions", CheckCategory::Packages).from_affected(
        packages_where(sbom, |p| !p.has_version()),
        "packages without version information",
        "every package has a version",
    )
}

fn package_licenses(sbom: &SbomData) -> CheckResult {
    Check::warning("package-licenses", CheckCategory::Packages).from_affected(
        packages_where(sbom, |p| !p.has_license()),
        "packages without license information",
        "every package declares a license",
    )
}

fn license_expressions(sbom: &SbomData) -> CheckResult {
    let invalid: Vec<String> = sbom
        .packages()
        .iter()
        .flat_map(|p| {
            p.licenses
                .iter()
                .filter(|l| !l.is_valid_spdx)
                .map(move |l| format!("{}: {}", p.id, l.identifier))
        })
        .collect();
    Check::warning("license-expressions", CheckCategory::Packages).from_affected(
        invalid,
        "licenses are not valid SPDX expressions",
        "every license is a valid SPDX expression",
    )
}

fn package_suppliers(sbom: &SbomData) -> CheckResult {
    Check::warning("package-suppliers", CheckCategory::Packages).from_affected(
        packages_where(sbom, |p| !p.has_supplier()),
        "packages without supplier",
        "every package names a supplier",
    )
}

fn package_descriptions(sbom: &SbomData) -> CheckResult {
    Check::warning("package-descriptions", CheckCategory::Packages).from_affected(
        packages_where(sbom, |p| !p.has_description()),
        "packages without description",
        "every package has a description",
    )
}

fn purl_format(sbom: &SbomData) -> CheckResult {
    Check::warning("purl-format", CheckCategory::Packages).from_affected(
        packages_where(sbom, |p| matches!(p.parsed_purl(), Some(Err(_)))),
        "packages with malformed PURLs",
        "every PURL is well-formed",
    )
}

// ============================================================================
// Warnings: dependencies
// ============================================================================

fn unresolved_references(tree: &DependencyTree) -> CheckResult {
    let mut affected: Vec<String> = tree.unresolved().map(|n| n.id.to_string()).collect();
    affected.extend(tree.warnings().iter().filter_map(|w| match w {
        GraphWarning::MissingEndpoint { index, missing } => {
            Some(format!("dependency #{index} (no {missing})"))
        }
        _ => None,
    }));
    Check::warning("unresolved-references", CheckCategory::Dependencies).from_affected(
        affected,
        "dependency references could not be resolved",
        "every dependency references a declared package",
    )
}

fn isolated_packages(sbom: &SbomData, tree: &DependencyTree) -> CheckResult {
    let check = Check::warning("isolated-packages", CheckCategory::Dependencies);
    if sbom.package_count() < 2 {
        return check.pass("single-package document");
    }
    let mut seen = HashSet::new();
    let isolated: Vec<String> = sbom
        .packages()
        .iter()
        .filter(|p| seen.insert(&p.id))
        .filter(|p| tree.children_of(&p.id).is_empty() && tree.dependents_of(&p.id).is_empty())
        .map(|p| p.id.to_string())
        .collect();
    check.from_affected(
        isolated,
        "packages without any dependency relationship",
        "every package takes part in a dependency relationship",
    )
}

fn cycles(tree: &DependencyTree) -> CheckResult {
    let cycles: Vec<String> = tree
        .cycles()
        .iter()
        .map(|cycle| {
            let mut path: Vec<&str> = cycle.iter().map(|id| id.value()).collect();
            if let Some(first) = cycle.first() {
                path.push(first.value());
            }
            path.join(" -> ")
        })
        .collect();
    Check::warning("cycles", CheckCategory::Dependencies).from_affected(
        cycles,
        "circular dependencies",
        "no circular dependencies",
    )
}

fn natural_roots(tree: &DependencyTree) -> CheckResult {
    let check = Check::warning("natural-roots", CheckCategory::Dependencies);
    if tree.roots_fallback() {
        check.fail(
            "every package has an inbound dependency; all packages were treated as roots",
            Vec::new(),
        )
    } else {
        check.pass(format!("{} root packages", tree.roots().len()))
    }
}

fn empty_document(sbom: &SbomData) -> CheckResult {
    let check = Check::warning("empty-document", CheckCategory::Document);
    if sbom.package_count() == 0 {
        check.fail("document declares no packages", Vec::new())
    } else {
        check.pass(format!("{} packages", sbom.package_count()))
    }
}
