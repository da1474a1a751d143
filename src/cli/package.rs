//! Package command handlers: `check-pkg`, `search` and `list`.

use super::output::{
    display_name, exit_codes, load_document, to_json, write_output, OutputTarget, ViewFormat,
};
use crate::config::AppConfig;
use crate::lookup::{LookupResult, MatchKind, PackageInfo, PackageLookup};
use crate::model::Package;
use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

/// Widest name column in package tables
const MAX_NAME_WIDTH: usize = 40;

/// Options shared by the package commands
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub sbom_path: PathBuf,
    pub format: ViewFormat,
    pub output_file: Option<PathBuf>,
}

/// Look up one package; exits with [`exit_codes::NOT_FOUND`] on a miss
pub fn run_check_package(options: PackageOptions, name: &str, config: &AppConfig) -> Result<i32> {
    let document = load_document(&options.sbom_path, config)?;
    let lookup = PackageLookup::new(&document.sbom, &document.tree, config.lookup.clone())?;
    let result = lookup.find(name);

    let text = match options.format {
        ViewFormat::Json => to_json(&result)?,
        ViewFormat::Text => match &result {
            LookupResult::Found(info) => format_info(info, name),
            LookupResult::NotFound { query, suggestion } => {
                let mut text = format!("Package '{query}' not found");
                if let Some(s) = suggestion {
                    text.push_str(&format!(
                        "\nDid you mean '{}'? (similarity {:.2})",
                        s.name, s.score
                    ));
                }
                text
            }
        },
    };
    write_output(&text, &OutputTarget::from_option(options.output_file))?;

    if result.is_found() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::NOT_FOUND)
    }
}

/// Substring search over names and descriptions
pub fn run_search(options: PackageOptions, term: &str, config: &AppConfig) -> Result<i32> {
    let document = load_document(&options.sbom_path, config)?;
    let lookup = PackageLookup::new(&document.sbom, &document.tree, config.lookup.clone())?;
    let matches = lookup.search(term);
    tracing::debug!(term, matches = matches.len(), "Package search");

    let text = match options.format {
        ViewFormat::Json => to_json(&json!({
            "sbom": display_name(&options.sbom_path),
            "term": term,
            "packages": matches,
        }))?,
        ViewFormat::Text if matches.is_empty() => format!("No packages match '{term}'"),
        ViewFormat::Text => format_table(&matches),
    };
    write_output(&text, &OutputTarget::from_option(options.output_file))?;
    Ok(exit_codes::SUCCESS)
}

/// All packages in declaration order
pub fn run_list(options: PackageOptions, config: &AppConfig) -> Result<i32> {
    let document = load_document(&options.sbom_path, config)?;
    let packages: Vec<&Package> = document.sbom.packages().iter().collect();

    let text = match options.format {
        ViewFormat::Json => to_json(&json!({
            "sbom": display_name(&options.sbom_path),
            "packages": packages,
        }))?,
        ViewFormat::Text => format_table(&packages),
    };
    write_output(&text, &OutputTarget::from_option(options.output_file))?;
    Ok(exit_codes::SUCCESS)
}

/// Truncate to `width` terminal columns, then pad
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    if text.width() > width {
        for ch in text.chars() {
            let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push('~');
        used += 1;
    } else {
        out.push_str(text);
        used = text.width();
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn format_table(packages: &[&Package]) -> String {
    let name_width = packages
        .iter()
        .map(|p| p.name.width())
        .max()
        .unwrap_or(4)
        .clamp(4, MAX_NAME_WIDTH);

    let mut lines = vec![format!("{}  {:<16}LICENSE", fit("NAME", name_width), "VERSION")];
    for package in packages {
        let licenses = package
            .licenses
            .iter()
            .map(|l| l.identifier.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "{}  {:<16}{}",
            fit(&package.name, name_width),
            package.version.as_deref().unwrap_or("-"),
            if licenses.is_empty() { "-" } else { &licenses }
        ));
    }
    lines.push(format!("\n{} packages", packages.len()));
    lines.join("\n")
}

fn format_info(info: &PackageInfo, query: &str) -> String {
    let package = &info.package;
    let mut lines = Vec::new();

    if info.match_kind == MatchKind::Fuzzy {
        lines.push(format!(
            "No exact match for '{query}'; closest package (similarity {:.2}):",
            info.score
        ));
    }
    lines.push(format!("Package: {}", package.display_name()));
    lines.push(format!("  ID:          {}", package.id));
    if let Some(purl) = &package.purl {
        lines.push(format!("  PURL:        {purl}"));
    }
    if let Some(supplier) = &package.supplier {
        lines.push(format!("  Supplier:    {supplier}"));
    }
    if let Some(description) = &package.description {
        lines.push(format!("  Description: {description}"));
    }
    lines.push(format!(
        "  Licenses:    {}",
        if info.licenses.is_empty() {
            "-".to_string()
        } else {
            info.licenses.join(", ")
        }
    ));
    if let Some(depth) = info.depth {
        lines.push(format!("  Depth:       {depth}"));
    }
    if info.flags.orphan {
        lines.push("  Orphan:      unreachable from every root".to_string());
    }
    if info.flags.in_cycle {
        lines.push("  Cycle:       part of a circular dependency".to_string());
    }

    lines.push(String::new());
    lines.push(format!("Dependencies ({}):", info.dependencies.len()));
    for dep in &info.dependencies {
        let version = dep.version.as_deref().map(|v| format!("@{v}")).unwrap_or_default();
        let marker = if dep.unresolved { " [unresolved]" } else { "" };
        lines.push(format!("  - {}{version}{marker}", dep.name));
    }
    lines.push(format!(
        "Dependents ({} direct, {} transitive):",
        info.dependents.len(),
        info.transitive_dependents
    ));
    for dep in &info.dependents {
        lines.push(format!("  - {}", dep.name));
    }

    if !info.vulnerabilities.is_empty() {
        lines.push(format!("Vulnerabilities ({}):", info.vulnerabilities.len()));
        for vuln in &info.vulnerabilities {
            lines.push(format!("  - {} [{}]", vuln.id, vuln.severity.label()));
        }
    }

    lines.join("\n")
}
