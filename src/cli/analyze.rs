//! Analyze command handler.
//!
//! Implements the `analyze` subcommand: statistics, completeness score and
//! recommendations for one document.

use super::output::{
    display_name, exit_codes, load_document, to_json, write_output, AnalyzeFormat, OutputTarget,
    Palette,
};
use crate::analysis::{AnalysisResult, Analyzer, FieldCoverage};
use crate::config::AppConfig;
use crate::model::Severity;
use anyhow::Result;
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Options for the `analyze` command
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub sbom_path: PathBuf,
    pub format: AnalyzeFormat,
    pub output_file: Option<PathBuf>,
    pub min_score: Option<f64>,
    pub color: bool,
}

/// Run the analyze command, returning the desired exit code.
pub fn run_analyze(options: AnalyzeOptions, config: &AppConfig) -> Result<i32> {
    let analyzer = Analyzer::new(config.analysis.clone())?;
    let document = load_document(&options.sbom_path, config)?;
    let result = analyzer.analyze(&document.sbom, &document.tree);

    let source = display_name(&options.sbom_path);
    let text = match options.format {
        AnalyzeFormat::Json => to_json(&json!({
            "tool": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "sbom": source,
            "analysis": result,
        }))?,
        AnalyzeFormat::Markdown => format_markdown(&result, &source),
        AnalyzeFormat::Text => format_text(&result, &source, Palette::new(options.color)),
    };
    write_output(&text, &OutputTarget::from_option(options.output_file))?;

    if let Some(threshold) = options.min_score {
        if result.completeness_score < threshold {
            tracing::error!(
                score = format_args!("{:.1}", result.completeness_score),
                threshold,
                "Completeness score is below the minimum"
            );
            return Ok(exit_codes::CHECK_FAILED);
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn coverage_line(label: &str, coverage: FieldCoverage) -> String {
    format!(
        "  {label:<17}{:>6} ({:.1}%)",
        coverage.count, coverage.percent
    )
}

fn format_text(result: &AnalysisResult, source: &str, palette: Palette) -> String {
    let mut lines = Vec::new();
    let reset = palette.reset();

    lines.push(format!("{}SBOM Analysis: {source}{reset}", palette.bold()));
    lines.push(format!(
        "Document: {} ({} {})",
        result.document_name.as_deref().unwrap_or("(unnamed)"),
        result.format,
        result.spec_version
    ));
    lines.push(format!("Fingerprint: {}", result.content_hash));
    lines.push(String::new());

    lines.push(format!(
        "Completeness: {}{:.1}/100{reset}",
        palette.for_score(result.completeness_score),
        result.completeness_score
    ));
    lines.push(String::new());

    let stats = &result.statistics;
    lines.push(format!(
        "Packages: {} ({} unique)",
        result.total_packages, result.unique_packages
    ));
    lines.push(coverage_line("with version", stats.with_version));
    lines.push(coverage_line("with license", stats.with_licenses));
    lines.push(coverage_line("with supplier", stats.with_supplier));
    lines.push(coverage_line("with description", stats.with_description));
    lines.push(coverage_line("with PURL", stats.with_purl));
    lines.push(coverage_line("with deps", stats.with_dependencies));
    lines.push(coverage_line("with vulns", stats.with_vulnerabilities));
    lines.push(String::new());

    let depth = &result.depth;
    lines.push("Dependency Graph:".to_string());
    lines.push(format!("  Roots:          {}", depth.root_count));
    lines.push(format!("  Edges:          {}", depth.total_edges));
    lines.push(format!("  Max depth:      {}", depth.max_depth));
    lines.push(format!("  Average depth:  {:.2}", depth.average_depth));
    lines.push(format!("  Orphans:        {}", depth.orphan_count));
    lines.push(format!("  Cycles:         {}", depth.cycle_count));
    lines.push(format!("  Unresolved:     {}", depth.unresolved_count));
    lines.push(String::new());

    lines.push(format!("Licenses ({} unique):", result.unique_licenses.len()));
    for (license, count) in &result.license_distribution {
        lines.push(format!("  {license:<30}{count:>6}"));
    }
    lines.push(String::new());

    lines.push("Ecosystems:".to_string());
    for (ecosystem, count) in &result.ecosystem_distribution {
        lines.push(format!("  {ecosystem:<30}{count:>6}"));
    }
    lines.push(String::new());

    lines.push(format!(
        "Vulnerabilities: {}",
        result.vulnerability_summary.total
    ));
    for (severity, count) in &result.vulnerability_summary.by_severity {
        let color = match severity {
            Severity::Critical | Severity::High if *count > 0 => palette.red(),
            Severity::Medium if *count > 0 => palette.yellow(),
            _ => "",
        };
        let reset = if color.is_empty() { "" } else { reset };
        lines.push(format!("  {color}{:<10}{count:>6}{reset}", severity.label()));
    }

    if !result.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        for rec in &result.recommendations {
            lines.push(format!("  [P{}] {}", rec.priority, rec.message));
        }
    }

    lines.join("\n")
}

fn format_markdown(result: &AnalysisResult, source: &str) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# SBOM Analysis: {source}\n");
    let _ = writeln!(md, "| Property | Value |");
    let _ = writeln!(md, "|----------|-------|");
    let _ = writeln!(
        md,
        "| Document | {} |",
        result.document_name.as_deref().unwrap_or("(unnamed)")
    );
    let _ = writeln!(md, "| Format | {} {} |", result.format, result.spec_version);
    let _ = writeln!(
        md,
        "| Completeness | {:.1}/100 |",
        result.completeness_score
    );
    let _ = writeln!(
        md,
        "| Packages | {} ({} unique) |",
        result.total_packages, result.unique_packages
    );
    let _ = writeln!(md, "| Max depth | {} |", result.depth.max_depth);
    let _ = writeln!(md, "| Cycles | {} |", result.depth.cycle_count);
    let _ = writeln!(md, "| Orphans | {} |", result.depth.orphan_count);

    let _ = writeln!(md, "\n## Licenses\n");
    let _ = writeln!(md, "| License | Packages |");
    let _ = writeln!(md, "|---------|----------|");
    for (license, count) in &result.license_distribution {
        let _ = writeln!(md, "| {license} | {count} |");
    }

    let _ = writeln!(md, "\n## Vulnerabilities\n");
    let _ = writeln!(md, "| Severity | Count |");
    let _ = writeln!(md, "|----------|-------|");
    for (severity, count) in &result.vulnerability_summary.by_severity {
        let _ = writeln!(md, "| {} | {count} |", severity.label());
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(md, "\n## Recommendations\n");
        for rec in &result.recommendations {
            let _ = writeln!(md, "- **P{}** {}", rec.priority, rec.message);
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::graph::build_tree;
    use crate::model::{DocumentMetadata, License, Package, SbomData, SbomFormat};

    fn result() -> AnalysisResult {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
        sbom.add_package(Package::new("a", "a").with_license(License::new("MIT")))
            .unwrap();
        let tree = build_tree(&sbom).unwrap();
        analyze(&sbom, &tree)
    }

    #[test]
    fn test_text_without_color_has_no_escapes() {
        let text = format_text(&result(), "sbom.json", Palette::new(false));
        assert!(text.contains("SBOM Analysis: sbom.json"));
        assert!(text.contains("Completeness:"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_markdown_lists_every_severity() {
        let md = format_markdown(&result(), "sbom.json");
        for severity in Severity::ALL {
            assert!(md.contains(&format!("| {} | 0 |", severity.label())));
        }
    }
}
