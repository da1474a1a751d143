//! Verify command handler.

use super::output::{
    display_name, exit_codes, load_document, to_json, write_output, OutputTarget, Palette,
    VerifyFormat,
};
use super::sarif;
use crate::config::AppConfig;
use crate::verify::{CheckCategory, CheckOutcome, VerificationResult, VerificationStatus, Verifier};
use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

/// Options for the `verify` command
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub sbom_path: PathBuf,
    pub format: VerifyFormat,
    pub output_file: Option<PathBuf>,
    pub color: bool,
}

/// Run the verify command; exits with [`exit_codes::CHECK_FAILED`] when any
/// check reports an issue.
pub fn run_verify(options: VerifyOptions, config: &AppConfig) -> Result<i32> {
    let verifier = Verifier::new(config.verification.clone())?;
    let document = load_document(&options.sbom_path, config)?;
    let result = verifier.verify(&document.sbom, &document.tree);

    let source = display_name(&options.sbom_path);
    let text = match options.format {
        VerifyFormat::Json => to_json(&json!({
            "tool": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "sbom": source,
            "verification": result,
        }))?,
        VerifyFormat::Sarif => to_json(&sarif::build_report(
            &result,
            &options.sbom_path.to_string_lossy(),
        ))?,
        VerifyFormat::Text => format_text(&result, &source, Palette::new(options.color)),
    };
    write_output(&text, &OutputTarget::from_option(options.output_file))?;

    if result.is_valid() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::CHECK_FAILED)
    }
}

fn format_text(result: &VerificationResult, source: &str, palette: Palette) -> String {
    let mut lines = Vec::new();
    let reset = palette.reset();

    let status_color = match result.status {
        VerificationStatus::Valid => palette.green(),
        VerificationStatus::Incomplete => palette.yellow(),
        VerificationStatus::Malformed => palette.red(),
    };

    lines.push(format!("{}SBOM Verification: {source}{reset}", palette.bold()));
    lines.push(format!("Format: {} {}", result.format, result.spec_version));
    lines.push(format!(
        "Status: {status_color}{}{reset}",
        result.status.to_string().to_uppercase()
    ));
    lines.push(format!(
        "Score:  {}{:.1}/100{reset}  ({} of {} checks passed)",
        palette.for_score(result.score),
        result.score,
        result.passed,
        result.checks.len()
    ));

    for category in [
        CheckCategory::Format,
        CheckCategory::Document,
        CheckCategory::Packages,
        CheckCategory::Dependencies,
        CheckCategory::Vulnerabilities,
    ] {
        let checks: Vec<_> = result
            .checks
            .iter()
            .filter(|c| c.category == category)
            .collect();
        if checks.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", category.name()));
        for check in checks {
            let (marker, color) = match check.outcome {
                CheckOutcome::Pass => ("PASS ", palette.green()),
                CheckOutcome::Warning => ("WARN ", palette.yellow()),
                CheckOutcome::Issue => ("ISSUE", palette.red()),
            };
            lines.push(format!("  {color}{marker}{reset} {}", check.message));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tree;
    use crate::model::{DocumentMetadata, Package, SbomData, SbomFormat};
    use crate::verify::verify;

    #[test]
    fn test_text_report_groups_checks() {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
        sbom.add_package(Package::new("a", "a")).unwrap();
        let result = verify(&sbom, &build_tree(&sbom).unwrap());
        let text = format_text(&result, "doc.spdx.json", Palette::new(false));

        assert!(text.contains("Status: INCOMPLETE"));
        assert!(text.contains("Packages:"));
        assert!(text.contains("WARN  1 packages without version information: a"));
    }
}
