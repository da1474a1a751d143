//! Dependency tree command handler (`dep`).

use super::output::{
    display_name, exit_codes, load_document, to_json, write_output, OutputTarget, ViewFormat,
};
use crate::config::AppConfig;
use crate::graph::DependencyTree;
use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

/// Options for the `dep` command
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub sbom_path: PathBuf,
    pub format: ViewFormat,
    pub output_file: Option<PathBuf>,
    /// Deepest level rendered in text output
    pub max_depth: Option<usize>,
}

pub fn run_tree(options: TreeOptions, config: &AppConfig) -> Result<i32> {
    let document = load_document(&options.sbom_path, config)?;
    let tree = &document.tree;

    let text = match options.format {
        ViewFormat::Json => to_json(&json!({
            "sbom": display_name(&options.sbom_path),
            "tree": tree,
        }))?,
        ViewFormat::Text => format_text(tree, options.max_depth),
    };
    write_output(&text, &OutputTarget::from_option(options.output_file))?;
    Ok(exit_codes::SUCCESS)
}

fn format_text(tree: &DependencyTree, max_depth: Option<usize>) -> String {
    let mut out = tree.render_text(max_depth);
    out.push_str(&format!(
        "\n{} packages, {} edges, max depth {}, {} cycles",
        tree.node_count(),
        tree.total_edges(),
        tree.max_depth(),
        tree.cycles().len()
    ));
    if tree.roots_fallback() {
        out.push_str("\nnote: no package is free of inbound edges; every package is shown as a root");
    }
    for warning in tree.warnings() {
        out.push_str(&format!("\nwarning: {warning}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tree;
    use crate::model::{Dependency, DocumentMetadata, Package, SbomData, SbomFormat};

    #[test]
    fn test_summary_and_warnings_follow_tree() {
        let mut sbom = SbomData::new(DocumentMetadata::new(SbomFormat::Spdx, "SPDX-2.3"));
        sbom.add_package(Package::new("a", "a")).unwrap();
        sbom.add_dependency(Dependency::depends_on("a", "ghost"));
        let tree = build_tree(&sbom).unwrap();

        let text = format_text(&tree, None);
        assert!(text.contains("2 packages, 1 edges, max depth 1, 0 cycles"));
        assert!(text.contains("warning:"));
    }
}
