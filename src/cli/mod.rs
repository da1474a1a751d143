//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler returns the process exit code; errors propagate as
//! [`anyhow::Error`] and map to [`exit_codes::ERROR`].

mod analyze;
mod output;
mod package;
mod sarif;
mod tree;
mod verify;

pub use analyze::{run_analyze, AnalyzeOptions};
pub use output::{
    exit_codes, load_document, should_use_color, write_output, AnalyzeFormat, LoadedDocument,
    OutputTarget, VerifyFormat, ViewFormat,
};
pub use package::{run_check_package, run_list, run_search, PackageOptions};
pub use tree::{run_tree, TreeOptions};
pub use verify::{run_verify, VerifyOptions};
