#![no_main]
use libfuzzer_sys::fuzz_target;

/// Whatever parses must survive graph building, analysis and verification.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(sbom) = sbom_analyzer::parsers::parse_sbom_str(s) else {
        return;
    };
    if let Ok(tree) = sbom_analyzer::graph::build_tree(&sbom) {
        let _ = sbom_analyzer::analysis::analyze(&sbom, &tree);
        let _ = sbom_analyzer::verify::verify(&sbom, &tree);
        let _ = tree.render_text(Some(8));
    }
});
