#![no_main]
use libfuzzer_sys::fuzz_target;

/// Confidence-based format detection without parsing.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = sbom_analyzer::parsers::detect_format(s);
    }
});
