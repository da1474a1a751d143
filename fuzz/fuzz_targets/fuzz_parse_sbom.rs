#![no_main]
use libfuzzer_sys::fuzz_target;

/// Arbitrary UTF-8 through detection and whichever parser wins.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = sbom_analyzer::parsers::parse_sbom_str(s);
    }
});
