//! SBOM verification.
//!
//! Runs a fixed checklist over a document and its dependency tree. Each
//! check passes, or fails as either an **issue** (structural problem) or a
//! **warning** (missing optional data):
//!
//! | Check | Failure |
//! |-------|---------|
//! | `spec-version` | issue |
//! | `duplicate-ids` | issue |
//! | `vulnerability-references` | issue |
//! | document name, creators, created | warning |
//! | package versions, licenses, suppliers, descriptions, PURLs | warning |
//! | unresolved references, isolated packages, cycles, natural roots | warning |
//! | `empty-document` | warning |
//!
//! The score starts at 100 and loses a configurable penalty per failed
//! check, never dropping below 0.

mod checks;
mod result;
mod verifier;

pub use checks::CHECK_IDS;
pub use result::{
    CheckCategory, CheckOutcome, CheckResult, VerificationResult, VerificationStatus,
};
pub use verifier::{verify, Verifier};
