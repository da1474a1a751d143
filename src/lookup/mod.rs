//! Package lookup.
//!
//! Resolves a possibly misspelled package name to a declared package and
//! gathers its relationships, licenses and vulnerabilities. A miss is a
//! normal [`LookupResult::NotFound`], optionally carrying the closest name
//! as a hint; hints are never substituted for the query.

mod finder;
mod similarity;

pub use finder::{
    find, LookupResult, MatchKind, PackageInfo, PackageLookup, RelatedPackage, Suggestion,
};
pub use similarity::{edit_similarity, name_similarity, token_similarity};
