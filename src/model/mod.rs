//! Canonical model for normalized SBOMs.
//!
//! Every format parser produces an [`SbomData`]; the graph builder, analyzer,
//! verifier and package lookup only ever read it. Hard invariants (non-empty
//! package names) are checked at construction, soft ones (duplicate ids,
//! dangling references, missing optional fields) are left for the
//! verification pass.

mod dependency;
mod identifiers;
mod license;
mod metadata;
mod package;
mod sbom;
mod vulnerability;

pub use dependency::*;
pub use identifiers::*;
pub use license::*;
pub use metadata::*;
pub use package::*;
pub use sbom::*;
pub use vulnerability::*;
