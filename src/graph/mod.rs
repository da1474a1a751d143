//! Dependency graph construction.
//!
//! Turns the pairwise relationships of an [`SbomData`](crate::model::SbomData)
//! into a [`DependencyTree`]: roots, shortest-path depths, cycles and
//! per-node flags (`unresolved`, `duplicate`, `orphan`).
//!
//! All traversals are iterative, so deep or cyclic input cannot exhaust the
//! stack.

mod builder;
mod cycles;
mod tree;

pub use builder::{build_tree, GraphBuilder};
pub use tree::{DependencyTree, Endpoint, GraphWarning, NodeFlags, TreeNode};
