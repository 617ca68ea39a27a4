//! Header module orchestrator.
//!
//! Converts a (possibly zone-filtered) column tree into the row-by-row
//! matrix of spanned header cells a rendering surface draws from. The matrix
//! is derived fresh on every layout pass and never mutated in place.

mod core;

pub use core::{HeaderCell, HeaderLevels, build_levels, collect_leaf_paths, max_header_depth};
