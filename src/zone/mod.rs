//! Zone module orchestrator.
//!
//! A zone is one of the three physically separate rendering surfaces of the
//! grid. Partitioning is a pure function of the column tree; the three
//! results are pairwise disjoint at the leaf level and together cover every
//! leaf in the tree.

mod core;

pub use core::{Zone, partition};
