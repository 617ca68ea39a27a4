//! Column module orchestrator.
//!
//! The column tree is the single piece of mutable state in the engine:
//! consumers hand over a configuration forest, the tree keeps a defensive
//! copy, and pin writes cascade through it in place. Everything else in the
//! crate derives from this tree and is recomputed, never patched.

mod core;

pub use core::{Align, ColumnNode, ColumnTree, ColumnWidth, PinState};
