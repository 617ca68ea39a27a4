//! Sync module orchestrator.
//!
//! Row heights must agree across the three independently rendered zone
//! surfaces. That cross-surface consistency lives here as one dedicated
//! component with explicit trigger points, instead of being recalculated ad
//! hoc inside rendering code.

mod core;

pub use core::{RowHeightSet, RowHeightSync, RowSurface, SyncTrigger};
