//! Render module orchestrator.
//!
//! Everything between the layout model and the terminal: pluggable per-cell
//! rendering, the per-zone body surfaces the height synchronizer works on,
//! composition of header + body text blocks, and the ANSI flush of dirty
//! surfaces.

mod core;

pub use core::{
    CellContext, CellRenderer, CellRendererRegistry, GridRenderer, RendererSettings, ZoneSurface,
    compose_surface, default_cell_text, skeleton_rows,
};
