//! Layout module orchestrator.
//!
//! Width solving for leaf columns and placement of the three zone surfaces
//! inside the container. Pinned zones take their natural width; the regular
//! zone flexes into whatever remains between them.

mod core;

pub use core::{MIN_TRACK_WIDTH, TrackSize, distribute, natural_widths, solve_zone_rects};
