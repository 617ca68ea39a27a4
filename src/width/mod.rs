//! Display width and reflow helpers.
//!
//! Cell content carries arbitrary ANSI styling, so every width decision in
//! the grid goes through [`display_width`] rather than `str::len`. The same
//! wrapping routine backs both rendering and row-height measurement, which is
//! what keeps measured heights honest against what actually gets drawn.

mod utils;

pub use utils::{display_width, measured_height, wrap_to_width};
