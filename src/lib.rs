//! Data-grid layout engine MVP.
//!
//! Turns a nested column configuration into three independently rendered
//! surfaces (left-pinned, regular, right-pinned) with depth-aligned spanned
//! headers, cascade-on-write pin state, and row heights kept in lockstep
//! across the surfaces as data, widths, or loading state change.

pub mod column;
pub mod error;
pub mod geometry;
pub mod header;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod sync;
pub mod width;
pub mod zone;

pub use column::{Align, ColumnNode, ColumnTree, ColumnWidth, PinState};
pub use error::{GridError, Result};
pub use geometry::{Rect, Size};
pub use header::{HeaderCell, HeaderLevels, build_levels, collect_leaf_paths, max_header_depth};
pub use layout::{MIN_TRACK_WIDTH, TrackSize, distribute, natural_widths, solve_zone_rects};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, event_with_fields, json_kv,
};
pub use metrics::{GridMetrics, MetricSnapshot};
pub use registry::{SurfaceRegistry, SurfaceState};
pub use render::{
    CellContext, CellRenderer, CellRendererRegistry, GridRenderer, RendererSettings, ZoneSurface,
    compose_surface, default_cell_text, skeleton_rows,
};
pub use runtime::{GridConfig, GridEvent, GridRuntime, PinChange, PinListener};
pub use sync::{RowHeightSet, RowHeightSync, RowSurface, SyncTrigger};
pub use width::{display_width, measured_height, wrap_to_width};
pub use zone::{Zone, partition};
