//! Grid runtime: owns the column tree and row data, reacts to external
//! events, and keeps the three zone surfaces laid out, height-synced, and
//! flushed to the terminal.
//!
//! All recomputation is synchronous inside the triggering update; the only
//! deferred work is the row-height pass, which coalesces into the next
//! render so bursts of triggers produce a single measurement.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use serde_json::{Value, json};

use crate::column::{ColumnNode, ColumnTree, ColumnWidth, PinState};
use crate::error::Result;
use crate::geometry::Size;
use crate::header::{HeaderLevels, build_levels, max_header_depth};
use crate::layout::{TrackSize, distribute, natural_widths, solve_zone_rects};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::GridMetrics;
use crate::registry::SurfaceRegistry;
use crate::render::{
    CellRendererRegistry, GridRenderer, ZoneSurface, compose_surface, skeleton_rows,
};
use crate::sync::{RowHeightSync, RowSurface, SyncTrigger};
use crate::width::display_width;
use crate::zone::{Zone, partition};

/// Widest an auto column will grow from content alone.
const MAX_AUTO_NATURAL: u16 = 24;

/// Configuration knobs for the grid runtime.
#[derive(Clone)]
pub struct GridConfig {
    /// Placeholder rows substituted per zone while loading.
    pub skeleton_rows: usize,
    /// Record field carrying the stable per-row identity. Opaque to the
    /// engine; forwarded so embedders can diff rows.
    pub row_key: String,
    /// Interval between synthetic tick events in the live loop.
    pub tick_interval: Duration,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<GridMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            skeleton_rows: 20,
            row_key: "id".to_string(),
            tick_interval: Duration::from_millis(200),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "grid::runtime.metrics".to_string(),
        }
    }
}

impl GridConfig {
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(GridMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<GridMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// High-level events consumed by the runtime.
#[derive(Debug, Clone)]
pub enum GridEvent {
    /// Container size changed; width changes reflow wrapped cells.
    Resize(Size),
    RowsReplaced(Vec<Value>),
    ColumnsReplaced(Vec<ColumnNode>),
    LoadingChanged(bool),
    /// The pin affordance was clicked on a column header.
    PinToggled { key: String },
    /// Direct pin write; the only route to `PinState::Right`.
    PinSet { key: String, state: PinState },
    Key(KeyEvent),
    Tick { elapsed: Duration },
}

/// Notification emitted on every applied pin operation so a host can
/// persist the preference.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PinChange {
    pub column_key: String,
    pub new_pin_state: PinState,
}

/// Observer for pin-change notifications.
pub trait PinListener {
    fn on_pin_change(&mut self, change: &PinChange);
}

impl<F> PinListener for F
where
    F: FnMut(&PinChange),
{
    fn on_pin_change(&mut self, change: &PinChange) {
        self(change)
    }
}

pub struct GridRuntime {
    tree: ColumnTree,
    /// Pin writes applied so far, re-applied onto every wholesale column
    /// replace so user pins survive configuration swaps. Last write per key
    /// wins; order preserved.
    pin_overrides: Vec<(String, PinState)>,
    rows: Vec<Value>,
    loading: bool,
    container: Size,
    header_depth: usize,
    headers: BTreeMap<Zone, HeaderLevels>,
    surfaces: BTreeMap<Zone, ZoneSurface>,
    registry: SurfaceRegistry,
    renderer: GridRenderer,
    cell_renderers: CellRendererRegistry,
    sync: RowHeightSync,
    listeners: Vec<Box<dyn PinListener>>,
    config: GridConfig,
    should_exit: bool,
    redraw_requested: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl GridRuntime {
    pub fn new(
        columns: Vec<ColumnNode>,
        renderer: GridRenderer,
        initial_size: Size,
    ) -> Result<Self> {
        let tree = ColumnTree::new(columns)?;
        let mut runtime = Self {
            tree,
            pin_overrides: Vec::new(),
            rows: Vec::new(),
            loading: false,
            container: initial_size,
            header_depth: 0,
            headers: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            registry: SurfaceRegistry::new(),
            renderer,
            cell_renderers: CellRendererRegistry::new(),
            sync: RowHeightSync::new(),
            listeners: Vec::new(),
            config: GridConfig::default(),
            should_exit: false,
            redraw_requested: true,
            start_instant: None,
            last_metrics_emit: None,
        };
        runtime.recompute_layout();
        runtime.sync.schedule(SyncTrigger::ColumnsReplaced);
        Ok(runtime)
    }

    pub fn config_mut(&mut self) -> &mut GridConfig {
        &mut self.config
    }

    pub fn cell_renderers_mut(&mut self) -> &mut CellRendererRegistry {
        &mut self.cell_renderers
    }

    pub fn add_pin_listener<L>(&mut self, listener: L)
    where
        L: PinListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn columns(&self) -> &[ColumnNode] {
        self.tree.roots()
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn header_depth(&self) -> usize {
        self.header_depth
    }

    pub fn headers(&self, zone: Zone) -> Option<&HeaderLevels> {
        self.headers.get(&zone)
    }

    pub fn surface(&self, zone: Zone) -> Option<&ZoneSurface> {
        self.surfaces.get(&zone)
    }

    pub fn has_zone(&self, zone: Zone) -> bool {
        self.surfaces.contains_key(&zone)
    }

    /// The identity value of a record, per the configured row key.
    pub fn row_identity<'a>(&self, row: &'a Value) -> Option<&'a Value> {
        row.get(self.config.row_key.as_str())
    }

    // ---- external state changes -------------------------------------------

    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
        self.recompute_layout();
        self.sync.schedule(SyncTrigger::RowsReplaced);
        self.redraw_requested = true;
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading == loading {
            return;
        }
        self.loading = loading;
        self.recompute_layout();
        self.sync.schedule(SyncTrigger::LoadingChanged);
        self.redraw_requested = true;
    }

    /// Wholesale configuration replace; previously applied pin operations
    /// are cascaded onto the fresh copy.
    pub fn set_columns(&mut self, columns: Vec<ColumnNode>) -> Result<()> {
        let mut tree = ColumnTree::new(columns)?;
        for (key, state) in &self.pin_overrides {
            tree.set_pin(key, *state);
        }
        self.tree = tree;
        self.recompute_layout();
        self.sync.schedule(SyncTrigger::ColumnsReplaced);
        self.redraw_requested = true;
        Ok(())
    }

    pub fn resize(&mut self, size: Size) {
        if self.container == size {
            return;
        }
        self.container = size;
        self.recompute_layout();
        self.sync.schedule(SyncTrigger::ContainerResized);
        self.redraw_requested = true;
        self.log_runtime_event(LogLevel::Info, "resized", [
            json_kv("width", json!(size.width)),
            json_kv("height", json!(size.height)),
        ]);
    }

    /// Pin affordance click. No-ops on unknown or unpinnable columns.
    pub fn toggle_pin(&mut self, key: &str) -> Option<PinState> {
        let state = self.tree.toggle_pin(key)?;
        self.after_pin_write(key, state);
        Some(state)
    }

    /// Direct pin write; the route to `PinState::Right`. No-ops on unknown
    /// keys.
    pub fn set_pin(&mut self, key: &str, state: PinState) -> bool {
        if !self.tree.set_pin(key, state) {
            return false;
        }
        self.after_pin_write(key, state);
        true
    }

    fn after_pin_write(&mut self, key: &str, state: PinState) {
        self.pin_overrides.retain(|(existing, _)| existing != key);
        self.pin_overrides.push((key.to_string(), state));

        let change = PinChange {
            column_key: key.to_string(),
            new_pin_state: state,
        };
        for listener in &mut self.listeners {
            listener.on_pin_change(&change);
        }
        self.log_runtime_event(LogLevel::Info, "pin_changed", [
            json_kv("column", json!(change.column_key)),
            json_kv("state", json!(format!("{:?}", state))),
        ]);

        self.recompute_layout();
        self.sync.schedule(SyncTrigger::ColumnsReplaced);
        self.redraw_requested = true;
    }

    // ---- event loop --------------------------------------------------------

    pub fn run(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap(stdout)?;
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = self
                .config
                .tick_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                let raw = event::read()?;
                if let Some(grid_event) = Self::map_event(raw) {
                    self.dispatch_event(grid_event)?;
                    self.render_if_needed(stdout)?;
                    if self.should_exit {
                        break;
                    }
                }
            }

            if last_tick.elapsed() >= self.config.tick_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.dispatch_event(GridEvent::Tick { elapsed })?;
                self.render_if_needed(stdout)?;
            }

            self.maybe_emit_metrics();
        }

        self.finalize();
        Ok(())
    }

    pub fn run_scripted<I>(&mut self, stdout: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = GridEvent>,
    {
        self.bootstrap(stdout)?;
        for grid_event in events {
            self.dispatch_event(grid_event)?;
            self.render_if_needed(stdout)?;
            if self.should_exit {
                break;
            }
        }
        self.finalize();
        Ok(())
    }

    pub fn dispatch_event(&mut self, grid_event: GridEvent) -> Result<()> {
        let kind = Self::describe_event(&grid_event);
        match grid_event {
            GridEvent::Resize(size) => self.resize(size),
            GridEvent::RowsReplaced(rows) => self.set_rows(rows),
            GridEvent::ColumnsReplaced(columns) => self.set_columns(columns)?,
            GridEvent::LoadingChanged(flag) => self.set_loading(flag),
            GridEvent::PinToggled { key } => {
                self.toggle_pin(&key);
            }
            GridEvent::PinSet { key, state } => {
                self.set_pin(&key, state);
            }
            GridEvent::Key(key) => self.handle_key(key),
            GridEvent::Tick { .. } => {}
        }
        self.record_event_metric();
        self.log_runtime_event(LogLevel::Debug, "event_dispatched", [json_kv(
            "event",
            json!(kind),
        )]);
        self.maybe_emit_metrics();
        Ok(())
    }

    pub fn render_if_needed(&mut self, stdout: &mut impl Write) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }
        self.redraw_requested = false;

        self.run_height_pass();

        let zones: Vec<Zone> = self.surfaces.keys().copied().collect();
        for zone in zones {
            // A zero-extent container solves no rects; skip until it attaches.
            if !self.registry.contains(zone) {
                continue;
            }
            if let (Some(levels), Some(surface)) =
                (self.headers.get(&zone), self.surfaces.get(&zone))
            {
                let content = compose_surface(levels, surface);
                self.registry.apply_content(zone, content)?;
            }
        }

        let dirty = self.registry.take_dirty();
        if !dirty.is_empty() {
            self.renderer.render(stdout, &dirty)?;
            self.record_render_metric(dirty.len());
            self.log_runtime_event(LogLevel::Debug, "render_completed", [json_kv(
                "dirty_surfaces",
                json!(dirty.len()),
            )]);
        }

        Ok(())
    }

    // ---- internals ---------------------------------------------------------

    /// Re-derive everything from the current tree: partitions, header
    /// matrices, widths, surfaces, registry rects. Derived structures are
    /// rebuilt from scratch, never patched.
    fn recompute_layout(&mut self) {
        self.header_depth = max_header_depth(self.tree.roots());
        self.headers.clear();

        let flattened = self.tree.flatten();
        let mut zone_data: Vec<(Zone, Vec<ColumnNode>, Vec<Vec<String>>)> = Vec::new();
        for zone in Zone::ALL {
            let leaves: Vec<ColumnNode> = flattened
                .iter()
                .filter(|leaf| zone.matches(leaf.pinned))
                .cloned()
                .collect();
            if leaves.is_empty() {
                continue;
            }
            let subtree = partition(self.tree.roots(), zone);
            self.headers
                .insert(zone, build_levels(&subtree, Some(self.header_depth)));
            let cells = self.body_cells(&leaves);
            zone_data.push((zone, leaves, cells));
        }

        // Pinned zones keep their natural width; the regular zone flexes
        // into whatever container width remains between them.
        let mut zone_widths: BTreeMap<Zone, u16> = BTreeMap::new();
        let mut solved: BTreeMap<Zone, Vec<u16>> = BTreeMap::new();
        for (zone, leaves, cells) in &zone_data {
            if *zone == Zone::Regular {
                continue;
            }
            let widths = natural_widths(&track_sizes(leaves, cells));
            zone_widths.insert(*zone, surface_total(&widths));
            solved.insert(*zone, widths);
        }
        for (zone, leaves, cells) in &zone_data {
            if *zone != Zone::Regular {
                continue;
            }
            let pinned_total: u16 = zone_widths.values().copied().sum();
            let separators = leaves.len().saturating_sub(1) as u16;
            let available = self
                .container
                .width
                .saturating_sub(pinned_total)
                .saturating_sub(separators);
            let widths = distribute(&track_sizes(leaves, cells), available);
            zone_widths.insert(*zone, surface_total(&widths));
            solved.insert(*zone, widths);
        }

        let rects = solve_zone_rects(self.container, &zone_widths);
        self.registry.sync_layout(&rects);

        self.surfaces.clear();
        for (zone, leaves, cells) in zone_data {
            let widths = solved.remove(&zone).unwrap_or_default();
            let mut surface = ZoneSurface::new(zone, leaves, widths);
            surface.set_rows(cells);
            self.surfaces.insert(zone, surface);
        }

        self.record_layout_metric();
    }

    fn body_cells(&self, leaves: &[ColumnNode]) -> Vec<Vec<String>> {
        if self.loading {
            return skeleton_rows(leaves.len(), self.config.skeleton_rows);
        }
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                leaves
                    .iter()
                    .map(|leaf| self.cell_renderers.cell_text(row, leaf, index))
                    .collect()
            })
            .collect()
    }

    /// Deferred measure+apply over every present surface. Skipped (and kept
    /// pending) while the container has no extent.
    fn run_height_pass(&mut self) {
        if !self.sync.is_pending() || self.container.is_empty() {
            return;
        }
        let trigger = self.sync.pending_trigger();

        let applied = {
            let mut handles: Vec<&mut dyn RowSurface> = self
                .surfaces
                .values_mut()
                .map(|surface| surface as &mut dyn RowSurface)
                .collect();
            self.sync.run_if_pending(&mut handles)
        };

        if let Some(set) = applied {
            self.record_sync_metric(set.row_count());
            self.log_runtime_event(LogLevel::Debug, "row_heights_synced", [
                json_kv("rows", json!(set.row_count())),
                json_kv(
                    "trigger",
                    json!(trigger.map(|t| t.label()).unwrap_or("none")),
                ),
            ]);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Esc {
            self.should_exit = true;
            self.log_runtime_event(LogLevel::Info, "exit_requested", std::iter::empty());
        }
    }

    fn map_event(raw: CrosstermEvent) -> Option<GridEvent> {
        match raw {
            CrosstermEvent::Key(key) => Some(GridEvent::Key(key)),
            CrosstermEvent::Resize(width, height) => {
                Some(GridEvent::Resize(Size::new(width, height)))
            }
            _ => None,
        }
    }

    fn bootstrap(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.should_exit = false;
        self.redraw_requested = true;
        self.ensure_metrics_initialized();
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log_runtime_event(LogLevel::Info, "grid_started", [
            json_kv("zones", json!(self.surfaces.len())),
            json_kv("rows", json!(self.rows.len())),
            json_kv("header_depth", json!(self.header_depth)),
        ]);
        self.render_if_needed(stdout)
    }

    fn finalize(&mut self) {
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log_runtime_event(LogLevel::Info, "grid_stopped", [json_kv(
            "uptime_ms",
            json!(uptime_ms as u64),
        )]);
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && self.config.metrics_interval > Duration::ZERO {
            self.config.metrics = Some(Arc::new(Mutex::new(GridMetrics::new())));
        }
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let log_event = event_with_fields(level, "grid::runtime", message, fields);
            let _ = logger.log_event(log_event);
        }
    }

    fn record_event_metric(&mut self) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_event();
            }
        }
    }

    fn record_layout_metric(&mut self) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_layout_pass();
            }
        }
    }

    fn record_sync_metric(&mut self, rows: usize) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_sync_pass(rows);
            }
        }
    }

    fn record_render_metric(&mut self, dirty_count: usize) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_render(dirty_count);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() || self.config.metrics_interval == Duration::ZERO {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => return,
            _ => self.last_metrics_emit = Some(now),
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = self.config.metrics_target.as_str();
                let snapshot = guard.snapshot(uptime).to_log_event(target);
                let _ = logger.log_event(snapshot);
            }
        }
    }

    fn describe_event(grid_event: &GridEvent) -> &'static str {
        match grid_event {
            GridEvent::Resize(_) => "resize",
            GridEvent::RowsReplaced(_) => "rows_replaced",
            GridEvent::ColumnsReplaced(_) => "columns_replaced",
            GridEvent::LoadingChanged(_) => "loading_changed",
            GridEvent::PinToggled { .. } => "pin_toggled",
            GridEvent::PinSet { .. } => "pin_set",
            GridEvent::Key(_) => "key",
            GridEvent::Tick { .. } => "tick",
        }
    }
}

/// Sizing tracks for a zone's leaf columns: fixed widths pass through, auto
/// columns measure their title and cell content.
fn track_sizes(leaves: &[ColumnNode], cells: &[Vec<String>]) -> Vec<TrackSize> {
    leaves
        .iter()
        .enumerate()
        .map(|(col_idx, leaf)| match leaf.width {
            ColumnWidth::Fixed(width) => TrackSize::Fixed(width),
            ColumnWidth::Auto => {
                let mut natural = display_width(&leaf.title) as u16;
                for row in cells {
                    if let Some(text) = row.get(col_idx) {
                        natural = natural.max(display_width(text) as u16);
                    }
                }
                TrackSize::Auto {
                    natural: natural.min(MAX_AUTO_NATURAL),
                }
            }
        })
        .collect()
}

/// Rendered width of a surface: cell widths plus single-cell separators.
fn surface_total(widths: &[u16]) -> u16 {
    let cells: u32 = widths.iter().map(|w| *w as u32).sum();
    let separators = widths.len().saturating_sub(1) as u32;
    (cells + separators).min(u16::MAX as u32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use std::sync::mpsc;

    fn nested_columns() -> Vec<ColumnNode> {
        vec![
            ColumnNode::new("id", "ID"),
            ColumnNode::new("personal", "Personal").with_children(vec![
                ColumnNode::new("name", "Name"),
                ColumnNode::new("email", "Email"),
            ]),
        ]
    }

    fn sample_rows() -> Vec<Value> {
        vec![
            json!({ "id": 1, "name": "Ada Lovelace", "email": "ada@example.com" }),
            json!({ "id": 2, "name": "Grace Hopper", "email": "grace@example.com" }),
        ]
    }

    fn runtime() -> GridRuntime {
        let mut runtime = GridRuntime::new(
            nested_columns(),
            GridRenderer::with_default(),
            Size::new(80, 24),
        )
        .unwrap();
        runtime.set_rows(sample_rows());
        runtime
    }

    fn leaf_keys(runtime: &GridRuntime, zone: Zone) -> Vec<String> {
        runtime
            .surface(zone)
            .map(|surface| {
                surface
                    .columns()
                    .iter()
                    .map(|leaf| leaf.key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn unpinned_grid_renders_a_single_regular_surface() {
        let runtime = runtime();
        assert!(runtime.has_zone(Zone::Regular));
        assert!(!runtime.has_zone(Zone::Left));
        assert!(!runtime.has_zone(Zone::Right));
        assert_eq!(leaf_keys(&runtime, Zone::Regular), ["id", "name", "email"]);
    }

    #[test]
    fn pinning_a_group_moves_its_leaves_and_omits_empty_zones() {
        let mut runtime = runtime();
        runtime.set_pin("personal", PinState::Left);

        assert_eq!(leaf_keys(&runtime, Zone::Left), ["name", "email"]);
        assert_eq!(leaf_keys(&runtime, Zone::Regular), ["id"]);
        assert!(!runtime.has_zone(Zone::Right), "right surface is omitted");

        // All three header matrices share the whole-tree depth.
        assert_eq!(runtime.header_depth(), 2);
        assert_eq!(runtime.headers(Zone::Left).unwrap().len(), 2);
        assert_eq!(runtime.headers(Zone::Regular).unwrap().len(), 2);
    }

    #[test]
    fn pin_listeners_receive_every_applied_change() {
        let (tx, rx) = mpsc::channel();
        let mut runtime = runtime();
        runtime.add_pin_listener(move |change: &PinChange| {
            tx.send(change.clone()).unwrap();
        });

        runtime.toggle_pin("id");
        runtime.toggle_pin("id");
        runtime.toggle_pin("missing");

        let changes: Vec<PinChange> = rx.try_iter().collect();
        assert_eq!(changes.len(), 2, "unknown keys emit nothing");
        assert_eq!(changes[0].new_pin_state, PinState::Left);
        assert_eq!(changes[1].new_pin_state, PinState::None);
    }

    #[test]
    fn pin_overrides_survive_column_replace() {
        let mut runtime = runtime();
        runtime.toggle_pin("personal");
        assert_eq!(leaf_keys(&runtime, Zone::Left), ["name", "email"]);

        runtime.set_columns(nested_columns()).unwrap();
        assert_eq!(
            leaf_keys(&runtime, Zone::Left),
            ["name", "email"],
            "user pin lost on configuration replace"
        );
    }

    #[test]
    fn loading_substitutes_skeleton_rows() {
        let mut runtime = runtime();
        runtime.config_mut().skeleton_rows = 5;
        runtime.set_loading(true);

        let surface = runtime.surface(Zone::Regular).unwrap();
        assert_eq!(surface.row_count(), 5);

        runtime.set_loading(false);
        let surface = runtime.surface(Zone::Regular).unwrap();
        assert_eq!(surface.row_count(), 2);
    }

    #[test]
    fn heights_equalize_across_zones_after_a_render() {
        let mut runtime = GridRuntime::new(
            vec![
                ColumnNode::new("id", "ID").with_width(4).pinned(PinState::Left),
                ColumnNode::new("note", "Note").with_width(10),
            ],
            GridRenderer::with_default(),
            Size::new(40, 12),
        )
        .unwrap();
        runtime.set_rows(vec![
            json!({ "id": 1, "note": "short" }),
            json!({ "id": 2, "note": "a note long enough to wrap over several lines" }),
        ]);

        let mut sink = Vec::new();
        runtime.render_if_needed(&mut sink).unwrap();

        let left = runtime.surface(Zone::Left).unwrap();
        let regular = runtime.surface(Zone::Regular).unwrap();
        assert_eq!(left.row_height(0), regular.row_height(0));
        assert_eq!(left.row_height(1), regular.row_height(1));
        assert!(
            regular.row_height(1) > 1,
            "wrapped note must be taller than one line"
        );
        // The narrow id column inherited the tall row.
        assert_eq!(left.row_height(1), regular.natural_row_height(1));
    }

    #[test]
    fn zero_size_container_defers_the_height_pass() {
        let mut runtime = GridRuntime::new(
            vec![ColumnNode::new("id", "ID")],
            GridRenderer::with_default(),
            Size::new(0, 0),
        )
        .unwrap();
        runtime.set_rows(vec![json!({ "id": 1 })]);

        let mut sink = Vec::new();
        runtime.render_if_needed(&mut sink).unwrap();
        assert!(
            runtime.sync.is_pending(),
            "pass must stay pending until the container attaches"
        );

        runtime.resize(Size::new(40, 10));
        runtime.render_if_needed(&mut sink).unwrap();
        assert!(!runtime.sync.is_pending());
    }

    #[test]
    fn scripted_run_renders_and_counts_metrics() {
        let sink = MemorySink::new();
        let mut runtime = GridRuntime::new(
            nested_columns(),
            GridRenderer::with_default(),
            Size::new(60, 16),
        )
        .unwrap();
        let handle = {
            let config = runtime.config_mut();
            config.logger = Some(Logger::new(sink.clone()));
            config.metrics_interval = Duration::ZERO;
            config.enable_metrics();
            config.metrics_handle().unwrap()
        };

        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![
                GridEvent::RowsReplaced(sample_rows()),
                GridEvent::PinToggled {
                    key: "personal".to_string(),
                },
                GridEvent::Resize(Size::new(50, 16)),
            ])
            .unwrap();

        assert!(!out.is_empty(), "scripted run must write to the terminal");
        let snapshot = handle.lock().unwrap().snapshot(Duration::ZERO);
        assert_eq!(snapshot.events, 3);
        assert!(snapshot.layout_passes >= 3);
        assert!(snapshot.sync_passes >= 1);

        let messages: Vec<String> = sink.events().into_iter().map(|e| e.message).collect();
        assert!(messages.iter().any(|m| m == "grid_started"));
        assert!(messages.iter().any(|m| m == "pin_changed"));
        assert!(messages.iter().any(|m| m == "grid_stopped"));
    }

    #[test]
    fn duplicate_keys_fail_construction_and_replace() {
        let duplicate = vec![
            ColumnNode::new("id", "ID"),
            ColumnNode::new("id", "ID again"),
        ];
        assert!(
            GridRuntime::new(
                duplicate.clone(),
                GridRenderer::with_default(),
                Size::new(40, 10),
            )
            .is_err()
        );

        let mut runtime = runtime();
        assert!(runtime.set_columns(duplicate).is_err());
    }

    #[test]
    fn right_pin_is_reachable_programmatically_only() {
        let mut runtime = runtime();
        assert!(runtime.set_pin("id", PinState::Right));
        assert_eq!(leaf_keys(&runtime, Zone::Right), ["id"]);

        // The affordance collapses right back to none.
        assert_eq!(runtime.toggle_pin("id"), Some(PinState::None));
        assert!(!runtime.has_zone(Zone::Right));
    }

    #[test]
    fn row_identity_uses_the_configured_key() {
        let mut runtime = runtime();
        runtime.config_mut().row_key = "email".to_string();
        let row = json!({ "id": 7, "email": "ada@example.com" });
        assert_eq!(
            runtime.row_identity(&row),
            Some(&json!("ada@example.com"))
        );
    }
}
