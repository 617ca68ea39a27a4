use std::collections::HashMap;
use std::io::Write;

use serde_json::Value;

use crate::column::{Align, ColumnNode};
use crate::error::Result;
use crate::geometry::Rect;
use crate::header::HeaderLevels;
use crate::registry::SurfaceState;
use crate::sync::RowSurface;
use crate::width::{display_width, measured_height, wrap_to_width};
use crate::zone::Zone;

const COLUMN_SEPARATOR: &str = " ";
const SKELETON_CELL: &str = "░░░░░░";

/// Everything a custom cell renderer gets to look at.
pub struct CellContext<'a> {
    pub row: &'a Value,
    /// The record field named by the column key, when present.
    pub value: Option<&'a Value>,
    pub column: &'a ColumnNode,
    pub row_index: usize,
}

/// Capability interface for custom cell content.
///
/// The layout core never inspects what a renderer produces beyond treating
/// it as display text; styling escapes are fine, widths are measured
/// ANSI-aware.
pub trait CellRenderer {
    fn render_cell(&self, ctx: &CellContext<'_>) -> String;
}

impl<F> CellRenderer for F
where
    F: Fn(&CellContext<'_>) -> String,
{
    fn render_cell(&self, ctx: &CellContext<'_>) -> String {
        self(ctx)
    }
}

/// Lookup table from cell tag to renderer, supplied by the embedding
/// application.
#[derive(Default)]
pub struct CellRendererRegistry {
    entries: HashMap<String, Box<dyn CellRenderer>>,
}

impl CellRendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R>(&mut self, tag: impl Into<String>, renderer: R)
    where
        R: CellRenderer + 'static,
    {
        self.entries.insert(tag.into(), Box::new(renderer));
    }

    /// Resolve a column's renderer: explicit `cell_tag` first, then the
    /// column key itself.
    pub fn lookup(&self, column: &ColumnNode) -> Option<&dyn CellRenderer> {
        column
            .cell_tag
            .as_deref()
            .and_then(|tag| self.entries.get(tag))
            .or_else(|| self.entries.get(&column.key))
            .map(|boxed| boxed.as_ref())
    }

    pub fn has_renderer(&self, column: &ColumnNode) -> bool {
        self.lookup(column).is_some()
    }

    /// Rendered text for one cell, falling back to the record field.
    pub fn cell_text(&self, row: &Value, column: &ColumnNode, row_index: usize) -> String {
        let value = row.get(&column.key);
        match self.lookup(column) {
            Some(renderer) => renderer.render_cell(&CellContext {
                row,
                value,
                column,
                row_index,
            }),
            None => default_cell_text(row, column),
        }
    }
}

/// Default cell rendering: the record field named by the column key.
pub fn default_cell_text(row: &Value, column: &ColumnNode) -> String {
    match row.get(&column.key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Placeholder body shown while the data layer reports loading.
pub fn skeleton_rows(column_count: usize, row_count: usize) -> Vec<Vec<String>> {
    (0..row_count)
        .map(|_| vec![SKELETON_CELL.to_string(); column_count])
        .collect()
}

/// One zone's rendered body: leaf columns, solved widths, cell text, and the
/// explicit heights the synchronizer applies.
#[derive(Debug, Clone)]
pub struct ZoneSurface {
    zone: Zone,
    columns: Vec<ColumnNode>,
    widths: Vec<u16>,
    cells: Vec<Vec<String>>,
    heights: Vec<Option<u16>>,
}

impl ZoneSurface {
    pub fn new(zone: Zone, columns: Vec<ColumnNode>, widths: Vec<u16>) -> Self {
        Self {
            zone,
            columns,
            widths,
            cells: Vec::new(),
            heights: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[ColumnNode] {
        &self.columns
    }

    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    pub fn set_widths(&mut self, widths: Vec<u16>) {
        self.widths = widths;
    }

    /// Replace the body wholesale. Explicit heights are discarded; the next
    /// synchronizer pass re-establishes them.
    pub fn set_rows(&mut self, cells: Vec<Vec<String>>) {
        self.heights = vec![None; cells.len()];
        self.cells = cells;
    }

    pub fn total_width(&self) -> u16 {
        let cells: u32 = self.widths.iter().map(|w| *w as u32).sum();
        let separators = self.widths.len().saturating_sub(1) as u32
            * display_width(COLUMN_SEPARATOR) as u32;
        (cells + separators).min(u16::MAX as u32) as u16
    }

    pub fn row_height(&self, index: usize) -> u16 {
        self.heights
            .get(index)
            .copied()
            .flatten()
            .unwrap_or_else(|| self.natural(index))
    }

    fn natural(&self, index: usize) -> u16 {
        let Some(row) = self.cells.get(index) else {
            return 1;
        };
        row.iter()
            .zip(&self.widths)
            .map(|(text, width)| measured_height(text, *width))
            .max()
            .unwrap_or(1)
    }
}

impl RowSurface for ZoneSurface {
    fn zone(&self) -> Zone {
        self.zone
    }

    fn row_count(&self) -> usize {
        self.cells.len()
    }

    fn natural_row_height(&self, index: usize) -> u16 {
        self.natural(index)
    }

    fn clear_row_height(&mut self, index: usize) {
        if let Some(slot) = self.heights.get_mut(index) {
            *slot = None;
        }
    }

    fn set_row_height(&mut self, index: usize, height: u16) {
        if let Some(slot) = self.heights.get_mut(index) {
            *slot = Some(height);
        }
    }
}

/// Compose one zone's full text block: spanned header rows, a rule line,
/// then body rows at their applied heights.
pub fn compose_surface(levels: &HeaderLevels, surface: &ZoneSurface) -> String {
    let mut lines = header_lines(levels, surface.widths());

    if !lines.is_empty() {
        lines.push("─".repeat(surface.total_width() as usize));
    }

    for index in 0..surface.row_count() {
        body_lines(surface, index, &mut lines);
    }

    lines.join("\n")
}

/// Lay the span matrix out over the leaf column widths.
///
/// Cells claim leaf slots left to right; a `row_span` greater than one
/// blocks the claimed slots on the levels below, which then render blank as
/// the visual continuation of the spanning cell.
fn header_lines(levels: &HeaderLevels, widths: &[u16]) -> Vec<String> {
    let leaf_count = widths.len();
    let depth = levels.len();
    if depth == 0 || leaf_count == 0 {
        return Vec::new();
    }

    let mut occupied = vec![vec![false; leaf_count]; depth];
    let mut placed: Vec<Vec<(usize, usize, usize)>> = vec![Vec::new(); depth];

    for (level, cells) in levels.iter().enumerate() {
        let mut slot = 0usize;
        for (cell_idx, cell) in cells.iter().enumerate() {
            while slot < leaf_count && occupied[level][slot] {
                slot += 1;
            }
            if slot >= leaf_count {
                break;
            }
            let span = cell.col_span.min(leaf_count - slot);
            let until = (level + cell.row_span).min(depth);
            for row in occupied.iter_mut().take(until).skip(level) {
                for flag in row.iter_mut().skip(slot).take(span) {
                    *flag = true;
                }
            }
            placed[level].push((slot, span, cell_idx));
            slot += span;
        }
    }

    let mut lines = Vec::with_capacity(depth);
    for (level, cells) in levels.iter().enumerate() {
        let mut segments = Vec::new();
        let mut slot = 0usize;
        let mut next_placed = placed[level].iter().peekable();
        while slot < leaf_count {
            match next_placed.peek() {
                Some(&&(start, span, cell_idx)) if start == slot => {
                    next_placed.next();
                    let span_width = span_width(widths, slot, span);
                    let cell = &cells[cell_idx];
                    segments.push(align_to_width(&cell.title, span_width, cell.align));
                    slot += span;
                }
                _ => {
                    segments.push(" ".repeat(widths[slot] as usize));
                    slot += 1;
                }
            }
        }
        lines.push(segments.join(COLUMN_SEPARATOR));
    }

    lines
}

fn span_width(widths: &[u16], slot: usize, span: usize) -> u16 {
    let cells: u32 = widths[slot..slot + span].iter().map(|w| *w as u32).sum();
    let separators = span.saturating_sub(1) as u32 * display_width(COLUMN_SEPARATOR) as u32;
    (cells + separators).min(u16::MAX as u32) as u16
}

fn body_lines(surface: &ZoneSurface, index: usize, out: &mut Vec<String>) {
    let height = surface.row_height(index) as usize;
    let row = &surface.cells[index];

    let mut wrapped: Vec<Vec<String>> = Vec::with_capacity(row.len());
    for (text, width) in row.iter().zip(surface.widths()) {
        wrapped.push(wrap_to_width(text, *width));
    }

    for line_idx in 0..height {
        let mut segments = Vec::with_capacity(row.len());
        for (col_idx, width) in surface.widths().iter().enumerate() {
            let text = wrapped
                .get(col_idx)
                .and_then(|cell| cell.get(line_idx))
                .map(String::as_str)
                .unwrap_or("");
            let align = surface
                .columns
                .get(col_idx)
                .map(|column| column.align)
                .unwrap_or_default();
            segments.push(align_to_width(text, *width, align));
        }
        out.push(segments.join(COLUMN_SEPARATOR));
    }
}

/// Truncate and pad `text` to exactly `width` display cells.
fn align_to_width(text: &str, width: u16, align: Align) -> String {
    let width = width as usize;
    let mut kept = String::new();
    for ch in text.chars() {
        kept.push(ch);
        if display_width(&kept) > width {
            kept.pop();
            break;
        }
    }

    let pad = width.saturating_sub(display_width(&kept));
    match align {
        Align::Left => format!("{}{}", kept, " ".repeat(pad)),
        Align::Right => format!("{}{}", " ".repeat(pad), kept),
        Align::Center => {
            let before = pad / 2;
            format!("{}{}{}", " ".repeat(before), kept, " ".repeat(pad - before))
        }
    }
}

/// Renderer runtime parameters.
#[derive(Debug, Clone, Default)]
pub struct RendererSettings {
    pub restore_cursor: Option<(u16, u16)>,
}

/// ANSI escape renderer writing dirty zone surfaces to a terminal handle.
pub struct GridRenderer {
    settings: RendererSettings,
}

impl GridRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn render(
        &mut self,
        writer: &mut impl Write,
        dirty: &[(Zone, SurfaceState)],
    ) -> Result<()> {
        for (_zone, state) in dirty {
            render_surface(writer, state)?;
        }

        if let Some((row, col)) = self.settings.restore_cursor {
            write!(writer, "\x1b[{};{}H", row + 1, col + 1)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn render_surface(writer: &mut impl Write, state: &SurfaceState) -> Result<()> {
    let Rect {
        x,
        y,
        width,
        height,
    } = state.rect;

    if width == 0 || height == 0 {
        return Ok(());
    }

    let mut lines: Vec<String> = state.content.lines().map(str::to_string).collect();
    lines.truncate(height as usize);
    while lines.len() < height as usize {
        lines.push(String::new());
    }

    for (offset, line) in lines.iter_mut().enumerate() {
        fit_line(line, width);
        write!(writer, "\x1b[{};{}H", y + offset as u16 + 1, x + 1)?;
        write!(writer, "{}", line)?;
    }

    Ok(())
}

fn fit_line(line: &mut String, width: u16) {
    while (display_width(line) as u16) > width {
        line.pop();
    }
    while (display_width(line) as u16) < width {
        line.push(' ');
    }
}
