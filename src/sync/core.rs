use crate::zone::Zone;

/// What caused a height pass to be scheduled. Carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    ColumnsReplaced,
    RowsReplaced,
    LoadingChanged,
    ContainerResized,
}

impl SyncTrigger {
    pub fn label(self) -> &'static str {
        match self {
            SyncTrigger::ColumnsReplaced => "columns_replaced",
            SyncTrigger::RowsReplaced => "rows_replaced",
            SyncTrigger::LoadingChanged => "loading_changed",
            SyncTrigger::ContainerResized => "container_resized",
        }
    }
}

/// Per-row maxima applied by the last pass. Recomputed every pass and kept
/// only for observability; never fed back into measurement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowHeightSet(pub Vec<u16>);

impl RowHeightSet {
    pub fn row_count(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|h| *h as u32).sum()
    }
}

/// A zone's rendered body, as seen by the height synchronizer.
///
/// `natural_row_height` must report the content-driven height with any
/// previously applied explicit height ignored once cleared; the reset phase
/// guarantees rows can shrink back down, not just grow.
pub trait RowSurface {
    fn zone(&self) -> Zone;
    fn row_count(&self) -> usize;
    fn natural_row_height(&self, index: usize) -> u16;
    fn clear_row_height(&mut self, index: usize);
    fn set_row_height(&mut self, index: usize, height: u16);
}

/// Two-phase row height equalizer across the zone surfaces.
///
/// Triggers only mark the pass pending; the actual reset + measure + apply
/// work runs when the owner reaches its next render, so rapid successive
/// triggers coalesce into a single pass that reads the latest state.
#[derive(Debug, Default)]
pub struct RowHeightSync {
    pending: Option<SyncTrigger>,
}

impl RowHeightSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a pass pending. A later trigger before the pass runs simply
    /// replaces the recorded cause; passes are idempotent.
    pub fn schedule(&mut self, trigger: SyncTrigger) {
        self.pending = Some(trigger);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_trigger(&self) -> Option<SyncTrigger> {
        self.pending
    }

    /// Run the pass if one is pending.
    ///
    /// With no attached surfaces the pass is skipped, stays pending, and
    /// retries on the next opportunity (the container may not be laid out
    /// yet). Surfaces with zero rows participate as empty; zones with no
    /// columns should simply not be passed in.
    pub fn run_if_pending(&mut self, surfaces: &mut [&mut dyn RowSurface]) -> Option<RowHeightSet> {
        self.pending?;
        if surfaces.is_empty() {
            return None;
        }
        self.pending = None;
        Some(equalize(surfaces))
    }
}

/// One full reset + measure + apply pass over the attached surfaces.
fn equalize(surfaces: &mut [&mut dyn RowSurface]) -> RowHeightSet {
    let row_count = surfaces
        .iter()
        .map(|surface| surface.row_count())
        .max()
        .unwrap_or(0);

    // Reset phase: drop every explicit height so natural sizing
    // re-establishes itself before anything is measured.
    for surface in surfaces.iter_mut() {
        for index in 0..surface.row_count() {
            surface.clear_row_height(index);
        }
    }

    // Measure + apply phase.
    let mut applied = Vec::with_capacity(row_count);
    for index in 0..row_count {
        let mut max_height = 0u16;
        for surface in surfaces.iter() {
            if index < surface.row_count() {
                max_height = max_height.max(surface.natural_row_height(index));
            }
        }

        if max_height > 0 {
            for surface in surfaces.iter_mut() {
                if index < surface.row_count() {
                    surface.set_row_height(index, max_height);
                }
            }
        }
        applied.push(max_height);
    }

    RowHeightSet(applied)
}
