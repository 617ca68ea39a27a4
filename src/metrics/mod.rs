//! Runtime counters and periodic snapshots.
//!
//! Accumulated inside the grid runtime and emitted as structured log events
//! on a configurable interval.

use std::time::Duration;

use serde_json::json;

use crate::logging::{LogEvent, LogFields, LogLevel};

#[derive(Debug, Default, Clone)]
pub struct GridMetrics {
    events: u64,
    layout_passes: u64,
    sync_passes: u64,
    rows_equalized: u64,
    renders: u64,
    surfaces_redrawn: u64,
}

impl GridMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_layout_pass(&mut self) {
        self.layout_passes = self.layout_passes.saturating_add(1);
    }

    pub fn record_sync_pass(&mut self, rows: usize) {
        self.sync_passes = self.sync_passes.saturating_add(1);
        self.rows_equalized = self.rows_equalized.saturating_add(rows as u64);
    }

    pub fn record_render(&mut self, dirty_count: usize) {
        self.renders = self.renders.saturating_add(1);
        self.surfaces_redrawn = self.surfaces_redrawn.saturating_add(dirty_count as u64);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            layout_passes: self.layout_passes,
            sync_passes: self.sync_passes,
            rows_equalized: self.rows_equalized,
            renders: self.renders,
            surfaces_redrawn: self.surfaces_redrawn,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub layout_passes: u64,
    pub sync_passes: u64,
    pub rows_equalized: u64,
    pub renders: u64,
    pub surfaces_redrawn: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut fields = LogFields::new();
        fields.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        fields.insert("events".to_string(), json!(self.events));
        fields.insert("layout_passes".to_string(), json!(self.layout_passes));
        fields.insert("sync_passes".to_string(), json!(self.sync_passes));
        fields.insert("rows_equalized".to_string(), json!(self.rows_equalized));
        fields.insert("renders".to_string(), json!(self.renders));
        fields.insert(
            "surfaces_redrawn".to_string(),
            json!(self.surfaces_redrawn),
        );
        fields
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "grid_metrics", self.as_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_into_snapshots() {
        let mut metrics = GridMetrics::new();
        metrics.record_event();
        metrics.record_event();
        metrics.record_layout_pass();
        metrics.record_sync_pass(5);
        metrics.record_render(2);

        let snapshot = metrics.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.uptime_ms, 1500);
        assert_eq!(snapshot.events, 2);
        assert_eq!(snapshot.sync_passes, 1);
        assert_eq!(snapshot.rows_equalized, 5);
        assert_eq!(snapshot.surfaces_redrawn, 2);
    }

    #[test]
    fn snapshot_event_carries_every_counter() {
        let metrics = GridMetrics::new();
        let event = metrics
            .snapshot(Duration::from_secs(1))
            .to_log_event("grid::runtime.metrics");
        assert_eq!(event.target, "grid::runtime.metrics");
        assert_eq!(event.fields.len(), 7);
    }
}
