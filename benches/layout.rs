use std::io;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use grid_mvp::{
    ColumnNode, GridEvent, GridRenderer, GridRuntime, LogEvent, LogSink, Logger, LoggingResult,
    PinState, Result, Size, build_levels, max_header_depth,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

fn wide_tree() -> Vec<ColumnNode> {
    (0..8)
        .map(|group| {
            ColumnNode::new(format!("group{group}"), format!("Group {group}")).with_children(
                (0..4)
                    .map(|leaf| {
                        ColumnNode::new(
                            format!("col{group}_{leaf}"),
                            format!("Column {group}.{leaf}"),
                        )
                    })
                    .collect(),
            )
        })
        .collect()
}

fn sample_rows(count: usize) -> Vec<Value> {
    (0..count)
        .map(|index| {
            let mut row = serde_json::Map::new();
            row.insert("id".to_string(), json!(index));
            for group in 0..8 {
                for leaf in 0..4 {
                    row.insert(
                        format!("col{group}_{leaf}"),
                        json!(format!("value {index}.{group}.{leaf}")),
                    );
                }
            }
            Value::Object(row)
        })
        .collect()
}

fn header_levels_bench(c: &mut Criterion) {
    let tree = wide_tree();
    let depth = max_header_depth(&tree);
    c.bench_function("header_levels_wide_tree", |b| {
        b.iter(|| build_levels(black_box(&tree), Some(depth)));
    });
}

fn runtime_pin_script(c: &mut Criterion) {
    let script = scripted_events();
    c.bench_function("runtime_pin_script", |b| {
        b.iter(|| {
            let mut runtime = build_runtime().expect("runtime");
            let mut sink = io::sink();
            runtime
                .run_scripted(&mut sink, black_box(script.clone()))
                .expect("scripted run");
        });
    });
}

fn build_runtime() -> Result<GridRuntime> {
    let mut runtime = GridRuntime::new(
        wide_tree(),
        GridRenderer::with_default(),
        Size::new(160, 40),
    )?;
    let config = runtime.config_mut();
    config.logger = Some(Logger::new(NullSink));
    config.metrics_interval = Duration::from_millis(0);
    config.enable_metrics();
    Ok(runtime)
}

fn scripted_events() -> Vec<GridEvent> {
    vec![
        GridEvent::RowsReplaced(sample_rows(50)),
        GridEvent::PinToggled {
            key: "group0".to_string(),
        },
        GridEvent::PinSet {
            key: "group7".to_string(),
            state: PinState::Right,
        },
        GridEvent::Resize(Size::new(120, 40)),
        GridEvent::LoadingChanged(true),
        GridEvent::LoadingChanged(false),
        GridEvent::PinToggled {
            key: "group0".to_string(),
        },
    ]
}

criterion_group!(benches, header_levels_bench, runtime_pin_script);
criterion_main!(benches);
