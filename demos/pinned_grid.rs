//! Nested headers with a pinned group and a custom cell renderer.
//!
//! Runs a scripted session against stdout: load rows, pin the personal
//! group to the left edge, then pin status to the right programmatically.

use std::io;

use grid_mvp::{
    Align, CellContext, ColumnNode, GridEvent, GridRenderer, GridRuntime, PinChange, PinState,
    Result, Size,
};
use serde_json::json;

fn main() -> Result<()> {
    let columns = vec![
        ColumnNode::new("id", "ID").with_width(4).with_align(Align::Right),
        ColumnNode::new("personal", "Personal").with_children(vec![
            ColumnNode::new("name", "Name"),
            ColumnNode::new("email", "Email"),
        ]),
        ColumnNode::new("status", "Status").with_cell_tag("badge"),
    ];

    let mut runtime = GridRuntime::new(columns, GridRenderer::with_default(), Size::new(90, 20))?;

    runtime
        .cell_renderers_mut()
        .register("badge", |ctx: &CellContext<'_>| {
            match ctx.value.and_then(|value| value.as_str()) {
                Some("active") => "[+] active".to_string(),
                Some(other) => format!("[ ] {other}"),
                None => String::new(),
            }
        });

    runtime.add_pin_listener(|change: &PinChange| {
        eprintln!(
            "pin changed: {} -> {:?}",
            change.column_key, change.new_pin_state
        );
    });

    let rows = vec![
        json!({ "id": 1, "name": "Ada Lovelace", "email": "ada@example.com", "status": "active" }),
        json!({ "id": 2, "name": "Grace Hopper", "email": "grace@example.com", "status": "away" }),
        json!({ "id": 3, "name": "Edsger Dijkstra", "email": "ewd@example.com", "status": "active" }),
    ];

    let mut stdout = io::stdout();
    runtime.run_scripted(&mut stdout, vec![
        GridEvent::RowsReplaced(rows),
        GridEvent::PinToggled {
            key: "personal".to_string(),
        },
        GridEvent::PinSet {
            key: "status".to_string(),
            state: PinState::Right,
        },
    ])?;

    println!();
    Ok(())
}
