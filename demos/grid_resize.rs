//! Row heights staying in lockstep across zones through a resize.
//!
//! The note column wraps when the container narrows; the pinned id column
//! picks up the same row heights so the surfaces stay aligned.

use std::io;

use grid_mvp::{
    ColumnNode, GridEvent, GridRenderer, GridRuntime, PinState, Result, RowSurface, Size, Zone,
};
use serde_json::json;

fn main() -> Result<()> {
    let columns = vec![
        ColumnNode::new("id", "ID").with_width(4).pinned(PinState::Left),
        ColumnNode::new("note", "Note"),
    ];

    let mut runtime = GridRuntime::new(columns, GridRenderer::with_default(), Size::new(70, 16))?;

    let rows = vec![
        json!({ "id": 1, "note": "short" }),
        json!({ "id": 2, "note": "a considerably longer note that will wrap once the container narrows" }),
        json!({ "id": 3, "note": "medium sized note" }),
    ];

    let mut stdout = io::stdout();
    runtime.run_scripted(&mut stdout, vec![
        GridEvent::RowsReplaced(rows),
        GridEvent::Resize(Size::new(30, 16)),
    ])?;

    println!();
    if let (Some(left), Some(regular)) =
        (runtime.surface(Zone::Left), runtime.surface(Zone::Regular))
    {
        for index in 0..regular.row_count() {
            eprintln!(
                "row {index}: left height {} / regular height {}",
                left.row_height(index),
                regular.row_height(index)
            );
        }
    }
    Ok(())
}
