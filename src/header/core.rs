use std::collections::HashMap;

use crate::column::{Align, ColumnNode, ColumnWidth, PinState};

/// One rendered header cell, spanning `col_span` leaf columns and
/// `row_span` header rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: String,
    pub title: String,
    /// Header row this cell starts on; level 0 is the root row.
    pub level: usize,
    pub parent_key: Option<String>,
    pub col_span: usize,
    pub row_span: usize,
    /// Whether the cell heads a column group rather than a leaf column.
    pub is_group: bool,
    pub align: Align,
    pub width: ColumnWidth,
    pub pinned: PinState,
    pub pinnable: bool,
    pub header_class: Option<String>,
}

/// Ordered header rows, each a list of unique cells for that level.
pub type HeaderLevels = Vec<Vec<HeaderCell>>;

/// Depth of the deepest root-to-leaf chain in the forest; 0 when empty.
///
/// Computed once from the unfiltered tree and threaded into every zone's
/// [`build_levels`] call so the three header surfaces share one total height
/// even when a zone's own subtree is shallower.
pub fn max_header_depth(nodes: &[ColumnNode]) -> usize {
    fn walk(nodes: &[ColumnNode], current: usize) -> usize {
        let mut max = current;
        for node in nodes {
            if !node.is_leaf() {
                max = max.max(walk(&node.children, current + 1));
            }
        }
        max
    }

    if nodes.is_empty() {
        return 0;
    }
    walk(nodes, 1)
}

/// Ordered chains of ancestors-including-self, one per leaf.
pub fn collect_leaf_paths(nodes: &[ColumnNode]) -> Vec<Vec<&ColumnNode>> {
    fn walk<'a>(
        nodes: &'a [ColumnNode],
        path: &mut Vec<&'a ColumnNode>,
        out: &mut Vec<Vec<&'a ColumnNode>>,
    ) {
        for node in nodes {
            path.push(node);
            if node.is_leaf() {
                out.push(path.clone());
            } else {
                walk(&node.children, path, out);
            }
            path.pop();
        }
    }

    let mut paths = Vec::new();
    walk(nodes, &mut Vec::new(), &mut paths);
    paths
}

/// Build the span matrix for `nodes`.
///
/// `max_depth_override` forces the total header height; it is clamped to at
/// least the depth observed in `nodes` so a stale override can never drop
/// levels. Cells are deduplicated by `(key, level)`: the first occurrence on
/// any leaf path creates the cell, and every occurrence (including the
/// first) contributes one leaf to its `col_span`. Leaf cells stretch to the
/// bottom of the header (`row_span = max_depth - level`); group cells always
/// occupy a single row.
pub fn build_levels(nodes: &[ColumnNode], max_depth_override: Option<usize>) -> HeaderLevels {
    let paths = collect_leaf_paths(nodes);
    let observed = paths.iter().map(Vec::len).max().unwrap_or(0);
    let max_depth = max_depth_override.unwrap_or(observed).max(observed);

    let mut levels: HeaderLevels = vec![Vec::new(); max_depth];
    let mut seen: HashMap<(String, usize), usize> = HashMap::new();

    for path in &paths {
        for (level, node) in path.iter().enumerate() {
            let id = (node.key.clone(), level);
            match seen.get(&id) {
                Some(&slot) => levels[level][slot].col_span += 1,
                None => {
                    let is_leaf = node.is_leaf();
                    let cell = HeaderCell {
                        key: node.key.clone(),
                        title: node.title.clone(),
                        level,
                        parent_key: level.checked_sub(1).map(|up| path[up].key.clone()),
                        col_span: 1,
                        row_span: if is_leaf { max_depth - level } else { 1 },
                        is_group: !is_leaf,
                        align: node.align,
                        width: node.width,
                        pinned: node.pinned,
                        pinnable: node.pinnable,
                        header_class: node.header_class.clone(),
                    };
                    seen.insert(id, levels[level].len());
                    levels[level].push(cell);
                }
            }
        }
    }

    levels
}
