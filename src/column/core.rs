use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Declared pin state of a column.
///
/// This is the node's own state. Ancestor pins are materialized into
/// descendants at write time (see [`ColumnTree::set_pin`]), so partitioning
/// reads this field directly with no inheritance walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    #[default]
    None,
    Left,
    Right,
}

impl PinState {
    pub fn is_pinned(&self) -> bool {
        !matches!(self, PinState::None)
    }

    /// Next state for the pin affordance click cycle.
    ///
    /// `Right` collapses to `None`; it is reachable only through
    /// configuration or a direct [`ColumnTree::set_pin`] call.
    pub fn toggled(self) -> PinState {
        match self {
            PinState::None => PinState::Left,
            PinState::Left | PinState::Right => PinState::None,
        }
    }
}

/// Horizontal alignment forwarded to cell and header rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Column sizing rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    /// Size from content, sharing leftover zone width with other auto columns.
    #[default]
    Auto,
    /// Fixed width in terminal cells.
    Fixed(u16),
}

fn default_pinnable() -> bool {
    true
}

/// One node of the column configuration forest.
///
/// A node with an empty `children` vector is a leaf and corresponds to one
/// rendered data cell per row; a node with children is a group header
/// spanning its descendant leaves. `key` is the node's identity across the
/// whole forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNode {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub width: ColumnWidth,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub pinned: PinState,
    #[serde(default = "default_pinnable")]
    pub pinnable: bool,
    #[serde(default)]
    pub children: Vec<ColumnNode>,
    /// Tag used to look up a custom cell renderer; falls back to `key`.
    #[serde(default)]
    pub cell_tag: Option<String>,
    /// Opaque style hook forwarded to header rendering.
    #[serde(default)]
    pub header_class: Option<String>,
}

impl ColumnNode {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width: ColumnWidth::Auto,
            align: Align::Left,
            pinned: PinState::None,
            pinnable: true,
            children: Vec::new(),
            cell_tag: None,
            header_class: None,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn pinned(mut self, state: PinState) -> Self {
        self.pinned = state;
        self
    }

    pub fn not_pinnable(mut self) -> Self {
        self.pinnable = false;
        self
    }

    pub fn with_children(mut self, children: Vec<ColumnNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_cell_tag(mut self, tag: impl Into<String>) -> Self {
        self.cell_tag = Some(tag.into());
        self
    }

    /// A node with a present-but-empty child list counts as a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Owned copy of the consumer-supplied column forest.
///
/// Construction validates key uniqueness across the whole forest; everything
/// downstream (header dedup, pin lookup, row-cell lookup) relies on it.
#[derive(Debug, Clone)]
pub struct ColumnTree {
    roots: Vec<ColumnNode>,
}

impl ColumnTree {
    pub fn new(roots: Vec<ColumnNode>) -> Result<Self> {
        let mut seen = HashSet::new();
        check_keys(&roots, &mut seen)?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[ColumnNode] {
        &self.roots
    }

    pub fn find(&self, key: &str) -> Option<&ColumnNode> {
        find_node(&self.roots, key)
    }

    /// Set the pin state of `key` and cascade it to every descendant.
    ///
    /// A group must land in one zone as a contiguous block, so the write is
    /// pushed down eagerly instead of resolving inheritance on every read.
    /// Unknown keys are a no-op; returns whether a node was found.
    pub fn set_pin(&mut self, key: &str, state: PinState) -> bool {
        match find_node_mut(&mut self.roots, key) {
            Some(node) => {
                cascade_pin(node, state);
                true
            }
            None => false,
        }
    }

    /// Apply the pin affordance click cycle to `key`.
    ///
    /// Respects `pinnable`; returns the new state when a pin was applied.
    pub fn toggle_pin(&mut self, key: &str) -> Option<PinState> {
        let next = {
            let node = find_node(&self.roots, key)?;
            if !node.pinnable {
                return None;
            }
            node.pinned.toggled()
        };
        self.set_pin(key, next);
        Some(next)
    }

    /// Ordered leaf columns of the whole forest with effective pin resolved.
    ///
    /// Cascade normally keeps each leaf's own `pinned` authoritative; the
    /// nearest pin-bearing ancestor is consulted as a fallback for trees
    /// where a parent pin was declared in configuration without a cascade.
    pub fn flatten(&self) -> Vec<ColumnNode> {
        let mut leaves = Vec::new();
        flatten_into(&self.roots, PinState::None, &mut leaves);
        leaves
    }

    pub fn leaf_count(&self) -> usize {
        count_leaves(&self.roots)
    }
}

fn check_keys(nodes: &[ColumnNode], seen: &mut HashSet<String>) -> Result<()> {
    for node in nodes {
        if !seen.insert(node.key.clone()) {
            return Err(GridError::DuplicateKey(node.key.clone()));
        }
        check_keys(&node.children, seen)?;
    }
    Ok(())
}

fn find_node<'a>(nodes: &'a [ColumnNode], key: &str) -> Option<&'a ColumnNode> {
    for node in nodes {
        if node.key == key {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, key) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(nodes: &'a mut [ColumnNode], key: &str) -> Option<&'a mut ColumnNode> {
    for node in nodes {
        if node.key == key {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, key) {
            return Some(found);
        }
    }
    None
}

fn cascade_pin(node: &mut ColumnNode, state: PinState) {
    node.pinned = state;
    for child in &mut node.children {
        cascade_pin(child, state);
    }
}

fn flatten_into(nodes: &[ColumnNode], inherited: PinState, out: &mut Vec<ColumnNode>) {
    for node in nodes {
        let effective = if node.pinned.is_pinned() {
            node.pinned
        } else {
            inherited
        };
        if node.is_leaf() {
            let mut leaf = node.clone();
            leaf.pinned = effective;
            out.push(leaf);
        } else {
            flatten_into(&node.children, effective, out);
        }
    }
}

fn count_leaves(nodes: &[ColumnNode]) -> usize {
    nodes
        .iter()
        .map(|node| {
            if node.is_leaf() {
                1
            } else {
                count_leaves(&node.children)
            }
        })
        .sum()
}
