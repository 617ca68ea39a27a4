use std::fmt;

use serde::Serialize;

use crate::column::{ColumnNode, PinState};

/// One of the three independent rendering partitions of the grid.
///
/// Ordering matches the visual left-to-right arrangement and drives the
/// render order of dirty surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Left,
    Regular,
    Right,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Left, Zone::Regular, Zone::Right];

    /// Whether a node with the given declared pin belongs to this zone.
    pub fn matches(self, pin: PinState) -> bool {
        match self {
            Zone::Left => pin == PinState::Left,
            Zone::Regular => pin == PinState::None,
            Zone::Right => pin == PinState::Right,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Zone::Left => "left",
            Zone::Regular => "regular",
            Zone::Right => "right",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extract the subtree of `nodes` belonging to `zone`, preserving ancestors.
///
/// A group survives with only its matching children so the header hierarchy
/// stays intact even when just part of the group lives in this zone (partial
/// pins before a cascade has propagated). A group whose children all filter
/// away falls back to its own pin state and, when it matches, is kept whole.
pub fn partition(nodes: &[ColumnNode], zone: Zone) -> Vec<ColumnNode> {
    nodes
        .iter()
        .filter_map(|node| {
            if !node.is_leaf() {
                let kept = partition(&node.children, zone);
                if !kept.is_empty() {
                    let mut group = node.clone();
                    group.children = kept;
                    return Some(group);
                }
                return zone.matches(node.pinned).then(|| node.clone());
            }
            zone.matches(node.pinned).then(|| node.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnTree;
    use std::collections::HashSet;

    fn tree() -> Vec<ColumnNode> {
        vec![
            ColumnNode::new("id", "ID"),
            ColumnNode::new("personal", "Personal").with_children(vec![
                ColumnNode::new("name", "Name"),
                ColumnNode::new("email", "Email"),
            ]),
            ColumnNode::new("status", "Status").pinned(PinState::Right),
        ]
    }

    fn leaf_keys(nodes: &[ColumnNode]) -> Vec<String> {
        let mut keys = Vec::new();
        fn walk(nodes: &[ColumnNode], out: &mut Vec<String>) {
            for node in nodes {
                if node.is_leaf() {
                    out.push(node.key.clone());
                } else {
                    walk(&node.children, out);
                }
            }
        }
        walk(nodes, &mut keys);
        keys
    }

    #[test]
    fn partitions_are_disjoint_and_cover_all_leaves() {
        let mut tree = ColumnTree::new(tree()).unwrap();
        tree.set_pin("name", PinState::Left);

        let mut union = Vec::new();
        let mut total = 0;
        for zone in Zone::ALL {
            let part = partition(tree.roots(), zone);
            let keys = leaf_keys(&part);
            total += keys.len();
            union.extend(keys);
        }

        let distinct: HashSet<_> = union.iter().cloned().collect();
        assert_eq!(distinct.len(), total, "leaf appears in more than one zone");
        assert_eq!(distinct.len(), tree.leaf_count());
    }

    #[test]
    fn group_survives_with_only_matching_children() {
        let mut tree = ColumnTree::new(tree()).unwrap();
        tree.set_pin("name", PinState::Left);

        let left = partition(tree.roots(), Zone::Left);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].key, "personal");
        assert_eq!(leaf_keys(&left), ["name"]);

        let regular = partition(tree.roots(), Zone::Regular);
        assert_eq!(leaf_keys(&regular), ["id", "email"]);
    }

    #[test]
    fn pinned_group_moves_wholesale_after_cascade() {
        let mut tree = ColumnTree::new(tree()).unwrap();
        tree.set_pin("personal", PinState::Left);

        assert_eq!(leaf_keys(&partition(tree.roots(), Zone::Left)), [
            "name", "email"
        ]);
        assert_eq!(leaf_keys(&partition(tree.roots(), Zone::Regular)), ["id"]);
        assert_eq!(leaf_keys(&partition(tree.roots(), Zone::Right)), ["status"]);
    }

    #[test]
    fn empty_zone_partitions_to_empty() {
        let tree = ColumnTree::new(vec![ColumnNode::new("id", "ID")]).unwrap();
        assert!(partition(tree.roots(), Zone::Left).is_empty());
        assert!(partition(tree.roots(), Zone::Right).is_empty());
    }

    #[test]
    fn group_with_no_matching_children_falls_back_to_own_pin() {
        // Children pinned away by configuration, parent left unpinned: the
        // regular partition keeps the parent whole.
        let nodes = vec![ColumnNode::new("group", "Group").with_children(vec![
            ColumnNode::new("a", "A").pinned(PinState::Left),
            ColumnNode::new("b", "B").pinned(PinState::Left),
        ])];

        let regular = partition(&nodes, Zone::Regular);
        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].children.len(), 2);

        let left = partition(&nodes, Zone::Left);
        assert_eq!(leaf_keys(&left), ["a", "b"]);
    }
}
