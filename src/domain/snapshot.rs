//! Tree snapshots: the read-only structure returned by the tree service

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which child of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "L"),
            Side::Right => write!(f, "R"),
        }
    }
}

/// A node of a tree snapshot and, recursively, its subtrees.
///
/// A missing child and an explicit `null` child are the same thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeSnapshot>>,
}

impl TreeSnapshot {
    /// A node without children.
    pub fn leaf(value: i64) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_left(mut self, child: TreeSnapshot) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    pub fn with_right(mut self, child: TreeSnapshot) -> Self {
        self.right = Some(Box::new(child));
        self
    }

    pub fn child(&self, side: Side) -> Option<&TreeSnapshot> {
        match side {
            Side::Left => self.left.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }

    /// Present children, left before right.
    pub fn children(&self) -> impl Iterator<Item = (Side, &TreeSnapshot)> {
        [Side::Left, Side::Right]
            .into_iter()
            .filter_map(move |side| self.child(side).map(|c| (side, c)))
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().map(|(_, c)| c.node_count()).sum::<usize>()
    }

    /// Number of levels; a single node has height 1.
    pub fn height(&self) -> usize {
        1 + self
            .children()
            .map(|(_, c)| c.height())
            .max()
            .unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children().map(|(_, c)| c.leaf_count()).sum()
        }
    }

    /// Search-tree descent: smaller values go left, everything else right.
    pub fn contains(&self, value: i64) -> bool {
        let mut current = Some(self);
        while let Some(node) = current {
            if node.value == value {
                return true;
            }
            current = if value < node.value {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
        }
        false
    }

    pub fn in_order(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.node_count());
        fn walk(node: &TreeSnapshot, out: &mut Vec<i64>) {
            if let Some(left) = node.left.as_deref() {
                walk(left, out);
            }
            out.push(node.value);
            if let Some(right) = node.right.as_deref() {
                walk(right, out);
            }
        }
        walk(self, &mut out);
        out
    }

    pub fn pre_order(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.node_count());
        fn walk(node: &TreeSnapshot, out: &mut Vec<i64>) {
            out.push(node.value);
            for (_, child) in node.children() {
                walk(child, out);
            }
        }
        walk(self, &mut out);
        out
    }

    pub fn post_order(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.node_count());
        fn walk(node: &TreeSnapshot, out: &mut Vec<i64>) {
            for (_, child) in node.children() {
                walk(child, out);
            }
            out.push(node.value);
        }
        walk(self, &mut out);
        out
    }

    /// Breadth-first, left to right within each level.
    pub fn level_order(&self) -> Vec<i64> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            out.push(node.value);
            queue.extend(node.children().map(|(_, c)| c));
        }
        out
    }

    /// In-order sequence is non-decreasing.
    pub fn is_search_tree(&self) -> bool {
        self.in_order().windows(2).all(|w| w[0] <= w[1])
    }

    /// Every node's subtree heights differ by at most one.
    pub fn is_height_balanced(&self) -> bool {
        fn balanced_height(node: Option<&TreeSnapshot>) -> Option<usize> {
            let Some(node) = node else {
                return Some(0);
            };
            let left = balanced_height(node.left.as_deref())?;
            let right = balanced_height(node.right.as_deref())?;
            (left.abs_diff(right) <= 1).then_some(1 + left.max(right))
        }
        balanced_height(Some(self)).is_some()
    }
}

/// Summary figures of a snapshot, computed locally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub nodes: usize,
    pub height: usize,
    pub leaves: usize,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub search_tree: bool,
    pub height_balanced: bool,
}

impl TreeStats {
    /// Stats of an optional snapshot; the empty tree is a balanced search tree.
    pub fn of(snapshot: Option<&TreeSnapshot>) -> Self {
        match snapshot {
            None => Self {
                search_tree: true,
                height_balanced: true,
                ..Self::default()
            },
            Some(tree) => {
                let values = tree.in_order();
                Self {
                    nodes: values.len(),
                    height: tree.height(),
                    leaves: tree.leaf_count(),
                    min: values.iter().copied().min(),
                    max: values.iter().copied().max(),
                    search_tree: tree.is_search_tree(),
                    height_balanced: tree.is_height_balanced(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //       10
    //      /  \
    //     5    15
    //    / \     \
    //   2   7     20
    fn sample() -> TreeSnapshot {
        TreeSnapshot::leaf(10)
            .with_left(
                TreeSnapshot::leaf(5)
                    .with_left(TreeSnapshot::leaf(2))
                    .with_right(TreeSnapshot::leaf(7)),
            )
            .with_right(TreeSnapshot::leaf(15).with_right(TreeSnapshot::leaf(20)))
    }

    #[test]
    fn given_sample_tree_when_traversing_then_orders_match() {
        let tree = sample();
        assert_eq!(tree.in_order(), vec![2, 5, 7, 10, 15, 20]);
        assert_eq!(tree.pre_order(), vec![10, 5, 2, 7, 15, 20]);
        assert_eq!(tree.post_order(), vec![2, 7, 5, 20, 15, 10]);
        assert_eq!(tree.level_order(), vec![10, 5, 15, 2, 7, 20]);
    }

    #[test]
    fn given_sample_tree_when_measuring_then_counts_match() {
        let tree = sample();
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.leaf_count(), 3);
        assert!(tree.contains(7));
        assert!(tree.contains(20));
        assert!(!tree.contains(8));
    }

    #[test]
    fn given_json_with_null_and_missing_children_when_deserializing_then_both_are_absent() {
        let json = r#"{"value": 10, "left": {"value": 5, "left": null, "right": null}, "right": null}"#;
        let tree: TreeSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(tree, TreeSnapshot::leaf(10).with_left(TreeSnapshot::leaf(5)));
    }

    #[test]
    fn given_leaf_when_serializing_then_children_are_omitted() {
        let json = serde_json::to_string(&TreeSnapshot::leaf(3)).unwrap();
        assert_eq!(json, r#"{"value":3}"#);
    }

    #[test]
    fn given_right_chain_when_checking_balance_then_is_unbalanced_search_tree() {
        let chain = TreeSnapshot::leaf(1)
            .with_right(TreeSnapshot::leaf(2).with_right(TreeSnapshot::leaf(3)));
        assert!(chain.is_search_tree());
        assert!(!chain.is_height_balanced());
        assert!(sample().is_height_balanced());
    }

    #[test]
    fn given_misordered_tree_when_checking_then_not_a_search_tree() {
        let tree = TreeSnapshot::leaf(10).with_left(TreeSnapshot::leaf(12));
        assert!(!tree.is_search_tree());
    }

    #[test]
    fn given_no_snapshot_when_computing_stats_then_empty_tree_figures() {
        let stats = TreeStats::of(None);
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.height, 0);
        assert_eq!(stats.min, None);
        assert!(stats.search_tree);
        assert!(stats.height_balanced);
    }

    #[test]
    fn given_sample_tree_when_computing_stats_then_reports_extremes() {
        let stats = TreeStats::of(Some(&sample()));
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.leaves, 3);
        assert_eq!(stats.min, Some(2));
        assert_eq!(stats.max, Some(20));
    }
}
