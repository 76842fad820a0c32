//! Tree layout: subtree widths and node coordinates
//!
//! Each node is displaced from its parent by the width of its *sibling*
//! subtree plus one spacing unit, so sibling subtrees never share an x
//! coordinate on any level, however unbalanced the tree is.
//!
//! Nodes are keyed by their structural path from the root rather than by
//! value, so trees holding duplicate values lay out correctly.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

use crate::domain::snapshot::{Side, TreeSnapshot};

/// Spacing parameters of the layout, in drawing-surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance per unit of subtree width
    pub horizontal_spacing: f64,
    /// Vertical distance between levels
    pub vertical_spacing: f64,
    /// y coordinate of the root
    pub top_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 40.0,
            vertical_spacing: 80.0,
            top_margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Left/right steps from the root to a node. The root is the empty path.
///
/// Ordering is pre-order: a node sorts before its descendants, and left
/// subtrees before right ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<Side>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, side: Side) -> Self {
        let mut steps = self.0.clone();
        steps.push(side);
        Self(steps)
    }

    pub fn steps(&self) -> &[Side] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "root");
        }
        for side in &self.0 {
            write!(f, "{side}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub value: i64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub parent: NodePath,
    pub child: NodePath,
}

/// Computed positions of every node of a snapshot, plus its edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    nodes: BTreeMap<NodePath, PlacedNode>,
    edges: Vec<Edge>,
}

/// Number of nodes in a subtree; `0` for an absent one.
pub fn subtree_width(node: Option<&TreeSnapshot>) -> usize {
    match node {
        None => 0,
        Some(n) => subtree_width(n.left.as_deref()) + subtree_width(n.right.as_deref()) + 1,
    }
}

impl Layout {
    /// Lay out `root` with its root node centered horizontally at `center_x`.
    pub fn compute(root: &TreeSnapshot, center_x: f64, config: &LayoutConfig) -> Self {
        let mut layout = Self::default();
        layout.place(root, NodePath::root(), center_x, config);
        trace!(
            "layout: {} nodes, {} edges",
            layout.nodes.len(),
            layout.edges.len()
        );
        layout
    }

    fn place(&mut self, node: &TreeSnapshot, path: NodePath, x: f64, config: &LayoutConfig) {
        let y = path.depth() as f64 * config.vertical_spacing + config.top_margin;
        let spacing = config.horizontal_spacing;
        let left_width = subtree_width(node.left.as_deref()) as f64 * spacing;
        let right_width = subtree_width(node.right.as_deref()) as f64 * spacing;

        for (side, child) in node.children() {
            let child_x = match side {
                Side::Left => x - right_width - spacing,
                Side::Right => x + left_width + spacing,
            };
            let child_path = path.child(side);
            self.edges.push(Edge {
                parent: path.clone(),
                child: child_path.clone(),
            });
            self.place(child, child_path, child_x, config);
        }

        self.nodes.insert(
            path,
            PlacedNode {
                value: node.value,
                position: Position::new(x, y),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position(&self, path: &NodePath) -> Option<Position> {
        self.nodes.get(path).map(|n| n.position)
    }

    /// Nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodePath, &PlacedNode)> {
        self.nodes.iter()
    }

    /// Edges in the order their child subtrees were placed.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Endpoints of each edge as (parent, child) positions.
    pub fn edge_segments(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.edges.iter().filter_map(|edge| {
            let from = self.position(&edge.parent)?;
            let to = self.position(&edge.child)?;
            Some((from, to))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_three_node_tree_when_laying_out_then_each_child_clears_its_leaf_sibling() {
        let tree = TreeSnapshot::leaf(10)
            .with_left(TreeSnapshot::leaf(5))
            .with_right(TreeSnapshot::leaf(15));
        let layout = Layout::compute(&tree, 400.0, &LayoutConfig::default());

        let root = NodePath::root();
        assert_eq!(layout.position(&root), Some(Position::new(400.0, 50.0)));
        assert_eq!(
            layout.position(&root.child(Side::Left)),
            Some(Position::new(320.0, 130.0))
        );
        assert_eq!(
            layout.position(&root.child(Side::Right)),
            Some(Position::new(480.0, 130.0))
        );
        assert_eq!(layout.edges().len(), 2);
    }

    #[test]
    fn given_left_child_when_laying_out_then_displacement_uses_right_sibling_width() {
        // right subtree has 3 nodes, so left child sits 3 + 1 units left
        let tree = TreeSnapshot::leaf(50)
            .with_left(TreeSnapshot::leaf(25))
            .with_right(
                TreeSnapshot::leaf(75)
                    .with_left(TreeSnapshot::leaf(60))
                    .with_right(TreeSnapshot::leaf(90)),
            );
        let config = LayoutConfig {
            horizontal_spacing: 10.0,
            vertical_spacing: 20.0,
            top_margin: 0.0,
        };
        let layout = Layout::compute(&tree, 0.0, &config);

        let left = layout.position(&NodePath::root().child(Side::Left)).unwrap();
        let right = layout.position(&NodePath::root().child(Side::Right)).unwrap();
        assert_eq!(left, Position::new(-40.0, 20.0));
        assert_eq!(right, Position::new(20.0, 20.0));
    }

    #[test]
    fn given_paths_when_displaying_then_uses_side_letters() {
        let path = NodePath::root().child(Side::Left).child(Side::Right);
        assert_eq!(NodePath::root().to_string(), "root");
        assert_eq!(path.to_string(), "LR");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.parent(), Some(NodePath::root().child(Side::Left)));
        assert_eq!(NodePath::root().parent(), None);
    }

    #[test]
    fn given_absent_node_when_measuring_width_then_zero() {
        assert_eq!(subtree_width(None), 0);
        assert_eq!(subtree_width(Some(&TreeSnapshot::leaf(1))), 1);
    }
}
