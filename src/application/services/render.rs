//! Rendering of snapshots onto a canvas or as a terminal outline

use termtree::Tree;
use tracing::debug;

use crate::domain::{Layout, LayoutConfig, Position, TreeSnapshot};
use crate::infrastructure::traits::{Canvas, Stroke, TextStyle};

/// Text drawn in place of an empty tree.
pub const EMPTY_TREE_LABEL: &str = "Empty tree";

/// Colors and sizes used when drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub node_radius: f64,
    pub node_fill: String,
    pub outline: Stroke,
    pub label: TextStyle,
    pub placeholder: TextStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            node_radius: 20.0,
            node_fill: "#4CAF50".to_string(),
            outline: Stroke {
                color: "#333".to_string(),
                width: 2.0,
            },
            label: TextStyle {
                color: "white".to_string(),
                size: 16.0,
                bold: true,
            },
            placeholder: TextStyle {
                color: "#999".to_string(),
                size: 20.0,
                bold: false,
            },
        }
    }
}

/// Stateless full-frame renderer.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    layout: LayoutConfig,
    style: RenderStyle,
}

impl Renderer {
    pub fn new(layout: LayoutConfig, style: RenderStyle) -> Self {
        Self { layout, style }
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Layout of `snapshot` with its root at the horizontal midpoint of a
    /// surface `canvas_width` wide.
    pub fn layout(&self, snapshot: &TreeSnapshot, canvas_width: f64) -> Layout {
        Layout::compute(snapshot, canvas_width / 2.0, &self.layout)
    }

    /// Redraw the whole canvas.
    ///
    /// All edges are drawn before any node so lines never cover circles.
    /// Returns the layout used, or `None` when only the placeholder was drawn.
    pub fn draw(&self, canvas: &mut dyn Canvas, snapshot: Option<&TreeSnapshot>) -> Option<Layout> {
        canvas.clear();
        let (width, height) = canvas.size();

        let Some(tree) = snapshot else {
            debug!("draw: empty tree");
            canvas.text(
                Position::new(width / 2.0, height / 2.0),
                EMPTY_TREE_LABEL,
                &self.style.placeholder,
            );
            return None;
        };

        let layout = self.layout(tree, width);
        let radius = self.style.node_radius;

        for (from, to) in layout.edge_segments() {
            canvas.line(
                Position::new(from.x, from.y + radius),
                Position::new(to.x, to.y - radius),
                &self.style.outline,
            );
        }

        for (_, node) in layout.nodes() {
            canvas.circle(node.position, radius, &self.style.node_fill, &self.style.outline);
            canvas.text(node.position, &node.value.to_string(), &self.style.label);
        }

        debug!("draw: {} nodes, {} edges", layout.len(), layout.edges().len());
        Some(layout)
    }
}

/// Terminal outline of a snapshot; children are tagged with their side.
pub fn outline(snapshot: Option<&TreeSnapshot>) -> Tree<String> {
    fn build(node: &TreeSnapshot, label: String) -> Tree<String> {
        let leaves: Vec<_> = node
            .children()
            .map(|(side, child)| build(child, format!("{side} {}", child.value)))
            .collect();
        Tree::new(label).with_leaves(leaves)
    }

    match snapshot {
        Some(root) => build(root, root.value.to_string()),
        None => Tree::new(EMPTY_TREE_LABEL.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tree_when_outlining_then_children_carry_side_tags() {
        let tree = TreeSnapshot::leaf(10)
            .with_left(TreeSnapshot::leaf(5))
            .with_right(TreeSnapshot::leaf(15));
        let text = outline(Some(&tree)).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "10");
        assert!(lines[1].ends_with("L 5"));
        assert!(lines[2].ends_with("R 15"));
    }

    #[test]
    fn given_empty_tree_when_outlining_then_shows_label() {
        assert_eq!(outline(None).to_string().trim_end(), EMPTY_TREE_LABEL);
    }

    #[test]
    fn given_canvas_width_when_laying_out_then_root_is_centered() {
        let renderer = Renderer::default();
        let layout = renderer.layout(&TreeSnapshot::leaf(1), 800.0);
        let (_, root) = layout.nodes().next().unwrap();
        assert_eq!(root.position, Position::new(400.0, 50.0));
    }
}
