//! I/O boundary traits for testability
//!
//! These traits abstract the remote tree service and the drawing surface,
//! allowing services to be tested with in-memory implementations.

use serde::{Deserialize, Serialize};

use crate::domain::{Position, TreeSnapshot};
use crate::infrastructure::TransportError;

/// Human-readable outcome of a mutating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReply {
    pub message: String,
}

/// Values in the requested traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalReply {
    pub sequence: Vec<i64>,
}

/// Current structure of a tree; `None` when the tree is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotReply {
    #[serde(default)]
    pub tree: Option<TreeSnapshot>,
}

/// Remote service owning the authoritative trees, one per tree kind.
///
/// Every call is one request/response round trip. Business rules
/// (duplicates, deleting absent values) are the service's concern.
pub trait TreeService: Send + Sync {
    fn insert(&self, value: i64, tree_kind: &str) -> Result<MessageReply, TransportError>;

    fn remove(&self, value: i64, tree_kind: &str) -> Result<MessageReply, TransportError>;

    /// `order` is passed through verbatim; the service defines the valid set.
    fn traverse(&self, order: &str, tree_kind: &str) -> Result<TraversalReply, TransportError>;

    fn clear(&self, tree_kind: &str) -> Result<MessageReply, TransportError>;

    fn snapshot(&self, tree_kind: &str) -> Result<SnapshotReply, TransportError>;
}

/// Outline of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    pub size: f64,
    pub bold: bool,
}

/// 2D drawing surface.
///
/// Text is drawn centered on its anchor both horizontally and vertically.
pub trait Canvas {
    /// Width and height of the surface.
    fn size(&self) -> (f64, f64);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    fn line(&mut self, from: Position, to: Position, stroke: &Stroke);

    /// Filled and outlined circle.
    fn circle(&mut self, center: Position, radius: f64, fill: &str, stroke: &Stroke);

    fn text(&mut self, anchor: Position, content: &str, style: &TextStyle);
}
