//! Test support: logging setup and in-memory doubles for the I/O traits

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::env;
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Position, TreeSnapshot};
use crate::infrastructure::traits::{
    Canvas, MessageReply, SnapshotReply, Stroke, TextStyle, TraversalReply, TreeService,
};
use crate::infrastructure::TransportError;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["reqwest", "hyper", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// A request received by [`InMemoryTreeService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Insert { value: i64, tree_kind: String },
    Remove { value: i64, tree_kind: String },
    Traverse { order: String, tree_kind: String },
    Clear { tree_kind: String },
    Snapshot { tree_kind: String },
}

#[derive(Debug, Default)]
struct ServiceState {
    trees: BTreeMap<String, Option<Box<TreeSnapshot>>>,
    calls: Vec<ServiceCall>,
    failing_status: Option<u16>,
}

/// Tree service backed by plain binary search trees, one per kind.
///
/// Duplicates go to the right subtree. Records every call and can be told
/// to answer every request with an HTTP error status.
#[derive(Debug, Default)]
pub struct InMemoryTreeService {
    state: Mutex<ServiceState>,
}

impl InMemoryTreeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tree of `tree_kind`.
    pub fn with_tree(self, tree_kind: &str, tree: TreeSnapshot) -> Self {
        self.lock()
            .trees
            .insert(tree_kind.to_string(), Some(Box::new(tree)));
        self
    }

    /// Answer every following request with `status`.
    pub fn fail_with_status(&self, status: u16) {
        self.lock().failing_status = Some(status);
    }

    pub fn recover(&self) {
        self.lock().failing_status = None;
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    pub fn tree(&self, tree_kind: &str) -> Option<TreeSnapshot> {
        self.lock()
            .trees
            .get(tree_kind)
            .and_then(|t| t.as_deref().cloned())
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call`, then fail if a failure status is set.
    fn begin(&self, call: ServiceCall, endpoint: &str) -> Result<MutexGuard<'_, ServiceState>, TransportError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failing_status {
            Some(status) => Err(TransportError::Status {
                url: format!("memory:///{endpoint}"),
                status,
            }),
            None => Ok(state),
        }
    }
}

fn bst_insert(slot: &mut Option<Box<TreeSnapshot>>, value: i64) {
    match slot {
        None => *slot = Some(Box::new(TreeSnapshot::leaf(value))),
        Some(node) => {
            if value < node.value {
                bst_insert(&mut node.left, value)
            } else {
                bst_insert(&mut node.right, value)
            }
        }
    }
}

fn bst_remove(slot: &mut Option<Box<TreeSnapshot>>, value: i64) -> bool {
    let Some(node) = slot.as_mut() else {
        return false;
    };
    match value.cmp(&node.value) {
        Ordering::Less => bst_remove(&mut node.left, value),
        Ordering::Greater => bst_remove(&mut node.right, value),
        Ordering::Equal => {
            let Some(mut node) = slot.take() else {
                return false;
            };
            *slot = match (node.left.take(), node.right.take()) {
                (None, None) => None,
                (Some(child), None) | (None, Some(child)) => Some(child),
                (Some(left), Some(right)) => {
                    let successor = right.in_order()[0];
                    let mut right = Some(right);
                    bst_remove(&mut right, successor);
                    node.value = successor;
                    node.left = Some(left);
                    node.right = right;
                    Some(node)
                }
            };
            true
        }
    }
}

impl TreeService for InMemoryTreeService {
    fn insert(&self, value: i64, tree_kind: &str) -> Result<MessageReply, TransportError> {
        let mut state = self.begin(
            ServiceCall::Insert {
                value,
                tree_kind: tree_kind.to_string(),
            },
            "insertar",
        )?;
        bst_insert(state.trees.entry(tree_kind.to_string()).or_default(), value);
        Ok(MessageReply {
            message: format!("Value {value} inserted into {}", tree_kind.to_uppercase()),
        })
    }

    fn remove(&self, value: i64, tree_kind: &str) -> Result<MessageReply, TransportError> {
        let mut state = self.begin(
            ServiceCall::Remove {
                value,
                tree_kind: tree_kind.to_string(),
            },
            "eliminar",
        )?;
        let removed = bst_remove(state.trees.entry(tree_kind.to_string()).or_default(), value);
        let kind = tree_kind.to_uppercase();
        Ok(MessageReply {
            message: if removed {
                format!("Value {value} deleted from {kind}")
            } else {
                format!("Value {value} not found in {kind}")
            },
        })
    }

    fn traverse(&self, order: &str, tree_kind: &str) -> Result<TraversalReply, TransportError> {
        let state = self.begin(
            ServiceCall::Traverse {
                order: order.to_string(),
                tree_kind: tree_kind.to_string(),
            },
            "recorrido",
        )?;
        let sequence = match state.trees.get(tree_kind).and_then(|t| t.as_deref()) {
            None => Vec::new(),
            Some(tree) => match order {
                "inorder" | "inorden" => tree.in_order(),
                "preorder" | "preorden" => tree.pre_order(),
                "postorder" | "postorden" => tree.post_order(),
                "levelorder" | "amplitud" => tree.level_order(),
                _ => Vec::new(),
            },
        };
        Ok(TraversalReply { sequence })
    }

    fn clear(&self, tree_kind: &str) -> Result<MessageReply, TransportError> {
        let mut state = self.begin(
            ServiceCall::Clear {
                tree_kind: tree_kind.to_string(),
            },
            "limpiar",
        )?;
        state.trees.insert(tree_kind.to_string(), None);
        Ok(MessageReply {
            message: format!("{} cleared", tree_kind.to_uppercase()),
        })
    }

    fn snapshot(&self, tree_kind: &str) -> Result<SnapshotReply, TransportError> {
        let state = self.begin(
            ServiceCall::Snapshot {
                tree_kind: tree_kind.to_string(),
            },
            "estructura",
        )?;
        Ok(SnapshotReply {
            tree: state
                .trees
                .get(tree_kind)
                .and_then(|t| t.as_deref().cloned()),
        })
    }
}

/// A drawing call received by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Line { from: Position, to: Position },
    Circle { center: Position, radius: f64 },
    Text { anchor: Position, content: String },
}

/// Canvas that only records what was drawn.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn circles(&self) -> Vec<Position> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { center, .. } => Some(*center),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn line(&mut self, from: Position, to: Position, _stroke: &Stroke) {
        self.ops.push(DrawOp::Line { from, to });
    }

    fn circle(&mut self, center: Position, radius: f64, _fill: &str, _stroke: &Stroke) {
        self.ops.push(DrawOp::Circle { center, radius });
    }

    fn text(&mut self, anchor: Position, content: &str, _style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            anchor,
            content: content.to_string(),
        });
    }
}

// test
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_values_when_inserting_then_builds_search_tree() {
        let service = InMemoryTreeService::new();
        for v in [10, 5, 15, 7] {
            service.insert(v, "abb").unwrap();
        }
        let tree = service.tree("abb").unwrap();
        assert_eq!(tree.in_order(), vec![5, 7, 10, 15]);
        assert_eq!(tree.left.as_ref().unwrap().right.as_ref().unwrap().value, 7);
    }

    #[test]
    fn given_node_with_two_children_when_removing_then_successor_takes_its_place() {
        let service = InMemoryTreeService::new();
        for v in [10, 5, 15, 12, 20] {
            service.insert(v, "abb").unwrap();
        }
        let reply = service.remove(10, "abb").unwrap();
        assert_eq!(reply.message, "Value 10 deleted from ABB");

        let tree = service.tree("abb").unwrap();
        assert_eq!(tree.value, 12);
        assert_eq!(tree.in_order(), vec![5, 12, 15, 20]);
    }

    #[test]
    fn given_absent_value_when_removing_then_reports_not_found() {
        let service = InMemoryTreeService::new();
        service.insert(1, "abb").unwrap();
        let reply = service.remove(2, "abb").unwrap();
        assert_eq!(reply.message, "Value 2 not found in ABB");
    }

    #[test]
    fn given_failure_status_when_calling_then_records_and_fails() {
        let service = InMemoryTreeService::new();
        service.fail_with_status(503);
        let err = service.snapshot("abb").unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
        assert_eq!(service.calls().len(), 1);
    }
}
