//! Sync session: client-side state kept in step with the tree service
//!
//! Holds what a page would show: the value input, the selected tree kind,
//! the status line, the last traversal and the current snapshot. Every
//! operation ends by writing the status line; failures never propagate to
//! the caller. Operations return whether all of their requests succeeded.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{parse_node_value, TreeSnapshot};
use crate::infrastructure::traits::{MessageReply, TreeService};
use crate::infrastructure::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    /// Input rejected locally; nothing was sent
    Invalid,
    /// Request failed or the reply could not be read
    Failed,
}

/// Text of the status line and how to style it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != StatusKind::Success
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&ApplicationError> for StatusMessage {
    fn from(e: &ApplicationError) -> Self {
        Self {
            text: e.to_string(),
            kind: if e.is_validation() {
                StatusKind::Invalid
            } else {
                StatusKind::Failed
            },
        }
    }
}

/// Result of the last traversal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalDisplay {
    pub order: String,
    pub sequence: Vec<i64>,
}

impl fmt::Display for TraversalDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}]", self.order, self.sequence.iter().join(", "))
    }
}

pub struct SyncSession {
    service: Arc<dyn TreeService>,
    tree_kind: String,
    input: String,
    status: Option<StatusMessage>,
    traversal: Option<TraversalDisplay>,
    snapshot: Option<TreeSnapshot>,
}

impl fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSession")
            .field("tree_kind", &self.tree_kind)
            .field("input", &self.input)
            .field("status", &self.status)
            .field("traversal", &self.traversal)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl SyncSession {
    /// Create a session with an empty local view of `tree_kind`.
    pub fn new(service: Arc<dyn TreeService>, tree_kind: impl Into<String>) -> Self {
        Self {
            service,
            tree_kind: tree_kind.into(),
            input: String::new(),
            status: None,
            traversal: None,
            snapshot: None,
        }
    }

    pub fn tree_kind(&self) -> &str {
        &self.tree_kind
    }

    /// Switch the tree kind used by subsequent requests.
    pub fn select_tree_kind(&mut self, tree_kind: impl Into<String>) {
        self.tree_kind = tree_kind.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the text of the value input.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn traversal(&self) -> Option<&TraversalDisplay> {
        self.traversal.as_ref()
    }

    /// Last snapshot received; `None` is the empty tree.
    pub fn snapshot(&self) -> Option<&TreeSnapshot> {
        self.snapshot.as_ref()
    }

    /// Insert the value in the input field into the selected tree.
    ///
    /// On success shows the service's message, clears the input and
    /// refreshes the snapshot.
    #[instrument(level = "debug", skip(self), fields(input = %self.input, kind = %self.tree_kind))]
    pub fn insert(&mut self) -> bool {
        let outcome = self.send_value("insert", |service, value, kind| service.insert(value, kind));
        self.finish_value_request(outcome)
    }

    /// Delete the value in the input field from the selected tree.
    #[instrument(level = "debug", skip(self), fields(input = %self.input, kind = %self.tree_kind))]
    pub fn remove(&mut self) -> bool {
        let outcome = self.send_value("delete", |service, value, kind| service.remove(value, kind));
        self.finish_value_request(outcome)
    }

    /// Request the values of the selected tree in `order`.
    ///
    /// Success leaves the status line alone and replaces the traversal display.
    #[instrument(level = "debug", skip(self), fields(kind = %self.tree_kind))]
    pub fn traverse(&mut self, order: &str) -> bool {
        match self.service.traverse(order, &self.tree_kind) {
            Ok(reply) => {
                let shown = TraversalDisplay {
                    order: order.to_string(),
                    sequence: reply.sequence,
                };
                debug!("traverse: {}", shown);
                self.traversal = Some(shown);
                true
            }
            Err(e) => self.fail(&ApplicationError::service("traversal", e)),
        }
    }

    /// Reset the selected tree and refresh the snapshot.
    #[instrument(level = "debug", skip(self), fields(kind = %self.tree_kind))]
    pub fn clear(&mut self) -> bool {
        match self.service.clear(&self.tree_kind) {
            Ok(reply) => {
                self.status = Some(StatusMessage::success(reply.message));
                self.refresh_snapshot()
            }
            Err(e) => self.fail(&ApplicationError::service("clear", e)),
        }
    }

    /// Fetch the current structure of the selected tree.
    ///
    /// The local snapshot is replaced wholesale; on failure it is kept.
    #[instrument(level = "debug", skip(self), fields(kind = %self.tree_kind))]
    pub fn refresh_snapshot(&mut self) -> bool {
        match self.service.snapshot(&self.tree_kind) {
            Ok(reply) => {
                debug!(
                    "refresh: {} nodes",
                    reply.tree.as_ref().map_or(0, TreeSnapshot::node_count)
                );
                self.snapshot = reply.tree;
                true
            }
            Err(e) => self.fail(&ApplicationError::service("refresh", e)),
        }
    }

    fn send_value<F>(&self, action: &'static str, call: F) -> ApplicationResult<String>
    where
        F: FnOnce(&dyn TreeService, i64, &str) -> Result<MessageReply, TransportError>,
    {
        let value = parse_node_value(&self.input)?;
        let reply = call(self.service.as_ref(), value, &self.tree_kind)
            .map_err(|e| ApplicationError::service(action, e))?;
        Ok(reply.message)
    }

    fn finish_value_request(&mut self, outcome: ApplicationResult<String>) -> bool {
        match outcome {
            Ok(message) => {
                self.status = Some(StatusMessage::success(message));
                self.input.clear();
                self.refresh_snapshot()
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Show `e` on the status line; always `false`.
    fn fail(&mut self, e: &ApplicationError) -> bool {
        warn!("{}", e);
        self.status = Some(StatusMessage::from(e));
        false
    }
}
