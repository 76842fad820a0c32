//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (TreeService, Canvas)
//! but are themselves concrete structs, not traits.

mod render;
mod session;

pub use render::{outline, RenderStyle, Renderer, EMPTY_TREE_LABEL};
pub use session::{StatusKind, StatusMessage, SyncSession, TraversalDisplay};
