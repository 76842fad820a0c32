//! Domain layer: tree snapshots and layout
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod input;
pub mod layout;
pub mod snapshot;

pub use error::DomainError;
pub use input::parse_node_value;
pub use layout::{subtree_width, Edge, Layout, LayoutConfig, NodePath, PlacedNode, Position};
pub use snapshot::{Side, TreeSnapshot, TreeStats};
