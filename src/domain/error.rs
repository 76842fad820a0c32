//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent input that never reaches the tree service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("please enter a valid numeric value (got {input:?})")]
    InvalidValue { input: String },
}
