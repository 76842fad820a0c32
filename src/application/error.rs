//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::TransportError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{action} failed: {source}")]
    Service {
        action: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn service(action: &'static str, source: TransportError) -> Self {
        Self::Service { action, source }
    }

    /// Input was rejected before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
