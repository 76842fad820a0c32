//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::services::{StatusKind, StatusMessage};
use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    /// A session action ended with an error status.
    #[error("{0}")]
    Action(StatusMessage),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Action(status) => match status.kind {
                StatusKind::Invalid => crate::exitcode::DATAERR,
                StatusKind::Failed => crate::exitcode::UNAVAILABLE,
                StatusKind::Success => crate::exitcode::OK,
            },
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Transport(_) => crate::exitcode::UNAVAILABLE,
                InfraError::Application(ApplicationError::Config { .. }) => crate::exitcode::CONFIG,
                InfraError::Application(_) => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::TransportError;

    #[test]
    fn given_rejected_input_when_mapping_exit_code_then_dataerr() {
        let err = CliError::Action(StatusMessage {
            text: "bad".to_string(),
            kind: StatusKind::Invalid,
        });
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err = CliError::from(ApplicationError::Config {
            message: "broken".to_string(),
        });
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }

    #[test]
    fn given_bad_server_url_when_mapping_exit_code_then_unavailable() {
        let err = CliError::Infra(InfraError::Transport(TransportError::InvalidUrl {
            url: "x".to_string(),
            reason: "nope".to_string(),
        }));
        assert_eq!(err.exit_code(), crate::exitcode::UNAVAILABLE);
    }
}
