//! Error taxonomy for the orchestration layer.
//!
//! Failures of delegated commands are never represented here; they are
//! captured as [`crate::runner::ExecutionOutcome`] data at the runner
//! boundary. These variants cover defects in the orchestration itself.

use std::path::PathBuf;

/// Orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum AutofixError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("workspace not found: {0}")]
    WorkspaceNotFound(PathBuf),

    #[error("orchestrator already started (state: {state})")]
    AlreadyStarted { state: String },

    #[error("command has an empty program")]
    EmptyCommand,
}

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, AutofixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autofix_error_display() {
        let err = AutofixError::InvalidConfig("timeout overflow".to_string());
        assert!(err.to_string().contains("invalid configuration"));

        let err = AutofixError::WorkspaceNotFound(PathBuf::from("/nope"));
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_already_started_mentions_state() {
        let err = AutofixError::AlreadyStarted {
            state: "concluded".to_string(),
        };
        assert!(err.to_string().contains("concluded"));
    }
}
