//! Playbook runner error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybookError {
    #[error("{0} not found. Please install: pip install ansible")]
    ProgramNotFound(String),

    #[error("Instance creation failed while running {playbook} (exit {})", describe_exit(.exit_code))]
    InstanceCreateFailure {
        playbook: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error(
        "Playbook {playbook} failed (exit {}) with:\n\tstderr:\n\t\t{stderr}\n\tstdout:\n\t\t{stdout}",
        describe_exit(.exit_code)
    )]
    PipelineFailure {
        playbook: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Playbook {playbook} did not finish within {timeout:?}")]
    Timeout { playbook: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybookError {
    pub fn is_instance_create_failure(&self) -> bool {
        matches!(self, PlaybookError::InstanceCreateFailure { .. })
    }

    /// Captured stdout, when the process ran to completion
    pub fn stdout(&self) -> Option<&str> {
        match self {
            PlaybookError::InstanceCreateFailure { stdout, .. }
            | PlaybookError::PipelineFailure { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// Captured stderr, when the process ran to completion
    pub fn stderr(&self) -> Option<&str> {
        match self {
            PlaybookError::InstanceCreateFailure { stderr, .. }
            | PlaybookError::PipelineFailure { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PlaybookError>;
