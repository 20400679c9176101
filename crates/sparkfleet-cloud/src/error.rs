//! Provisioning provider error types

use thiserror::Error;

/// Provisioning provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Instance creation failed: {0}")]
    InstanceCreateFailed(String),

    #[error("Node creation failed: {0}")]
    CreationFailed(String),

    #[error("Node deletion failed: {0}")]
    DeletionFailed(String),

    #[error("No address reported for node: {0}")]
    AddressUnavailable(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the provider rejected the instance itself (capacity, quota, bad image)
    pub fn is_instance_create_failure(&self) -> bool {
        matches!(self, CloudError::InstanceCreateFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
