//! SoftLayer provider error types

use sparkfleet_cloud::CloudError;
use sparkfleet_playbook::PlaybookError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoftLayerError {
    #[error("slcli not found. Please install: pip install SoftLayer")]
    SlcliNotFound,

    #[error("slcli command failed: {0}")]
    CommandFailed(String),

    #[error("Virtual server not found: {0}")]
    ServerNotFound(String),

    #[error("Invalid datacenter: {0}")]
    InvalidDatacenter(String),

    #[error("Invalid memory size: {0} MB")]
    InvalidMemory(u32),

    #[error("Playbook error: {0}")]
    Playbook(#[from] PlaybookError),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

impl From<SoftLayerError> for CloudError {
    fn from(err: SoftLayerError) -> Self {
        match err {
            SoftLayerError::ServerNotFound(name) => CloudError::NodeNotFound(name),
            SoftLayerError::InvalidDatacenter(_) | SoftLayerError::InvalidMemory(_) => {
                CloudError::InvalidConfig(err.to_string())
            }
            SoftLayerError::Playbook(e) if e.is_instance_create_failure() => {
                CloudError::InstanceCreateFailed(e.to_string())
            }
            SoftLayerError::CloudError(e) => e,
            other => CloudError::CommandFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SoftLayerError>;
