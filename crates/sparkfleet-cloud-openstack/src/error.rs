//! OpenStack provider error types

use sparkfleet_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found. Please install: pip install python-openstackclient")]
    CliNotFound,

    #[error("openstack command failed: {0}")]
    CommandFailed(String),

    #[error("Server not found: {0}")]
    ServerNotFound(String),

    #[error("Server {name} went into ERROR state: {fault}")]
    ServerError { name: String, fault: String },

    #[error("Server {0} has no address")]
    NoAddress(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

impl From<OpenStackError> for CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::ServerNotFound(name) => CloudError::NodeNotFound(name),
            OpenStackError::ServerError { .. } => CloudError::InstanceCreateFailed(err.to_string()),
            OpenStackError::NoAddress(name) => CloudError::AddressUnavailable(name),
            OpenStackError::CloudError(e) => e,
            other => CloudError::CommandFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
