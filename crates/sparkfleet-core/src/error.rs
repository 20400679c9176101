//! Cluster lifecycle error types

use crate::inventory::InventoryError;
use crate::report::TeardownReport;
use crate::stage::StageKind;
use sparkfleet_cloud::CloudError;
use sparkfleet_playbook::PlaybookError;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Invalid cluster spec: {0}")]
    InvalidSpec(String),

    #[error("Provisioning {hostname} failed: {source}")]
    Provision {
        hostname: String,
        #[source]
        source: CloudError,
    },

    #[error("{hostname} ({address}) never accepted SSH connections after {attempts} attempts")]
    ReadinessTimeout {
        hostname: String,
        address: IpAddr,
        attempts: u32,
    },

    #[error("Playbook error: {0}")]
    Playbook(#[from] PlaybookError),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: StageKind,
        #[source]
        source: PlaybookError,
    },

    #[error(transparent)]
    Destroy(#[from] DestroyError),

    #[error(
        "Teardown incomplete: {} of {} node(s) could not be destroyed",
        .0.failed.len(),
        .0.total()
    )]
    TeardownIncomplete(TeardownReport),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Cluster {0} has not been deployed")]
    NotDeployed(String),

    #[error("Provisioning task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClusterError {
    /// True when the provider refused to create an instance, whether that
    /// surfaced from a provider call or from a playbook's output
    pub fn is_instance_create_failure(&self) -> bool {
        match self {
            ClusterError::Provision { source, .. } => source.is_instance_create_failure(),
            ClusterError::Playbook(source) | ClusterError::Stage { source, .. } => {
                source.is_instance_create_failure()
            }
            ClusterError::Destroy(e) => e.source.is_instance_create_failure(),
            _ => false,
        }
    }
}

/// Failure to tear down one node
#[derive(Error, Debug)]
#[error("Failed to destroy {hostname}: {source}")]
pub struct DestroyError {
    pub hostname: String,
    #[source]
    pub source: CloudError,
}

pub type Result<T> = std::result::Result<T, ClusterError>;
