//! Node provider trait definition

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Node provisioning abstraction trait
///
/// Every infrastructure backend (SoftLayer, OpenStack) implements this trait.
/// The orchestrator only ever talks to `dyn NodeProvider`, so the lifecycle
/// contract is identical across backends even though node creation and
/// address resolution work differently underneath.
#[async_trait]
pub trait NodeProvider: Send + Sync {
    /// Returns the provider name (e.g., "softlayer", "openstack")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// User for control-channel connections to freshly created nodes.
    ///
    /// When set, the orchestrator waits for SSH before recording the node and
    /// writes the user into the inventory.
    fn remote_user(&self) -> Option<&str> {
        None
    }

    /// Ask the provider to create a node
    async fn create_node(&self, request: &NodeRequest) -> Result<NodeHandle>;

    /// Look up the network address of a created node
    async fn resolve_address(&self, node: &NodeHandle) -> Result<IpAddr>;

    /// Create a node and return its address.
    ///
    /// Uses the address reported by the create call when there is one and
    /// falls back to `resolve_address` otherwise.
    async fn create(&self, request: &NodeRequest) -> Result<IpAddr> {
        let node = self.create_node(request).await?;
        match node.address {
            Some(address) => Ok(address),
            None => self.resolve_address(&node).await,
        }
    }

    /// Destroy a node by hostname
    async fn destroy_node(&self, hostname: &str) -> Result<()>;
}

/// Per-node sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSizing {
    pub cpus: u32,

    /// Memory in MB
    pub memory_mb: u32,

    /// Disk size in GB
    pub disk_gb: u32,
}

impl Default for NodeSizing {
    fn default() -> Self {
        Self {
            cpus: 4,
            memory_mb: 16384,
            disk_gb: 25,
        }
    }
}

/// Everything a provider needs to create one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRequest {
    pub hostname: String,
    pub sizing: NodeSizing,
    pub domain: String,
    pub ssh_keys: Vec<String>,

    /// Provider-specific variables passed through untouched
    pub extra_vars: BTreeMap<String, String>,
}

impl NodeRequest {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            sizing: NodeSizing::default(),
            domain: String::new(),
            ssh_keys: Vec::new(),
            extra_vars: BTreeMap::new(),
        }
    }

    pub fn with_sizing(mut self, sizing: NodeSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_ssh_keys(mut self, keys: Vec<String>) -> Self {
        self.ssh_keys = keys;
        self
    }

    pub fn with_extra_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_vars.insert(key.into(), value.into());
        self
    }
}

/// Provider-side handle of a created node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// Provider-specific node ID
    pub id: String,

    pub hostname: String,

    /// Address, if the create call already reported one
    pub address: Option<IpAddr>,
}

impl NodeHandle {
    pub fn new(id: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hostname: hostname.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }
}

/// Parse an address string reported by a provider CLI
pub fn parse_address(hostname: &str, raw: &str) -> Result<IpAddr> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CloudError::AddressUnavailable(hostname.to_string()));
    }
    raw.parse::<IpAddr>().map_err(|_| {
        CloudError::AddressUnavailable(format!("{}: unparseable address '{}'", hostname, raw))
    })
}
