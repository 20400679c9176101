//! Cluster specification

use crate::error::{ClusterError, Result};
use crate::node::{LEADER_ORDINAL, NodeRole, hostname_for};
use serde::{Deserialize, Serialize};
use sparkfleet_cloud::{NodeRequest, NodeSizing};
use sparkfleet_playbook::ExtraVars;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub const DEFAULT_DOMAIN: &str = "spark.test";
pub const DEFAULT_REGION: &str = "dal10";

/// Immutable description of the cluster an orchestrator manages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Base hostname; node hostnames are `<name>01`, `<name>02`, ...
    pub name: String,

    /// Total node count, leader included
    pub node_count: u32,

    pub sizing: NodeSizing,

    /// Datacenter / region / availability zone
    pub region: String,

    pub domain: String,

    pub ssh_keys: Vec<String>,

    /// Provider-specific variables
    pub extra_vars: BTreeMap<String, String>,
}

impl ClusterSpec {
    pub fn new(name: impl Into<String>, node_count: u32) -> Self {
        Self {
            name: name.into(),
            node_count,
            sizing: NodeSizing::default(),
            region: DEFAULT_REGION.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            ssh_keys: Vec::new(),
            extra_vars: BTreeMap::new(),
        }
    }

    pub fn with_sizing(mut self, sizing: NodeSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
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

    /// Check naming rules and counts
    ///
    /// Names may only contain ASCII alphanumerics, '.' and '-'; the domain
    /// must look like `Domain.TLD` under the same rule.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ClusterError::InvalidSpec("cluster name is empty".to_string()));
        }
        if !is_host_label(&self.name) {
            return Err(ClusterError::InvalidSpec(format!(
                "cluster name '{}' may only contain letters, digits, '.' and '-'",
                self.name
            )));
        }
        if self.node_count < 1 {
            return Err(ClusterError::InvalidSpec(
                "a cluster needs at least one node".to_string(),
            ));
        }
        if self.sizing.cpus < 1 {
            return Err(ClusterError::InvalidSpec("cpus must be at least 1".to_string()));
        }
        if !self.domain.is_empty() && !is_domain(&self.domain) {
            return Err(ClusterError::InvalidSpec(format!(
                "domain '{}' must be in the form Domain.TLD",
                self.domain
            )));
        }
        Ok(())
    }

    /// Ordinals of every node, leader first
    pub fn ordinals(&self) -> RangeInclusive<u32> {
        LEADER_ORDINAL..=self.node_count
    }

    pub fn hostname(&self, ordinal: u32) -> String {
        hostname_for(&self.name, ordinal)
    }

    pub fn role(&self, ordinal: u32) -> NodeRole {
        NodeRole::for_ordinal(ordinal)
    }

    /// Provider request for the node with the given ordinal
    pub fn node_request(&self, ordinal: u32) -> NodeRequest {
        let mut request = NodeRequest::new(self.hostname(ordinal))
            .with_sizing(self.sizing)
            .with_domain(&self.domain)
            .with_ssh_keys(self.ssh_keys.clone());
        request.extra_vars = self.extra_vars.clone();
        request
            .extra_vars
            .insert("cluster_name".to_string(), self.name.clone());
        request
    }

    /// Cluster-wide playbook variables
    pub fn base_vars(&self) -> ExtraVars {
        let mut vars: ExtraVars = self.extra_vars.iter().collect();
        vars.insert("disk_size", self.sizing.disk_gb);
        vars.insert("memory", self.sizing.memory_mb);
        vars.insert("cpus", self.sizing.cpus);
        vars.insert("ssh_keys", self.ssh_keys.clone());
        vars.insert("cluster_name", &self.name);
        vars.insert("domain", &self.domain);
        vars
    }
}

fn is_host_label(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

fn is_domain(s: &str) -> bool {
    let labels: Vec<&str> = s.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty()) && is_host_label(s)
}
