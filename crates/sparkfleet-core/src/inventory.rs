//! Ansible inventory for a provisioned cluster
//!
//! The rendered text is read by every configuration stage, so its shape is a
//! stable contract: a fixed `[all:vars]` block, the leader under `[master]`
//! and the followers under `[nodes]`.

use crate::node::{LEADER_ORDINAL, NodeRecord, NodeRole};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

const GLOBAL_VARS: &str = "[all:vars]
ansible_connection=ssh
gather_facts=True
gathering=smart
host_key_checking=False
install_java=True
install_temp_dir=/tmp/ansible-install
install_dir=/opt
python_version=2
";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InventoryError {
    #[error("No leader node was recorded")]
    MissingLeader,

    #[error("More than one leader recorded: {0}")]
    DuplicateLeader(String),

    #[error("Follower ordinal {0} recorded more than once")]
    DuplicateOrdinal(u32),

    #[error("Follower {0} uses the leader ordinal")]
    FollowerWithLeaderOrdinal(String),
}

/// Accumulates node records while a cluster is being provisioned
#[derive(Debug, Clone, Default)]
pub struct InventoryBuilder {
    remote_user: Option<String>,
    leader: Option<NodeRecord>,
    extra_leaders: Vec<String>,
    followers: Vec<NodeRecord>,
}

impl InventoryBuilder {
    pub fn new(remote_user: Option<String>) -> Self {
        Self {
            remote_user,
            ..Default::default()
        }
    }

    pub fn record_leader(&mut self, hostname: impl Into<String>, address: IpAddr) {
        self.record(NodeRecord::leader(hostname, address));
    }

    pub fn record_follower(&mut self, hostname: impl Into<String>, address: IpAddr, ordinal: u32) {
        self.record(NodeRecord::follower(hostname, address, ordinal));
    }

    pub fn record(&mut self, node: NodeRecord) {
        tracing::debug!("Recording {} {} at {}", node.role, node.hostname, node.address);
        match node.role {
            NodeRole::Leader => {
                if self.leader.is_some() {
                    self.extra_leaders.push(node.hostname);
                } else {
                    self.leader = Some(node);
                }
            }
            NodeRole::Follower => self.followers.push(node),
        }
    }

    /// Number of recorded nodes
    pub fn len(&self) -> usize {
        self.followers.len() + usize::from(self.leader.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render whatever has been recorded so far.
    ///
    /// Only meaningful once every provisioning task has finished; before that
    /// the result is a partial inventory.
    pub fn render(&self) -> String {
        let mut followers: Vec<&NodeRecord> = self.followers.iter().collect();
        followers.sort_by_key(|n| n.ordinal);
        render(self.remote_user.as_deref(), self.leader.as_ref(), &followers)
    }

    /// Check the topology and freeze it
    pub fn finish(self) -> Result<Inventory, InventoryError> {
        if let Some(extra) = self.extra_leaders.first() {
            return Err(InventoryError::DuplicateLeader(extra.clone()));
        }
        let leader = self.leader.ok_or(InventoryError::MissingLeader)?;

        let mut seen = BTreeSet::new();
        for follower in &self.followers {
            if follower.ordinal == LEADER_ORDINAL {
                return Err(InventoryError::FollowerWithLeaderOrdinal(
                    follower.hostname.clone(),
                ));
            }
            if !seen.insert(follower.ordinal) {
                return Err(InventoryError::DuplicateOrdinal(follower.ordinal));
            }
        }

        let mut followers = self.followers;
        followers.sort_by_key(|n| n.ordinal);

        Ok(Inventory {
            remote_user: self.remote_user,
            leader,
            followers,
        })
    }
}

/// Complete inventory: one leader, followers ordered by ordinal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    remote_user: Option<String>,
    leader: NodeRecord,
    followers: Vec<NodeRecord>,
}

impl Inventory {
    /// `$TMPDIR/spark_inv_<cluster>.ini`
    pub fn default_path(cluster_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("spark_inv_{}.ini", cluster_name))
    }

    pub fn leader(&self) -> &NodeRecord {
        &self.leader
    }

    pub fn followers(&self) -> &[NodeRecord] {
        &self.followers
    }

    pub fn remote_user(&self) -> Option<&str> {
        self.remote_user.as_deref()
    }

    /// All nodes, leader first
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        std::iter::once(&self.leader).chain(self.followers.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.followers.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn render(&self) -> String {
        let followers: Vec<&NodeRecord> = self.followers.iter().collect();
        render(self.remote_user.as_deref(), Some(&self.leader), &followers)
    }

    /// Write the rendered inventory, replacing any previous file
    pub async fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.render()).await?;
        tracing::debug!("Wrote inventory for {} nodes to {}", self.len(), path.display());
        Ok(())
    }
}

fn render(remote_user: Option<&str>, leader: Option<&NodeRecord>, followers: &[&NodeRecord]) -> String {
    let mut out = String::from(GLOBAL_VARS);
    if let Some(user) = remote_user {
        out.push_str(&format!("ansible_user={}\n", user));
    }

    out.push_str("\n[master]\n");
    if let Some(leader) = leader {
        out.push_str(&leader.inventory_line());
    }

    out.push_str("\n[nodes]\n");
    for follower in followers {
        out.push_str(&follower.inventory_line());
    }
    out
}
