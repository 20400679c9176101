//! Provisioned node records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Ordinal of the leader node
pub const LEADER_ORDINAL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Leader,
    Follower,
}

impl NodeRole {
    pub fn for_ordinal(ordinal: u32) -> Self {
        if ordinal == LEADER_ORDINAL {
            NodeRole::Leader
        } else {
            NodeRole::Follower
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Leader => write!(f, "leader"),
            NodeRole::Follower => write!(f, "follower"),
        }
    }
}

/// A node whose address is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub hostname: String,
    pub role: NodeRole,
    pub address: IpAddr,
    pub ordinal: u32,
}

impl NodeRecord {
    pub fn new(hostname: impl Into<String>, role: NodeRole, address: IpAddr, ordinal: u32) -> Self {
        Self {
            hostname: hostname.into(),
            role,
            address,
            ordinal,
        }
    }

    pub fn leader(hostname: impl Into<String>, address: IpAddr) -> Self {
        Self::new(hostname, NodeRole::Leader, address, LEADER_ORDINAL)
    }

    pub fn follower(hostname: impl Into<String>, address: IpAddr, ordinal: u32) -> Self {
        Self::new(hostname, NodeRole::Follower, address, ordinal)
    }

    pub fn is_leader(&self) -> bool {
        self.role == NodeRole::Leader
    }

    /// Host line of the inventory
    pub fn inventory_line(&self) -> String {
        format!(
            "{} ansible_host={} ansible_host_id={}\n",
            self.hostname, self.address, self.ordinal
        )
    }
}

/// Hostname of the node with the given ordinal: `<cluster><ordinal:02>`
pub fn hostname_for(cluster_name: &str, ordinal: u32) -> String {
    format!("{}{:02}", cluster_name, ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_for() {
        assert_eq!(hostname_for("demo", 1), "demo01");
        assert_eq!(hostname_for("demo", 12), "demo12");
        assert_eq!(hostname_for("demo", 100), "demo100");
    }

    #[test]
    fn test_role_for_ordinal() {
        assert_eq!(NodeRole::for_ordinal(1), NodeRole::Leader);
        assert_eq!(NodeRole::for_ordinal(2), NodeRole::Follower);
    }

    #[test]
    fn test_inventory_line() {
        let node = NodeRecord::follower("demo03", "10.0.0.3".parse().unwrap(), 3);
        assert_eq!(
            node.inventory_line(),
            "demo03 ansible_host=10.0.0.3 ansible_host_id=3\n"
        );
    }
}
