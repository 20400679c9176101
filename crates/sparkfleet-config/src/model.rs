//! `sparkfleet.yaml` model

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_NODES: u32 = 3;
pub const DEFAULT_CPUS: u32 = 4;
pub const DEFAULT_MEMORY_MB: u32 = 16384;
pub const DEFAULT_DISK_GB: u32 = 25;
pub const DEFAULT_DOMAIN: &str = "spark.test";
pub const DEFAULT_DATACENTER: &str = "dal10";
pub const DEFAULT_REMOTE_USER: &str = "centos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub cluster: ClusterSection,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub playbooks: PlaybookConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSection {
    pub name: String,

    #[serde(default = "default_nodes")]
    pub nodes: u32,

    #[serde(default = "default_cpus")]
    pub cpus: u32,

    /// MB
    #[serde(default = "default_memory")]
    pub memory: u32,

    /// GB
    #[serde(default = "default_disk_size")]
    pub disk_size: u32,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default)]
    pub ssh_keys: Vec<String>,

    #[serde(default)]
    pub extra_vars: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Softlayer {
        #[serde(default = "default_datacenter")]
        datacenter: String,
    },
    Openstack {
        flavor: String,
        image: String,
        #[serde(default)]
        ssh_key: Option<String>,
        /// Entry in clouds.yaml
        #[serde(default)]
        cloud: Option<String>,
        #[serde(default)]
        availability_zone: Option<String>,
        #[serde(default = "default_remote_user")]
        remote_user: String,
    },
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Softlayer {
            datacenter: default_datacenter(),
        }
    }
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Softlayer { .. } => "softlayer",
            ProviderConfig::Openstack { .. } => "openstack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybookConfig {
    /// Directory holding the launch, prepare, start and destroy playbooks
    #[serde(default = "default_playbook_dir")]
    pub dir: PathBuf,

    /// Checkout of the Spark install playbooks
    #[serde(default = "default_spark_install_dir")]
    pub spark_install_dir: PathBuf,
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            dir: default_playbook_dir(),
            spark_install_dir: default_spark_install_dir(),
        }
    }
}

impl ClusterConfig {
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Minimal shape checks; provider-specific limits are checked by the providers
    pub fn validate(&self) -> Result<()> {
        if self.cluster.name.trim().is_empty() {
            return Err(ConfigError::Invalid("cluster.name is empty".to_string()));
        }
        if self.cluster.nodes == 0 {
            return Err(ConfigError::Invalid(
                "cluster.nodes must be at least 1".to_string(),
            ));
        }
        if let ProviderConfig::Openstack { flavor, image, .. } = &self.provider {
            if flavor.is_empty() || image.is_empty() {
                return Err(ConfigError::Invalid(
                    "openstack provider needs both flavor and image".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Make relative playbook directories relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.playbooks.dir.is_relative() {
            self.playbooks.dir = base.join(&self.playbooks.dir);
        }
        if self.playbooks.spark_install_dir.is_relative() {
            self.playbooks.spark_install_dir = base.join(&self.playbooks.spark_install_dir);
        }
    }

    /// Where nodes are placed: the SoftLayer datacenter or the OpenStack
    /// availability zone (empty when the scheduler picks)
    pub fn placement(&self) -> &str {
        match &self.provider {
            ProviderConfig::Softlayer { datacenter } => datacenter,
            ProviderConfig::Openstack {
                availability_zone, ..
            } => availability_zone.as_deref().unwrap_or_default(),
        }
    }

    /// Domain handed to the start stage; OpenStack nodes get none
    pub fn start_domain(&self) -> &str {
        match self.provider {
            ProviderConfig::Softlayer { .. } => &self.cluster.domain,
            ProviderConfig::Openstack { .. } => "",
        }
    }
}

fn default_nodes() -> u32 {
    DEFAULT_NODES
}

fn default_cpus() -> u32 {
    DEFAULT_CPUS
}

fn default_memory() -> u32 {
    DEFAULT_MEMORY_MB
}

fn default_disk_size() -> u32 {
    DEFAULT_DISK_GB
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_datacenter() -> String {
    DEFAULT_DATACENTER.to_string()
}

fn default_remote_user() -> String {
    DEFAULT_REMOTE_USER.to_string()
}

fn default_playbook_dir() -> PathBuf {
    PathBuf::from("playbooks")
}

fn default_spark_install_dir() -> PathBuf {
    PathBuf::from("spark-cluster-install")
}
