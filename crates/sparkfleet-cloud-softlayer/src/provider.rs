//! SoftLayer provider implementation

use crate::error::{Result, SoftLayerError};
use crate::slcli::Slcli;
use async_trait::async_trait;
use sparkfleet_cloud::{NodeHandle, NodeProvider, NodeRequest, parse_address};
use sparkfleet_playbook::{AnsiblePlaybook, ExtraVars, PipelineInvocation, PlaybookRunner};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Memory sizes (MB) SoftLayer accepts for virtual servers
pub const VALID_MEMORY_MB: &[u32] = &[
    1024, 2048, 4096, 6144, 8192, 12288, 16384, 32768, 49152, 65536, 131072, 247808,
];

/// Datacenters virtual servers can be ordered in
pub const DATACENTERS: &[&str] = &[
    "ams01", "ams03", "che01", "dal01", "dal05", "dal06", "dal09", "dal10", "fra02", "hkg02",
    "hou02", "lon02", "mel01", "mex01", "mil01", "mon01", "osl01", "par01", "sjc01", "sjc03",
    "sao01", "sea01", "sng01", "syd01", "tok02", "tor01", "wdc01", "wdc04",
];

pub const DEFAULT_DATACENTER: &str = "dal10";

const LAUNCH_PLAYBOOK: &str = "sl_launch.yml";
const DESTROY_PLAYBOOK: &str = "sl_destroy.yml";

/// SoftLayer provider
///
/// Nodes are ordered through the launch playbook; the address is looked up
/// afterwards by hostname since the playbook does not report it.
pub struct SoftLayerProvider {
    slcli: Slcli,
    runner: Arc<dyn PlaybookRunner>,
    playbook_dir: PathBuf,
    datacenter: String,
    base_vars: ExtraVars,
}

impl SoftLayerProvider {
    pub fn new(datacenter: impl Into<String>, playbook_dir: impl AsRef<Path>) -> Self {
        Self {
            slcli: Slcli::new(),
            runner: Arc::new(AnsiblePlaybook::new()),
            playbook_dir: playbook_dir.as_ref().to_path_buf(),
            datacenter: datacenter.into(),
            base_vars: ExtraVars::new(),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn PlaybookRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_slcli(mut self, slcli: Slcli) -> Self {
        self.slcli = slcli;
        self
    }

    /// Cluster-wide variables sent with every launch and destroy
    pub fn with_vars(mut self, vars: ExtraVars) -> Self {
        self.base_vars = vars;
        self
    }

    pub fn datacenter(&self) -> &str {
        &self.datacenter
    }

    /// Check the datacenter and the sizing of a request
    pub fn validate(&self, request: &NodeRequest) -> Result<()> {
        if !DATACENTERS.contains(&self.datacenter.as_str()) {
            return Err(SoftLayerError::InvalidDatacenter(self.datacenter.clone()));
        }
        if !VALID_MEMORY_MB.contains(&request.sizing.memory_mb) {
            return Err(SoftLayerError::InvalidMemory(request.sizing.memory_mb));
        }
        Ok(())
    }

    /// Variables for the launch playbook of one node
    pub fn launch_vars(&self, request: &NodeRequest) -> ExtraVars {
        let mut vars = self.base_vars.clone();
        for (key, value) in &request.extra_vars {
            vars.insert(key, value);
        }
        vars.insert("disk_size", request.sizing.disk_gb);
        vars.insert("memory", request.sizing.memory_mb);
        vars.insert("cpus", request.sizing.cpus);
        vars.insert("ssh_keys", request.ssh_keys.clone());
        vars.insert("domain", &request.domain);
        vars.insert("datacenter", &self.datacenter);
        vars.insert("hostname", &request.hostname);
        vars
    }

    fn destroy_vars(&self, hostname: &str) -> ExtraVars {
        self.base_vars
            .clone()
            .with("datacenter", &self.datacenter)
            .with("hostname", hostname)
    }

    async fn launch(&self, request: &NodeRequest) -> Result<NodeHandle> {
        self.validate(request)?;

        let invocation = PipelineInvocation::new(self.playbook_dir.join(LAUNCH_PLAYBOOK))
            .with_extra_vars(self.launch_vars(request));
        self.runner.run(&invocation).await?;

        tracing::info!("Launched virtual server {}", request.hostname);
        Ok(NodeHandle::new(&request.hostname, &request.hostname))
    }

    async fn lookup_address(&self, hostname: &str) -> Result<IpAddr> {
        let server = self.slcli.get_server(hostname).await?;
        let ip = server
            .primary_ip()
            .ok_or_else(|| SoftLayerError::ServerNotFound(format!("{} has no primary IP", hostname)))?;
        Ok(parse_address(hostname, ip)?)
    }

    async fn teardown(&self, hostname: &str) -> Result<()> {
        let invocation = PipelineInvocation::new(self.playbook_dir.join(DESTROY_PLAYBOOK))
            .with_extra_vars(self.destroy_vars(hostname));
        self.runner.run(&invocation).await?;

        tracing::info!("Destroyed virtual server {}", hostname);
        Ok(())
    }
}

#[async_trait]
impl NodeProvider for SoftLayerProvider {
    fn name(&self) -> &str {
        "softlayer"
    }

    fn display_name(&self) -> &str {
        "IBM Cloud (SoftLayer)"
    }

    async fn create_node(&self, request: &NodeRequest) -> sparkfleet_cloud::Result<NodeHandle> {
        Ok(self.launch(request).await?)
    }

    async fn resolve_address(&self, node: &NodeHandle) -> sparkfleet_cloud::Result<IpAddr> {
        Ok(self.lookup_address(&node.hostname).await?)
    }

    async fn destroy_node(&self, hostname: &str) -> sparkfleet_cloud::Result<()> {
        Ok(self.teardown(hostname).await?)
    }
}
