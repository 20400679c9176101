//! OpenStack provider implementation

use crate::cli::{CreateServerConfig, OpenStackCli};
use crate::error::{OpenStackError, Result};
use async_trait::async_trait;
use sparkfleet_cloud::{NodeHandle, NodeProvider, NodeRequest};
use std::net::IpAddr;

pub const DEFAULT_REMOTE_USER: &str = "centos";

/// OpenStack provider
///
/// The create call usually reports the server address already; when it does
/// not, the address is read back from the server metadata.
pub struct OpenStackProvider {
    cli: OpenStackCli,
    flavor: String,
    image: String,
    key_name: Option<String>,
    availability_zone: Option<String>,
    remote_user: String,
}

impl OpenStackProvider {
    /// `image` should be a CentOS or RHEL image, which is what the Spark
    /// playbooks expect.
    pub fn new(flavor: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            cli: OpenStackCli::new(None),
            flavor: flavor.into(),
            image: image.into(),
            key_name: None,
            availability_zone: None,
            remote_user: DEFAULT_REMOTE_USER.to_string(),
        }
    }

    pub fn with_cloud(mut self, cloud: Option<String>) -> Self {
        self.cli = OpenStackCli::new(cloud);
        self
    }

    pub fn with_cli(mut self, cli: OpenStackCli) -> Self {
        self.cli = cli;
        self
    }

    pub fn with_key_name(mut self, key_name: Option<String>) -> Self {
        self.key_name = key_name;
        self
    }

    /// Placement for every server; `None` lets the scheduler pick
    pub fn with_availability_zone(mut self, zone: Option<String>) -> Self {
        self.availability_zone = zone.filter(|z| !z.is_empty());
        self
    }

    pub fn with_remote_user(mut self, user: impl Into<String>) -> Self {
        self.remote_user = user.into();
        self
    }

    /// Server create parameters for one node request
    pub fn server_config(&self, request: &NodeRequest) -> CreateServerConfig {
        CreateServerConfig {
            name: request.hostname.clone(),
            image: self.image.clone(),
            flavor: self.flavor.clone(),
            key_name: self
                .key_name
                .clone()
                .or_else(|| request.ssh_keys.first().cloned()),
            availability_zone: self.availability_zone.clone(),
        }
    }

    async fn launch(&self, request: &NodeRequest) -> Result<NodeHandle> {
        let server = self.cli.create_server(&self.server_config(request)).await?;

        if server.is_error() {
            return Err(OpenStackError::ServerError {
                name: server.name.clone(),
                fault: server.fault_message(),
            });
        }

        tracing::info!("Created server {} ({})", server.name, server.id);
        let handle = NodeHandle::new(&server.id, &request.hostname);
        Ok(match server.interface_ip() {
            Some(ip) => handle.with_address(ip),
            None => handle,
        })
    }

    async fn lookup_address(&self, node: &NodeHandle) -> Result<IpAddr> {
        tracing::debug!("No address reported for {}, reading server metadata", node.hostname);
        let server = self.cli.get_server(&node.id).await?;
        server
            .interface_ip()
            .ok_or_else(|| OpenStackError::NoAddress(node.hostname.clone()))
    }
}

#[async_trait]
impl NodeProvider for OpenStackProvider {
    fn name(&self) -> &str {
        "openstack"
    }

    fn display_name(&self) -> &str {
        "OpenStack"
    }

    fn remote_user(&self) -> Option<&str> {
        Some(self.remote_user.as_str())
    }

    async fn create_node(&self, request: &NodeRequest) -> sparkfleet_cloud::Result<NodeHandle> {
        Ok(self.launch(request).await?)
    }

    async fn resolve_address(&self, node: &NodeHandle) -> sparkfleet_cloud::Result<IpAddr> {
        Ok(self.lookup_address(node).await?)
    }

    async fn destroy_node(&self, hostname: &str) -> sparkfleet_cloud::Result<()> {
        self.cli
            .delete_server(hostname)
            .await
            .map_err(sparkfleet_cloud::CloudError::from)?;
        tracing::info!("Deleted server {}", hostname);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkfleet_cloud::CloudError;

    #[test]
    fn test_server_config_key_fallback() {
        let provider = OpenStackProvider::new("m1.large", "centos-7");
        let request = NodeRequest::new("demo01").with_ssh_keys(vec!["ops-key".to_string()]);
        assert_eq!(
            provider.server_config(&request).key_name.as_deref(),
            Some("ops-key")
        );

        let provider = provider.with_key_name(Some("spark-key".to_string()));
        let config = provider.server_config(&request);
        assert_eq!(config.key_name.as_deref(), Some("spark-key"));
        assert_eq!(config.name, "demo01");
        assert_eq!(config.flavor, "m1.large");
        assert!(config.availability_zone.is_none());
    }

    #[test]
    fn test_availability_zone() {
        let request = NodeRequest::new("demo01");
        let provider = OpenStackProvider::new("m1.large", "centos-7")
            .with_availability_zone(Some("nova-east".to_string()));
        assert_eq!(
            provider.server_config(&request).availability_zone.as_deref(),
            Some("nova-east")
        );

        let unplaced = OpenStackProvider::new("m1.large", "centos-7")
            .with_availability_zone(Some(String::new()));
        assert!(unplaced.server_config(&request).availability_zone.is_none());
    }

    #[test]
    fn test_remote_user() {
        let provider = OpenStackProvider::new("m1.large", "centos-7");
        assert_eq!(provider.remote_user(), Some("centos"));
        let provider = provider.with_remote_user("cloud-user");
        assert_eq!(provider.remote_user(), Some("cloud-user"));
    }

    #[test]
    fn test_error_state_is_instance_create_failure() {
        let err: CloudError = OpenStackError::ServerError {
            name: "demo01".to_string(),
            fault: "No valid host was found.".to_string(),
        }
        .into();
        assert!(err.is_instance_create_failure());
    }

    #[tokio::test]
    async fn test_missing_cli() {
        let provider = OpenStackProvider::new("m1.large", "centos-7")
            .with_cli(OpenStackCli::new(None).with_program("/nonexistent/openstack"));

        let err = provider.destroy_node("demo01").await.unwrap_err();
        assert!(matches!(err, CloudError::CommandFailed(_)));
    }
}
