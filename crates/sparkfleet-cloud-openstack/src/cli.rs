//! openstack CLI wrapper
//!
//! Wraps the python-openstackclient commands for server operations.

use crate::error::{OpenStackError, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// openstack CLI wrapper
#[derive(Debug, Clone)]
pub struct OpenStackCli {
    program: PathBuf,
    cloud: Option<String>,
}

impl OpenStackCli {
    /// `cloud` selects an entry of clouds.yaml; `None` uses the OS_* environment
    pub fn new(cloud: Option<String>) -> Self {
        Self {
            program: PathBuf::from("openstack"),
            cloud,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run an openstack command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        if let Some(ref cloud) = self.cloud {
            cmd.arg("--os-cloud").arg(cloud);
        }
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: openstack {}", args.join(" "));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OpenStackError::CliNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No server with a name or ID") {
                return Err(OpenStackError::ServerNotFound(stderr.trim().to_string()));
            }
            return Err(OpenStackError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Arguments of `server create` for `config`
    pub fn create_args(config: &CreateServerConfig) -> Vec<String> {
        let mut args = vec![
            "server".to_string(),
            "create".to_string(),
            "--image".to_string(),
            config.image.clone(),
            "--flavor".to_string(),
            config.flavor.clone(),
        ];

        if let Some(ref key_name) = config.key_name {
            args.push("--key-name".to_string());
            args.push(key_name.clone());
        }
        if let Some(ref zone) = config.availability_zone {
            args.push("--availability-zone".to_string());
            args.push(zone.clone());
        }

        args.extend(["--wait", "-f", "json"].map(String::from));
        args.push(config.name.clone());
        args
    }

    /// Create a server and wait until it is active
    pub async fn create_server(&self, config: &CreateServerConfig) -> Result<ServerInfo> {
        let args = Self::create_args(config);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.run_command(&args).await?;
        let server: ServerInfo = serde_json::from_str(&output)?;
        Ok(server)
    }

    /// Show a server by name or ID
    pub async fn get_server(&self, name: &str) -> Result<ServerInfo> {
        let output = self
            .run_command(&["server", "show", "-f", "json", name])
            .await?;
        let server: ServerInfo = serde_json::from_str(&output)?;
        Ok(server)
    }

    /// Delete a server and wait for it to be gone
    pub async fn delete_server(&self, name: &str) -> Result<()> {
        self.run_command(&["server", "delete", "--wait", name])
            .await?;
        Ok(())
    }
}

/// Configuration for creating a server
#[derive(Debug, Clone)]
pub struct CreateServerConfig {
    pub name: String,
    pub image: String,
    pub flavor: String,
    pub key_name: Option<String>,
    pub availability_zone: Option<String>,
}

/// Server document from `openstack server create/show -f json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(rename = "accessIPv4", default)]
    pub access_ipv4: Option<String>,

    /// Either `"net=10.0.0.5, 172.24.4.9"` or `{"net": ["10.0.0.5"]}`
    /// depending on the client version
    #[serde(default)]
    pub addresses: serde_json::Value,

    #[serde(default)]
    pub fault: Option<serde_json::Value>,
}

impl ServerInfo {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("ERROR")
    }

    pub fn fault_message(&self) -> String {
        match &self.fault {
            Some(serde_json::Value::Object(map)) => map
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown fault")
                .to_string(),
            Some(other) => other.to_string(),
            None => "unknown fault".to_string(),
        }
    }

    /// Every address listed for the server, in reported order
    pub fn all_addresses(&self) -> Vec<IpAddr> {
        let mut raw: Vec<String> = Vec::new();
        match &self.addresses {
            serde_json::Value::String(s) => {
                // "net1=10.0.0.5, 172.24.4.9; net2=192.168.0.4"
                for network in s.split(';') {
                    let list = network.split_once('=').map(|(_, l)| l).unwrap_or(network);
                    raw.extend(list.split(',').map(|a| a.trim().to_string()));
                }
            }
            serde_json::Value::Object(map) => {
                for list in map.values() {
                    if let Some(items) = list.as_array() {
                        for item in items {
                            match item {
                                serde_json::Value::String(a) => raw.push(a.clone()),
                                serde_json::Value::Object(entry) => {
                                    if let Some(a) = entry.get("addr").and_then(|a| a.as_str()) {
                                        raw.push(a.to_string());
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        raw.iter().filter_map(|a| a.parse().ok()).collect()
    }

    /// Address to reach the server on: accessIPv4, else the first public
    /// IPv4 address, else the first address of any kind
    pub fn interface_ip(&self) -> Option<IpAddr> {
        if let Some(ip) = self
            .access_ipv4
            .as_deref()
            .and_then(|a| a.trim().parse::<IpAddr>().ok())
        {
            return Some(ip);
        }

        let addresses = self.all_addresses();
        addresses
            .iter()
            .find(|ip| match ip {
                IpAddr::V4(v4) => !v4.is_private() && !v4.is_loopback() && !v4.is_link_local(),
                IpAddr::V6(_) => false,
            })
            .or_else(|| addresses.first())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(json: &str) -> ServerInfo {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_args() {
        let mut config = CreateServerConfig {
            name: "demo01".to_string(),
            image: "centos-7".to_string(),
            flavor: "m1.large".to_string(),
            key_name: Some("ops".to_string()),
            availability_zone: None,
        };
        assert_eq!(
            OpenStackCli::create_args(&config).join(" "),
            "server create --image centos-7 --flavor m1.large --key-name ops --wait -f json demo01"
        );

        config.key_name = None;
        config.availability_zone = Some("nova-east".to_string());
        assert_eq!(
            OpenStackCli::create_args(&config).join(" "),
            "server create --image centos-7 --flavor m1.large --availability-zone nova-east --wait -f json demo01"
        );
    }

    #[test]
    fn test_interface_ip_prefers_access_ip() {
        let s = server(
            r#"{"id": "a1", "name": "demo01", "status": "ACTIVE",
                "accessIPv4": "203.0.113.7", "addresses": "private=10.0.0.5"}"#,
        );
        assert_eq!(s.interface_ip(), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_interface_ip_from_string_addresses() {
        let s = server(
            r#"{"id": "a1", "name": "demo01", "status": "ACTIVE",
                "accessIPv4": "", "addresses": "private=10.0.0.5, 172.24.4.9, 198.51.100.20"}"#,
        );
        assert_eq!(s.all_addresses().len(), 3);
        assert_eq!(s.interface_ip(), Some("198.51.100.20".parse().unwrap()));
    }

    #[test]
    fn test_interface_ip_from_map_addresses() {
        let s = server(
            r#"{"id": "a1", "name": "demo01", "addresses": {"private": ["10.0.0.5"]}}"#,
        );
        assert_eq!(s.interface_ip(), Some("10.0.0.5".parse().unwrap()));
    }

    #[test]
    fn test_no_address_yet() {
        let s = server(r#"{"id": "a1", "name": "demo01", "status": "BUILD", "addresses": ""}"#);
        assert_eq!(s.interface_ip(), None);
    }

    #[test]
    fn test_error_status() {
        let s = server(
            r#"{"id": "a1", "name": "demo01", "status": "ERROR",
                "fault": {"code": 500, "message": "No valid host was found."}}"#,
        );
        assert!(s.is_error());
        assert_eq!(s.fault_message(), "No valid host was found.");
    }
}
