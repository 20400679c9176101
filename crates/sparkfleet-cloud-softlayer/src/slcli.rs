//! slcli wrapper
//!
//! Wraps the SoftLayer CLI for virtual server lookups.

use crate::error::{Result, SoftLayerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// slcli wrapper
#[derive(Debug, Clone)]
pub struct Slcli {
    program: PathBuf,
}

impl Slcli {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("slcli"),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run an slcli command with JSON output and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--format").arg("json");
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: slcli --format json {}", args.join(" "));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SoftLayerError::SlcliNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SoftLayerError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// List virtual servers with the given hostname
    pub async fn list_by_hostname(&self, hostname: &str) -> Result<Vec<VirtualServerInfo>> {
        let output = self
            .run_command(&["vs", "list", "--hostname", hostname])
            .await?;
        parse_server_list(&output)
    }

    /// First virtual server with the given hostname
    pub async fn get_server(&self, hostname: &str) -> Result<VirtualServerInfo> {
        self.list_by_hostname(hostname)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SoftLayerError::ServerNotFound(hostname.to_string()))
    }
}

impl Default for Slcli {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_server_list(output: &str) -> Result<Vec<VirtualServerInfo>> {
    if output.trim().is_empty() || output.trim() == "[]" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(output)?)
}

/// Virtual server row from `slcli vs list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualServerInfo {
    pub id: serde_json::Value,

    pub hostname: String,

    #[serde(default)]
    pub primary_ip: Option<String>,

    #[serde(default)]
    pub backend_ip: Option<String>,

    #[serde(default)]
    pub datacenter: Option<String>,

    /// Pending transaction, if any
    #[serde(default)]
    pub action: Option<String>,
}

impl VirtualServerInfo {
    /// ID as string (slcli reports it as a number)
    pub fn id_str(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Public address, ignoring slcli's "-" placeholder
    pub fn primary_ip(&self) -> Option<&str> {
        self.primary_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty() && *ip != "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_list() {
        let json = r#"[
            {"id": 71234567, "hostname": "demo01", "primary_ip": "169.45.1.10",
             "backend_ip": "10.120.4.3", "datacenter": "dal10", "action": null}
        ]"#;

        let servers = parse_server_list(json).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].id_str(), "71234567");
        assert_eq!(servers[0].primary_ip(), Some("169.45.1.10"));
    }

    #[test]
    fn test_placeholder_ip() {
        let json = r#"[{"id": 1, "hostname": "demo02", "primary_ip": "-"}]"#;
        let servers = parse_server_list(json).unwrap();
        assert_eq!(servers[0].primary_ip(), None);
    }

    #[test]
    fn test_empty_list() {
        assert!(parse_server_list("").unwrap().is_empty());
        assert!(parse_server_list("[]\n").unwrap().is_empty());
    }
}
