//! Test doubles for orchestrator scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use sparkfleet_cloud::{CloudError, NodeHandle, NodeProvider, NodeRequest};
use sparkfleet_core::ControlChannel;
use sparkfleet_playbook::{
    FailureClassifier, PipelineInvocation, PlaybookError, PlaybookOutput, PlaybookRunner,
};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

/// `<name>NN` → NN
pub fn ordinal_of(hostname: &str) -> u32 {
    let digits: String = hostname
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().unwrap()
}

pub fn address_of(ordinal: u32) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, (ordinal / 256) as u8, (ordinal % 256) as u8))
}

/// In-memory provider
///
/// Later ordinals answer faster, so completion order is the reverse of
/// submission order.
#[derive(Default)]
pub struct MockProvider {
    pub remote_user: Option<String>,
    pub fail_create: HashSet<String>,
    pub refuse_create: HashSet<String>,
    pub fail_destroy: HashSet<String>,
    pub barrier: Option<Barrier>,
    pub created: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remote_user(mut self, user: &str) -> Self {
        self.remote_user = Some(user.to_string());
        self
    }

    pub fn failing_create(mut self, hostname: &str) -> Self {
        self.fail_create.insert(hostname.to_string());
        self
    }

    pub fn refusing_create(mut self, hostname: &str) -> Self {
        self.refuse_create.insert(hostname.to_string());
        self
    }

    pub fn failing_destroy(mut self, hostname: &str) -> Self {
        self.fail_destroy.insert(hostname.to_string());
        self
    }

    /// Every create call blocks until `nodes` calls are in flight
    pub fn with_barrier(mut self, nodes: usize) -> Self {
        self.barrier = Some(Barrier::new(nodes));
        self
    }

    pub fn created(&self) -> Vec<String> {
        let mut created = self.created.lock().unwrap().clone();
        created.sort();
        created
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn display_name(&self) -> &str {
        "Mock"
    }

    fn remote_user(&self) -> Option<&str> {
        self.remote_user.as_deref()
    }

    async fn create_node(&self, request: &NodeRequest) -> sparkfleet_cloud::Result<NodeHandle> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        let ordinal = ordinal_of(&request.hostname);
        tokio::time::sleep(Duration::from_millis(u64::from(40 - ordinal.min(40)))).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.created.lock().unwrap().push(request.hostname.clone());

        if self.fail_create.contains(&request.hostname) {
            return Err(CloudError::CreationFailed(request.hostname.clone()));
        }
        if self.refuse_create.contains(&request.hostname) {
            return Err(CloudError::InstanceCreateFailed(request.hostname.clone()));
        }
        Ok(NodeHandle::new(format!("id-{}", ordinal), &request.hostname))
    }

    async fn resolve_address(&self, node: &NodeHandle) -> sparkfleet_cloud::Result<IpAddr> {
        Ok(address_of(ordinal_of(&node.hostname)))
    }

    async fn destroy_node(&self, hostname: &str) -> sparkfleet_cloud::Result<()> {
        self.destroyed.lock().unwrap().push(hostname.to_string());
        if self.fail_destroy.contains(hostname) {
            return Err(CloudError::DeletionFailed(hostname.to_string()));
        }
        Ok(())
    }
}

/// One recorded playbook run
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub playbook: String,
    pub inventory: Option<PathBuf>,
    /// Inventory file contents at the time of the run
    pub inventory_text: Option<String>,
    pub extra_vars: String,
    pub working_dir: Option<PathBuf>,
}

/// Records invocations; fails the playbook whose file name is in `fail_on`
#[derive(Default)]
pub struct MockRunner {
    pub fail_on: Mutex<Option<(String, String)>>,
    pub runs: Mutex<Vec<RecordedRun>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `playbook` with `stdout` as the captured output
    pub fn fail(&self, playbook: &str, stdout: &str) {
        *self.fail_on.lock().unwrap() = Some((playbook.to_string(), stdout.to_string()));
    }

    pub fn recover(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn playbooks(&self) -> Vec<String> {
        self.runs().into_iter().map(|r| r.playbook).collect()
    }
}

#[async_trait]
impl PlaybookRunner for MockRunner {
    async fn run(
        &self,
        invocation: &PipelineInvocation,
    ) -> sparkfleet_playbook::Result<PlaybookOutput> {
        let playbook = invocation
            .playbook
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        let inventory_text = invocation
            .inventory
            .as_ref()
            .and_then(|p| std::fs::read_to_string(p).ok());

        self.runs.lock().unwrap().push(RecordedRun {
            playbook: playbook.clone(),
            inventory: invocation.inventory.clone(),
            inventory_text,
            extra_vars: invocation.extra_vars.to_arg(),
            working_dir: invocation.working_dir.clone(),
        });

        let failure = self.fail_on.lock().unwrap().clone();
        match failure {
            Some((failing, stdout)) if failing == playbook => {
                let output = PlaybookOutput {
                    exit_code: Some(2),
                    stdout,
                    stderr: String::new(),
                };
                Err::<PlaybookOutput, PlaybookError>(
                    FailureClassifier::default().to_error(playbook, output),
                )
            }
            _ => Ok(PlaybookOutput {
                exit_code: Some(0),
                stdout: "ok".to_string(),
                stderr: String::new(),
            }),
        }
    }
}

/// Control channel that either always answers or never does
pub struct MockChannel {
    pub reachable: bool,
    pub probes: AtomicUsize,
}

impl MockChannel {
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlChannel for MockChannel {
    async fn probe(&self, _address: IpAddr, _user: &str) -> std::io::Result<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.reachable {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        }
    }
}
