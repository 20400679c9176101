//! Cluster lifecycle: deploy and collapse

use crate::error::{ClusterError, DestroyError, Result};
use crate::inventory::{Inventory, InventoryBuilder};
use crate::node::NodeRecord;
use crate::readiness::ReadinessProber;
use crate::report::TeardownReport;
use crate::spec::ClusterSpec;
use crate::stage::StagePlan;
use sparkfleet_cloud::NodeProvider;
use sparkfleet_playbook::PlaybookRunner;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    NotDeployed,
    Deploying,
    Deployed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed,
    /// The cluster was already deployed; nothing was done
    AlreadyDeployed,
}

/// Drives one cluster through provisioning, configuration and teardown
pub struct ClusterOrchestrator {
    spec: Arc<ClusterSpec>,
    provider: Arc<dyn NodeProvider>,
    runner: Arc<dyn PlaybookRunner>,
    prober: Arc<ReadinessProber>,
    stages: StagePlan,
    inventory_path: PathBuf,
    state: DeploymentState,
    inventory: Option<Inventory>,
}

impl ClusterOrchestrator {
    pub fn new(
        spec: ClusterSpec,
        provider: Arc<dyn NodeProvider>,
        runner: Arc<dyn PlaybookRunner>,
        stages: StagePlan,
    ) -> Result<Self> {
        spec.validate()?;
        let inventory_path = Inventory::default_path(&spec.name);

        Ok(Self {
            spec: Arc::new(spec),
            provider,
            runner,
            prober: Arc::new(ReadinessProber::default()),
            stages,
            inventory_path,
            state: DeploymentState::NotDeployed,
            inventory: None,
        })
    }

    pub fn with_prober(mut self, prober: ReadinessProber) -> Self {
        self.prober = Arc::new(prober);
        self
    }

    pub fn with_inventory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inventory_path = path.into();
        self
    }

    pub fn spec(&self) -> &ClusterSpec {
        &self.spec
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    pub fn is_deployed(&self) -> bool {
        self.state == DeploymentState::Deployed
    }

    /// Inventory of the deployed cluster
    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn inventory_path(&self) -> &Path {
        &self.inventory_path
    }

    /// Provision every node, persist the inventory and run the stage plan
    ///
    /// On a provisioning failure the nodes that did come up are left
    /// running; call [`collapse`](Self::collapse) to remove them.
    pub async fn deploy(&mut self) -> Result<DeployOutcome> {
        if self.is_deployed() {
            tracing::info!("Cluster {} is already deployed", self.spec.name);
            return Ok(DeployOutcome::AlreadyDeployed);
        }

        tracing::info!(
            "Deploying cluster {} ({} node(s)) on {}",
            self.spec.name,
            self.spec.node_count,
            self.provider.display_name()
        );
        self.state = DeploymentState::Deploying;

        let inventory = match self.provision().await {
            Ok(inventory) => inventory,
            Err(e) => {
                self.state = DeploymentState::NotDeployed;
                return Err(e);
            }
        };
        if let Err(e) = inventory.write_to(&self.inventory_path).await {
            self.state = DeploymentState::NotDeployed;
            return Err(e.into());
        }
        tracing::info!("Inventory written to {}", self.inventory_path.display());

        self.inventory = Some(inventory);
        self.state = DeploymentState::Deployed;

        self.configure().await?;
        tracing::info!("Cluster {} deployed", self.spec.name);
        Ok(DeployOutcome::Deployed)
    }

    /// Pick up a cluster deployed by an earlier run from its inventory file
    ///
    /// Only the file's presence is checked; [`inventory`](Self::inventory)
    /// stays empty since the file is handed to the stages as is.
    pub async fn resume(&mut self) -> Result<()> {
        if self.is_deployed() {
            return Ok(());
        }
        if !tokio::fs::try_exists(&self.inventory_path).await? {
            return Err(ClusterError::NotDeployed(self.spec.name.clone()));
        }

        tracing::info!(
            "Resuming cluster {} from {}",
            self.spec.name,
            self.inventory_path.display()
        );
        self.state = DeploymentState::Deployed;
        Ok(())
    }

    /// Run the stage plan against the persisted inventory
    ///
    /// Stages run strictly in order; the first failure stops the plan.
    pub async fn configure(&self) -> Result<()> {
        if !self.is_deployed() {
            return Err(ClusterError::NotDeployed(self.spec.name.clone()));
        }

        for stage in self.stages.iter() {
            tracing::info!("Running {} stage ({})", stage.kind, stage.playbook.display());
            let invocation = stage.invocation(&self.inventory_path);
            let output = self
                .runner
                .run(&invocation)
                .await
                .map_err(|source| ClusterError::Stage {
                    stage: stage.kind,
                    source,
                })?;
            tracing::debug!("{} stage output:\n{}", stage.kind, output.stdout);
        }
        Ok(())
    }

    /// Destroy every node of the cluster, continuing past failures
    pub async fn collapse(&mut self) -> Result<TeardownReport> {
        let start = Instant::now();
        let mut report = TeardownReport::new();

        tracing::info!("Collapsing cluster {}", self.spec.name);
        for ordinal in self.spec.ordinals() {
            let hostname = self.spec.hostname(ordinal);
            match self.provider.destroy_node(&hostname).await {
                Ok(()) => {
                    tracing::info!("Destroyed {}", hostname);
                    report.add_destroyed(hostname);
                }
                Err(source) => {
                    tracing::error!("Failed to destroy {}: {}", hostname, source);
                    report.add_failure(DestroyError { hostname, source });
                }
            }
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        if !report.is_success() {
            return Err(ClusterError::TeardownIncomplete(report));
        }
        self.state = DeploymentState::NotDeployed;
        self.inventory = None;
        Ok(report)
    }

    /// Create every node concurrently and collect them into an inventory
    async fn provision(&self) -> Result<Inventory> {
        let remote_user = self.provider.remote_user().map(str::to_string);
        let (tx, mut rx) = mpsc::unbounded_channel::<NodeRecord>();

        let writer = tokio::spawn(async move {
            let mut builder = InventoryBuilder::new(remote_user);
            while let Some(node) = rx.recv().await {
                builder.record(node);
            }
            builder
        });

        let mut tasks = JoinSet::new();
        for ordinal in self.spec.ordinals() {
            tasks.spawn(provision_node(
                self.spec.clone(),
                self.provider.clone(),
                self.prober.clone(),
                ordinal,
                tx.clone(),
            ));
        }
        drop(tx);

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|e| ClusterError::TaskFailed(e.to_string()))
                .and_then(|r| r);
            if let Err(e) = result {
                tracing::error!("{}", e);
                first_error.get_or_insert(e);
            }
        }

        let builder = writer
            .await
            .map_err(|e| ClusterError::TaskFailed(e.to_string()))?;
        if let Some(e) = first_error {
            return Err(e);
        }
        Ok(builder.finish()?)
    }
}

async fn provision_node(
    spec: Arc<ClusterSpec>,
    provider: Arc<dyn NodeProvider>,
    prober: Arc<ReadinessProber>,
    ordinal: u32,
    tx: mpsc::UnboundedSender<NodeRecord>,
) -> Result<()> {
    let request = spec.node_request(ordinal);
    let role = spec.role(ordinal);
    tracing::info!("Creating {} {}", role, request.hostname);

    let address = provider
        .create(&request)
        .await
        .map_err(|source| ClusterError::Provision {
            hostname: request.hostname.clone(),
            source,
        })?;
    tracing::info!("{} is at {}", request.hostname, address);

    if let Some(user) = provider.remote_user() {
        prober.wait_ready(&request.hostname, address, user).await?;
    }

    let node = NodeRecord::new(request.hostname, role, address, ordinal);
    tx.send(node).map_err(|e| {
        ClusterError::TaskFailed(format!(
            "inventory writer stopped before {} was recorded",
            e.0.hostname
        ))
    })
}

impl std::fmt::Debug for ClusterOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterOrchestrator")
            .field("cluster", &self.spec.name)
            .field("provider", &self.provider.name())
            .field("state", &self.state)
            .field("inventory_path", &self.inventory_path)
            .finish_non_exhaustive()
    }
}
