//! SparkFleet cluster lifecycle
//!
//! Provisions a Spark standalone cluster (one leader, N-1 followers) through
//! a [`NodeProvider`](sparkfleet_cloud::NodeProvider), waits for the nodes to
//! accept SSH, writes an Ansible inventory and runs the configuration
//! playbooks against it. `collapse` tears the cluster down again.
//!
//! # Example
//!
//! ```ignore
//! use sparkfleet_core::{ClusterOrchestrator, ClusterSpec, StagePlan};
//!
//! let spec = ClusterSpec::new("demo", 3);
//! let stages = StagePlan::spark("playbooks", "spark-cluster-install", &spec.domain);
//! let mut cluster = ClusterOrchestrator::new(spec, provider, runner, stages)?;
//!
//! cluster.deploy().await?;
//! println!("{}", cluster.inventory().unwrap().leader().address);
//! cluster.collapse().await?;
//! ```

pub mod error;
pub mod inventory;
pub mod node;
pub mod orchestrator;
pub mod readiness;
pub mod report;
pub mod spec;
pub mod stage;

pub use error::{ClusterError, DestroyError, Result};
pub use inventory::{Inventory, InventoryBuilder, InventoryError};
pub use node::{LEADER_ORDINAL, NodeRecord, NodeRole, hostname_for};
pub use orchestrator::{ClusterOrchestrator, DeployOutcome, DeploymentState};
pub use readiness::{ControlChannel, ReadinessPolicy, ReadinessProber, SshCommandChannel};
pub use report::TeardownReport;
pub use spec::{ClusterSpec, DEFAULT_DOMAIN, DEFAULT_REGION};
pub use stage::{PipelineStage, StageKind, StagePlan};
