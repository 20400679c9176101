//! Configuration pipeline stages

use serde::{Deserialize, Serialize};
use sparkfleet_playbook::{ExtraVars, PipelineInvocation};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PREPARE_PLAYBOOK: &str = "sl_prepare_node.yml";
pub const SETUP_PLAYBOOK: &str = "setup-spark-standalone.yml";
pub const START_PLAYBOOK: &str = "start_spark.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Base OS preparation
    Prepare,
    /// Spark installation
    Setup,
    /// Spark daemon start
    Start,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Prepare => write!(f, "prepare"),
            StageKind::Setup => write!(f, "setup"),
            StageKind::Start => write!(f, "start"),
        }
    }
}

/// One playbook run against the cluster inventory
#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub kind: StageKind,
    pub playbook: PathBuf,
    pub extra_vars: ExtraVars,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl PipelineStage {
    pub fn new(kind: StageKind, playbook: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            playbook: playbook.into(),
            extra_vars: ExtraVars::new(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn with_extra_vars(mut self, vars: ExtraVars) -> Self {
        self.extra_vars = vars;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn invocation(&self, inventory: &Path) -> PipelineInvocation {
        let mut invocation = PipelineInvocation::new(&self.playbook)
            .with_inventory(inventory)
            .with_extra_vars(self.extra_vars.clone());
        if let Some(dir) = &self.working_dir {
            invocation = invocation.with_working_dir(dir);
        }
        if let Some(timeout) = self.timeout {
            invocation = invocation.with_timeout(timeout);
        }
        invocation
    }
}

/// Ordered list of stages run after provisioning
#[derive(Debug, Clone, Default)]
pub struct StagePlan {
    stages: Vec<PipelineStage>,
}

impl StagePlan {
    pub fn new(stages: Vec<PipelineStage>) -> Self {
        Self { stages }
    }

    /// Standard Spark standalone pipeline: prepare, setup, start
    ///
    /// The setup playbook lives in, and must run from, `spark_install_dir`.
    pub fn spark(
        playbook_dir: impl AsRef<Path>,
        spark_install_dir: impl AsRef<Path>,
        domain: &str,
    ) -> Self {
        let playbook_dir = playbook_dir.as_ref();
        let spark_install_dir = spark_install_dir.as_ref();

        Self::new(vec![
            PipelineStage::new(StageKind::Prepare, playbook_dir.join(PREPARE_PLAYBOOK)),
            PipelineStage::new(StageKind::Setup, spark_install_dir.join(SETUP_PLAYBOOK))
                .with_working_dir(spark_install_dir),
            PipelineStage::new(StageKind::Start, playbook_dir.join(START_PLAYBOOK))
                .with_extra_vars(ExtraVars::new().with("domain", domain)),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineStage> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
