//! A single playbook execution request

use crate::vars::{ExtraVars, VarValue};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Playbook execution request, built per call
#[derive(Debug, Clone)]
pub struct PipelineInvocation {
    pub playbook: PathBuf,
    pub inventory: Option<PathBuf>,
    pub extra_vars: ExtraVars,

    /// Run the process from this directory instead of the current one
    pub working_dir: Option<PathBuf>,

    /// Wall-clock limit for the whole process
    pub timeout: Option<Duration>,
}

impl PipelineInvocation {
    pub fn new(playbook: impl Into<PathBuf>) -> Self {
        Self {
            playbook: playbook.into(),
            inventory: None,
            extra_vars: ExtraVars::new(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn with_inventory(mut self, inventory: impl AsRef<Path>) -> Self {
        self.inventory = Some(inventory.as_ref().to_path_buf());
        self
    }

    pub fn with_extra_vars(mut self, vars: ExtraVars) -> Self {
        self.extra_vars = vars;
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.extra_vars.insert(key, value);
        self
    }

    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Display name used in logs and errors
    pub fn playbook_name(&self) -> String {
        self.playbook.display().to_string()
    }
}
