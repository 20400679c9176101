//! Teardown results

use crate::error::DestroyError;

/// Result of collapsing a cluster
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Hostnames destroyed successfully
    pub destroyed: Vec<String>,

    /// Nodes that could not be destroyed
    pub failed: Vec<DestroyError>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl TeardownReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_destroyed(&mut self, hostname: impl Into<String>) {
        self.destroyed.push(hostname.into());
    }

    pub fn add_failure(&mut self, error: DestroyError) {
        self.failed.push(error);
    }

    /// Nodes attempted
    pub fn total(&self) -> usize {
        self.destroyed.len() + self.failed.len()
    }

    pub fn failed_hostnames(&self) -> Vec<&str> {
        self.failed.iter().map(|e| e.hostname.as_str()).collect()
    }
}
