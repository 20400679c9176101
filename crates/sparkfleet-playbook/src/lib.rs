//! SparkFleet playbook runner
//!
//! Runs Ansible playbooks as isolated `ansible-playbook` subprocesses,
//! passing an inventory and structured extra variables, and classifies
//! failed runs.
//!
//! # Example
//!
//! ```ignore
//! use sparkfleet_playbook::{AnsiblePlaybook, PipelineInvocation, PlaybookRunner};
//!
//! let runner = AnsiblePlaybook::new();
//! let invocation = PipelineInvocation::new("playbooks/start_spark.yml")
//!     .with_inventory("/tmp/spark_inv_demo.ini")
//!     .with_var("domain", "spark.test");
//!
//! runner.run(&invocation).await?;
//! ```

pub mod classify;
pub mod error;
pub mod invocation;
pub mod runner;
pub mod vars;

pub use classify::{FailureClassifier, FailureKind, PlaybookOutput};
pub use error::{PlaybookError, Result};
pub use invocation::PipelineInvocation;
pub use runner::{AnsiblePlaybook, PlaybookRunner};
pub use vars::{ExtraVars, VarValue};
