//! SparkFleet node provisioning
//!
//! This crate provides the provider abstraction the cluster orchestrator
//! provisions nodes through. Each backend only has to know how to create a
//! node, find its address and destroy it again.
//!
//! # Supported Providers
//!
//! - **SoftLayer**: bare-metal style, via Ansible launch playbooks and `slcli`
//! - **OpenStack**: cloud VMs, via the `openstack` CLI
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 sparkfleet CLI                   │
//! │             (deploy / collapse)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                sparkfleet-core                   │
//! │           ClusterOrchestrator                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               sparkfleet-cloud                   │
//! │        trait NodeProvider { ... }                │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │   softlayer   │ │   openstack   │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod error;
pub mod provider;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{NodeHandle, NodeProvider, NodeRequest, NodeSizing, parse_address};
