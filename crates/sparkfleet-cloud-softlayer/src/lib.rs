//! SoftLayer provider for SparkFleet
//!
//! This crate implements the NodeProvider trait for SoftLayer (IBM Cloud
//! classic infrastructure).
//!
//! # Requirements
//!
//! - `ansible-playbook` with the SoftLayer launch/destroy playbooks
//! - `slcli` installed and configured (`slcli setup`)
//!
//! # Example
//!
//! ```ignore
//! use sparkfleet_cloud::{NodeProvider, NodeRequest};
//! use sparkfleet_cloud_softlayer::SoftLayerProvider;
//!
//! let provider = SoftLayerProvider::new("dal10", "/usr/share/sparkfleet/playbooks");
//! let address = provider.create(&NodeRequest::new("demo01")).await?;
//! ```

pub mod error;
pub mod provider;
pub mod slcli;

pub use error::{Result, SoftLayerError};
pub use provider::{DATACENTERS, DEFAULT_DATACENTER, SoftLayerProvider, VALID_MEMORY_MB};
pub use slcli::{Slcli, VirtualServerInfo};
