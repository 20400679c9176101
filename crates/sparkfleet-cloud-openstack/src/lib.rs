//! OpenStack provider for SparkFleet
//!
//! This crate implements the NodeProvider trait for OpenStack clouds,
//! driving the `openstack` CLI.
//!
//! # Requirements
//!
//! - `openstack` CLI (python-openstackclient) installed
//! - Credentials in `clouds.yaml` (select with `with_cloud`) or `OS_*`
//!   environment variables
//!
//! # Example
//!
//! ```ignore
//! use sparkfleet_cloud::{NodeProvider, NodeRequest};
//! use sparkfleet_cloud_openstack::OpenStackProvider;
//!
//! let provider = OpenStackProvider::new("m1.large", "centos-7")
//!     .with_cloud(Some("mycloud".to_string()))
//!     .with_key_name(Some("spark-key".to_string()));
//! let address = provider.create(&NodeRequest::new("demo01")).await?;
//! ```

pub mod cli;
pub mod error;
pub mod provider;

pub use cli::{CreateServerConfig, OpenStackCli, ServerInfo};
pub use error::{OpenStackError, Result};
pub use provider::{DEFAULT_REMOTE_USER, OpenStackProvider};
