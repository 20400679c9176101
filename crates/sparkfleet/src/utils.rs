use crate::TargetArgs;
use colored::Colorize;
use sparkfleet_cloud::{NodeProvider, NodeSizing};
use sparkfleet_cloud_openstack::OpenStackProvider;
use sparkfleet_cloud_softlayer::SoftLayerProvider;
use sparkfleet_config::{ClusterConfig, ProviderConfig};
use sparkfleet_core::{ClusterOrchestrator, ClusterSpec, StagePlan};
use sparkfleet_playbook::{AnsiblePlaybook, PlaybookRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load the config and apply command-line overrides
pub fn load_target(target: &TargetArgs) -> anyhow::Result<(PathBuf, ClusterConfig)> {
    let (path, mut config) = sparkfleet_config::load(target.config.as_deref())?;

    if let Some(name) = &target.name {
        config.cluster.name = name.clone();
    }
    if let Some(nodes) = target.nodes {
        config.cluster.nodes = nodes;
    }
    config.validate()?;

    Ok((path, config))
}

pub fn build_spec(config: &ClusterConfig) -> ClusterSpec {
    let cluster = &config.cluster;
    let mut spec = ClusterSpec::new(&cluster.name, cluster.nodes)
        .with_sizing(NodeSizing {
            cpus: cluster.cpus,
            memory_mb: cluster.memory,
            disk_gb: cluster.disk_size,
        })
        .with_region(config.placement())
        .with_domain(&cluster.domain)
        .with_ssh_keys(cluster.ssh_keys.clone());
    for (key, value) in &cluster.extra_vars {
        spec = spec.with_extra_var(key, value);
    }
    spec
}

/// Provider for the configured cloud, placed in `spec.region`
///
/// SoftLayer gets the cluster-wide variables of `spec` since its destroy
/// playbook needs the same sizing and keys as the launch.
pub fn build_provider(
    config: &ClusterConfig,
    spec: &ClusterSpec,
    runner: Arc<dyn PlaybookRunner>,
) -> Arc<dyn NodeProvider> {
    match &config.provider {
        ProviderConfig::Softlayer { .. } => Arc::new(
            SoftLayerProvider::new(&spec.region, &config.playbooks.dir)
                .with_runner(runner)
                .with_vars(spec.base_vars()),
        ),
        ProviderConfig::Openstack {
            flavor,
            image,
            ssh_key,
            cloud,
            remote_user,
            ..
        } => Arc::new(
            OpenStackProvider::new(flavor, image)
                .with_cloud(cloud.clone())
                .with_key_name(ssh_key.clone())
                .with_availability_zone(Some(spec.region.clone()))
                .with_remote_user(remote_user),
        ),
    }
}

pub fn build_orchestrator(config: &ClusterConfig) -> anyhow::Result<ClusterOrchestrator> {
    let spec = build_spec(config);
    let runner: Arc<dyn PlaybookRunner> = Arc::new(AnsiblePlaybook::new());
    let provider = build_provider(config, &spec, runner.clone());
    let stages = StagePlan::spark(
        &config.playbooks.dir,
        &config.playbooks.spark_install_dir,
        config.start_domain(),
    );

    Ok(ClusterOrchestrator::new(spec, provider, runner, stages)?)
}

pub fn print_target(path: &Path, config: &ClusterConfig) {
    println!("Config: {}", path.display().to_string().cyan());
    println!(
        "Cluster: {} ({} node(s) on {})",
        config.cluster.name.cyan(),
        config.cluster.nodes,
        config.provider.name()
    );
}
