use crate::TargetArgs;
use crate::utils;
use colored::Colorize;
use sparkfleet_core::DeployOutcome;

pub async fn handle(target: &TargetArgs) -> anyhow::Result<()> {
    let (path, config) = utils::load_target(target)?;
    utils::print_target(&path, &config);

    let mut cluster = utils::build_orchestrator(&config)?;

    println!();
    println!("{}", "Deploying cluster...".yellow());
    match cluster.deploy().await {
        Ok(DeployOutcome::AlreadyDeployed) => {
            println!("{}", "Cluster is already deployed".yellow());
        }
        Ok(DeployOutcome::Deployed) => {
            println!();
            println!("{}", "✓ Cluster deployed".green().bold());
            if let Some(inventory) = cluster.inventory() {
                println!(
                    "  Leader:    {} ({})",
                    inventory.leader().hostname.cyan(),
                    inventory.leader().address
                );
                println!("  Followers: {}", inventory.followers().len());
            }
            println!(
                "  Inventory: {}",
                cluster.inventory_path().display().to_string().cyan()
            );
        }
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "✗ Deploy failed:".red().bold(), e);
            if e.is_instance_create_failure() {
                eprintln!(
                    "  {}",
                    "The provider could not create an instance (capacity, quota or image).".yellow()
                );
            }
            if cluster.is_deployed() {
                eprintln!(
                    "  Nodes are up; rerun the install stages with {}",
                    format!("sparkfleet configure --name {}", config.cluster.name).cyan()
                );
            }
            eprintln!(
                "  Nodes that were created are left running; remove them with {}",
                format!("sparkfleet collapse --name {} --yes", config.cluster.name).cyan()
            );
            return Err(e.into());
        }
    }

    Ok(())
}
