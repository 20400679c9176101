use crate::TargetArgs;
use crate::utils;
use colored::Colorize;

/// Rerun the stage plan on a cluster deployed earlier
pub async fn handle(target: &TargetArgs) -> anyhow::Result<()> {
    let (path, config) = utils::load_target(target)?;
    utils::print_target(&path, &config);

    let mut cluster = utils::build_orchestrator(&config)?;
    if let Err(e) = cluster.resume().await {
        eprintln!(
            "{} no inventory at {}; run {} first",
            "✗".red().bold(),
            cluster.inventory_path().display(),
            "sparkfleet deploy".cyan()
        );
        return Err(e.into());
    }

    println!();
    println!("{}", "Configuring cluster...".yellow());
    if let Err(e) = cluster.configure().await {
        eprintln!();
        eprintln!("{} {}", "✗ Configure failed:".red().bold(), e);
        return Err(e.into());
    }

    println!();
    println!("{}", "✓ Cluster configured".green().bold());
    println!(
        "  Inventory: {}",
        cluster.inventory_path().display().to_string().cyan()
    );
    Ok(())
}
