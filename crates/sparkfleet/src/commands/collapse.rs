use crate::TargetArgs;
use crate::utils;
use colored::Colorize;
use sparkfleet_core::ClusterError;

pub async fn handle(target: &TargetArgs, yes: bool) -> anyhow::Result<()> {
    let (path, config) = utils::load_target(target)?;
    utils::print_target(&path, &config);

    let spec = utils::build_spec(&config);
    println!();
    println!("{}", "Nodes to destroy:".bold());
    for ordinal in spec.ordinals() {
        println!("  • {} ({})", spec.hostname(ordinal).cyan(), spec.role(ordinal));
    }

    if !yes {
        println!();
        println!("{}", "Nothing destroyed. Re-run with --yes to collapse the cluster.".yellow());
        return Ok(());
    }

    let mut cluster = utils::build_orchestrator(&config)?;
    println!();
    println!("{}", "Collapsing cluster...".yellow());

    match cluster.collapse().await {
        Ok(report) => {
            for hostname in &report.destroyed {
                println!("  {} {}", "✓".green(), hostname);
            }
            println!();
            println!(
                "{}",
                format!(
                    "✓ Destroyed {} node(s) in {:.1}s",
                    report.destroyed.len(),
                    report.duration_ms as f64 / 1000.0
                )
                .green()
                .bold()
            );
            Ok(())
        }
        Err(ClusterError::TeardownIncomplete(report)) => {
            for hostname in &report.destroyed {
                println!("  {} {}", "✓".green(), hostname);
            }
            for failure in &report.failed {
                eprintln!("  {} {}", "✗".red().bold(), failure);
            }
            anyhow::bail!(
                "{} of {} node(s) could not be destroyed",
                report.failed.len(),
                report.total()
            )
        }
        Err(e) => Err(e.into()),
    }
}
