mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sparkfleet")]
#[command(about = "Deploy and collapse Spark standalone clusters", long_about = None)]
struct Cli {
    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which cluster to act on
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Config file (default: sparkfleet.yaml, then ~/.config/sparkfleet/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cluster name, overrides cluster.name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Node count including the leader, overrides cluster.nodes
    #[arg(long)]
    pub nodes: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the cluster and install Spark on it
    Deploy {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Rerun the install stages on a deployed cluster
    Configure {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Destroy every node of the cluster
    Collapse {
        #[command(flatten)]
        target: TargetArgs,
        /// Actually destroy; without this only the plan is printed
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the inventory of a deployed cluster
    Inventory {
        /// Config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Cluster name; no config file is needed when given
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr; stdout is for results
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Deploy { target } => commands::deploy::handle(&target).await,
        Commands::Configure { target } => commands::configure::handle(&target).await,
        Commands::Collapse { target, yes } => commands::collapse::handle(&target, yes).await,
        Commands::Inventory { config, name } => {
            commands::inventory::handle(config.as_deref(), name.as_deref())
        }
        Commands::Version => {
            println!("sparkfleet {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
