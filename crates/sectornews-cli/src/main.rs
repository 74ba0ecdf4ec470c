mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sectornews")]
#[command(about = "Sector news collection and aggregation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect new articles, then rebuild the summary tables
    Run,
    /// Fetch every catalog keyword and merge new articles into the date buckets
    Collect {
        /// Restrict collection to one sector
        #[arg(long)]
        sector: Option<String>,

        /// Print the keywords that would be fetched without fetching
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild keyword.csv and sector.csv from the stored date buckets
    Aggregate,
    /// Validate and print the keyword catalog
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = sectornews_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run) => commands::run(&config).await,
        Some(Commands::Collect { sector, dry_run }) => {
            commands::collect(&config, sector.as_deref(), dry_run).await
        }
        Some(Commands::Aggregate) => commands::aggregate(&config),
        Some(Commands::Catalog) => commands::catalog(&config),
        None => {
            println!(
                "sectornews ready ({} environment, catalog {})",
                config.env,
                config.catalog_path.display()
            );
            Ok(())
        }
    }
}
