// SPV ledger API server and database CLI entry point

use clap::{Parser, Subcommand};
use std::error::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spv_ledger_api::commands;
use spv_ledger_api::config::ApiConfig;

/// SPV token allocation ledger
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to execute (serve if omitted)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Run database migrations
    Migrate {
        /// Number of migrations to run (all if not specified)
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Show applied and pending migrations
    Status,
}

fn load_env() {
    dotenv::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    load_env();
    // Configure logging with tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ApiConfig::from_env();
    tracing::info!("Configuration loaded");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::execute(&config).await?,
        Commands::Migrate { steps } => commands::migrate::execute(&config, steps).await?,
        Commands::Status => commands::migrate::status(&config).await?,
    }

    Ok(())
}
