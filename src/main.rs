// ABOUTME: CLI entry point for mongo-sample-migrator
// ABOUTME: Parses arguments, sets up logging, and routes to the migrate command

use clap::{Parser, Subcommand};
use mongo_sample_migrator::config::{MigrationOverrides, MigrationRequest};
use mongo_sample_migrator::{commands, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mongo-sample-migrator")]
#[command(about = "Copy a sampled share of a MongoDB database, collection by collection", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory for the append-only log file (default: ~/.mongo-sample-migrator/logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate MongoDB data from a source into a target database (local by default)
    ///
    /// Examples:
    ///   mongo-sample-migrator migrate "<CLOUD_URI>" mydb --percentage 50
    ///   mongo-sample-migrator migrate "<CLOUD_URI>" mydb --batch-size 2000 --target "<URI>"
    Migrate {
        /// Source MongoDB connection string
        source: Option<String>,
        /// Database to migrate
        database: Option<String>,
        /// Target MongoDB connection string [default: mongodb://localhost:27017/]
        #[arg(long)]
        target: Option<String>,
        /// Percentage of each collection to migrate (1-100) [default: 100]
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        percentage: Option<u8>,
        /// Documents per read/insert batch [default: 1000]
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// TOML file with defaults for any of the options above
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.or_else(logging::default_log_dir);
    let guard = match logging::init(log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to open log file, logging to console only: {:#}", e);
            logging::init(None)?
        }
    };

    match cli.command {
        Commands::Migrate {
            source,
            database,
            target,
            percentage,
            batch_size,
            config,
        } => {
            let file = config.map(MigrationOverrides::load).transpose()?;
            let flags = MigrationOverrides {
                source,
                target,
                database,
                percentage,
                batch_size,
            };
            let request = match MigrationRequest::resolve(flags, file) {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!("{}", e);
                    drop(guard);
                    std::process::exit(1);
                }
            };

            // Run-fatal errors are already logged where they occur.
            let Ok(summary) = commands::migrate(&request).await else {
                drop(guard);
                std::process::exit(1);
            };
            if summary.cancelled {
                tracing::warn!(
                    "Migration stopped before completion ({}/{} collections)",
                    summary.processed(),
                    summary.collections_total
                );
            } else {
                tracing::info!("Migration completed successfully.");
            }
            Ok(())
        }
    }
}
