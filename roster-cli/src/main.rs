//! Roster CLI - Command line interface for reviewer assignment
//!
//! Manages teams, users and pull requests against the local SQLite store,
//! or runs the HTTP server.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Context, PrArgs, ServeArgs, TeamArgs, UserArgs};

/// Roster: reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Fixed seed for reviewer selection (overrides config and env)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Manage teams
    #[command(visible_alias = "t")]
    Team(TeamArgs),

    /// Manage users and their activity
    #[command(visible_alias = "u")]
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show assignment statistics
    Stats,

    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(CliOverrides {
        db_path: cli.db_path.clone(),
        seed: cli.seed,
    })?;

    if cli.verbose {
        tracing::info!(
            db_path = %config.database.path.display(),
            seed = ?config.assignment.seed,
            "Configuration loaded"
        );
    }

    let ctx = Context {
        config,
        json: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Version) => {
            println!("roster {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Team(args)) => args.execute(&ctx).await?,
        Some(Commands::User(args)) => args.execute(&ctx).await?,
        Some(Commands::Pr(args)) => args.execute(&ctx).await?,
        Some(Commands::Stats) => commands::stats::execute(&ctx).await?,
        Some(Commands::Serve(args)) => args.execute(&ctx).await?,
        Some(Commands::Config) => {
            println!("Roster Configuration");
            println!("====================");
            println!();
            print!("{}", toml::to_string_pretty(&ctx.config)?);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Roster - reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
