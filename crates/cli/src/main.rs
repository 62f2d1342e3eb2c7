//! Brew & Bite CLI - Main Entry Point
//!
//! Runs the landing page acceptance checks and inspects the catalog and the
//! effective configuration.
//!
//! Exit codes: 0 when every check passed, 1 when any check failed, 2 when
//! the suite could not run at all.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config, list, run};

/// Brew & Bite Café landing page acceptance checks
#[derive(Parser)]
#[command(name = "brewbite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Suite configuration file
    #[arg(short, long, default_value = "brewbite.yaml", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the acceptance checks against the landing page
    Run(run::RunArgs),

    /// List the checks in execution order
    List,

    /// Inspect or create the suite configuration
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON/YAML output stays parseable
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            2
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Run(args) => run::execute(args, &cli.config, cli.format).await,
        Commands::List => {
            list::execute(cli.format);
            Ok(0)
        }
        Commands::Config(cmd) => {
            config::execute(cmd, &cli.config, cli.format)?;
            Ok(0)
        }
    }
}
