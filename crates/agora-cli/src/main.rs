//! Agora CLI - Command-line interface for multi-persona debates
//!
//! # Usage
//!
//! ```bash
//! # Debate with the default agents
//! agora run --problem "Should remote work be the default?"
//!
//! # Offline run with knowledge integration
//! agora run --provider mock --use-knowledge --document-dir ./documents
//!
//! # List the built-in personas
//! agora personas --detailed
//!
//! # Show providers and knowledge sources
//! agora info
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod interactive;
mod settings;

use commands::{info, personas, run};

/// Agora - structured debates between AI personas
///
/// Personas share perspectives, critique each other, look for common
/// ground and state final positions; a moderator writes the report.
#[derive(Parser)]
#[command(
    name = "agora",
    version,
    about = "Agora - Multi-Agent Ideation and Debate",
    long_about = "Agora runs phased debates between AI personas.\n\n\
                  Arguments can cite [REF: query] markers that are resolved\n\
                  against local documents, web search and AI generation."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file
    #[arg(long, global = true, default_value = settings::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a debate and save its artifacts
    #[command(name = "run")]
    Run(run::RunArgs),

    /// List the built-in personas
    #[command(name = "personas")]
    Personas(personas::PersonasArgs),

    /// Show system information
    #[command(name = "info")]
    Info(info::InfoArgs),
}

#[tokio::main]
async fn main() {
    // .env first so settings and providers see its variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result: Result<()> = match cli.command {
        Commands::Run(args) => run::run(args, &cli.config).await,
        Commands::Personas(args) => personas::run(args),
        Commands::Info(args) => info::run(args, &cli.config),
    };

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message with an X
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}
