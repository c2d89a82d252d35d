//! grantmail: peer-reviewer email generator.
//!
//! # Usage
//!
//! ```text
//! grantmail generate [--config FILE] [--source PATH] [--sheet NAME]
//!                    [--without-nda PATH] [--with-nda PATH] [--output DIR]
//!                    [--operations-manager NAME] [--reflow] [--keep-going] [--dry-run]
//! grantmail records [--config FILE] [--source PATH] [--sheet NAME] [--json]
//! grantmail config init [--force] [--path FILE]
//! grantmail config show [--path FILE]
//! ```
//!
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, generate::GenerateArgs, records::RecordsArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "grantmail",
    version,
    about = "Generate peer-reviewer emails from a tracking sheet and two Word templates",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write one `<Name> - Email.docx` per reviewer row.
    Generate(GenerateArgs),

    /// List the reviewer rows and the template each would use.
    Records(RecordsArgs),

    /// Create or inspect the config file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Records(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
