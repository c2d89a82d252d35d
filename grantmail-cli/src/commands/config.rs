//! `grantmail config init` and `grantmail config show`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use grantmail_core::config;

/// Create or inspect the config file.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file with every setting at its default.
    Init(InitArgs),

    /// Print the effective config as YAML.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,

    /// Where to write (default: ~/.grantmail/config.yaml).
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// File to read (default: ~/.grantmail/config.yaml).
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

pub fn run(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Init(args) => init(args),
        ConfigCommand::Show(args) => show(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let path = match args.path {
        Some(path) => {
            config::init_to(&path, args.force)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            path
        }
        None => config::init(args.force).context("failed to write default config")?,
    };
    println!("✓ Wrote {}", path.display());
    println!("  Set `source`, `templates` and `output_dir`, then run `grantmail generate`.");
    Ok(())
}

fn show(args: ShowArgs) -> Result<()> {
    let cfg = match &args.path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("failed to load '{}'", path.display()))?,
        None => config::load().context("failed to load ~/.grantmail/config.yaml")?,
    };
    print!(
        "{}",
        serde_yaml::to_string(&cfg).context("failed to serialize config")?
    );
    Ok(())
}
