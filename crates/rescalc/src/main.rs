use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use rescalc_core::Config;

mod config;
mod find;
mod interactive;
mod profiling;

#[derive(Parser)]
#[command(name = "rescalc")]
#[command(about = "Find series and parallel resistor combinations close to a target value", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Write a performance profile to the specified path (Chrome tracing JSON format).
    /// View with chrome://tracing or https://ui.perfetto.dev/
    #[arg(long = "profile", global = true, value_name = "PATH", hide = true)]
    profile: Option<PathBuf>,

    /// Configuration file to use instead of the discovered rescalc.toml
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for combinations and print the best matches
    #[command(alias = "f")]
    Find(find::FindArgs),

    /// Prompt for inputs and recalculate until you quit
    #[command(alias = "i")]
    Interactive(interactive::InteractiveArgs),

    /// Print the effective configuration
    Config(config::ConfigArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Find(_) => "find",
            Commands::Interactive(_) => "interactive",
            Commands::Config(_) => "config",
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    // Guard must be held until the end of run
    let _profile_guard = profiling::init(cli.profile.as_deref(), cli.command.name())?;

    let loaded = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Find(args) => find::execute(args, loaded),
        Commands::Interactive(args) => interactive::execute(args, loaded),
        Commands::Config(args) => config::execute(args, loaded),
    }
}

/// Configuration together with the file it came from, if any.
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = Config::load(path)?;
        return Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
        });
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let (config, path) = Config::discover(&cwd)?;
    Ok(LoadedConfig { config, path })
}
