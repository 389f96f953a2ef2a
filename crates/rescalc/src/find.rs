use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rescalc_core::{
    parse_resistor_list, Calculator, Config, ConnectionMode, Resistance, SearchResults,
};

use crate::LoadedConfig;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON output
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Mode {
    /// Resistors end to end
    Series,
    /// Resistors across the same two nodes
    Parallel,
    /// Both searches
    Both,
}

impl From<Mode> for ConnectionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Series => ConnectionMode::Series,
            Mode::Parallel => ConnectionMode::Parallel,
            Mode::Both => ConnectionMode::Both,
        }
    }
}

fn parse_resistance(s: &str) -> Result<f64, String> {
    s.parse::<Resistance>()
        .map(|r| r.to_f64())
        .map_err(|e| format!("'{s}': {e}"))
}

/// Search inputs; anything left unset comes from the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Available resistors, comma separated (e.g. "100, 220, 4k7")
    #[arg(short = 'r', long, value_name = "LIST")]
    pub resistors: Option<String>,

    /// Target resistance (e.g. 1500, 1.5k, 1k5)
    #[arg(short = 't', long, value_name = "OHMS", value_parser = parse_resistance)]
    pub target: Option<f64>,

    /// Maximum error relative to the target, in percent
    #[arg(short = 'e', long, value_name = "PERCENT")]
    pub tolerance: Option<f64>,

    /// Maximum number of resistors in a combination
    #[arg(short = 'n', long, value_name = "N")]
    pub max_size: Option<usize>,

    /// Connection type to search
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<Mode>,

    /// Allow the same listed resistor to be used more than once
    #[arg(long)]
    pub allow_repeats: bool,
}

impl SearchArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(resistors) = &self.resistors {
            config.resistors = resistors.clone();
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_size) = self.max_size {
            config.max_size = max_size;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if self.allow_repeats {
            config.allow_repeats = true;
        }
    }
}

#[derive(Args, Debug)]
#[command(about = "Search for resistor combinations close to a target value")]
pub struct FindArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Number of combinations to show per connection type
    #[arg(short = 'l', long, value_name = "N", conflicts_with = "all")]
    pub limit: Option<usize>,

    /// Show every combination within tolerance
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn execute(args: FindArgs, loaded: LoadedConfig) -> Result<()> {
    let mut config = loaded.config;
    args.search.apply(&mut config);

    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    let limit = (!args.all).then_some(config.limit);

    let _span = tracing::info_span!("find", mode = %config.mode).entered();

    if parse_resistor_list(&config.resistors).is_empty() {
        log::warn!("No valid resistor values in '{}'", config.resistors);
    }

    let mut calculator = Calculator::from_config(&config);
    let results = calculator
        .try_calculate()
        .context("Invalid search parameters")?;

    let mut writer = io::stdout().lock();
    match args.format {
        OutputFormat::Json => write_json(results, limit, &mut writer)?,
        OutputFormat::Table => results.write_table(config.mode, limit, &mut writer)?,
    }

    Ok(())
}

fn write_json<W: Write>(
    results: &SearchResults,
    limit: Option<usize>,
    mut writer: W,
) -> Result<()> {
    let json = match limit {
        Some(limit) => results.truncated(limit).to_json(),
        None => results.to_json(),
    }?;
    writeln!(writer, "{json}")?;
    Ok(())
}
