use std::io;
use std::str::FromStr;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inquire::{Confirm, InquireError, Select, Text};
use rescalc_core::{Calculator, ConnectionMode, Resistance};

use crate::find::SearchArgs;
use crate::LoadedConfig;

#[derive(Args, Debug)]
#[command(about = "Prompt for inputs and recalculate until you quit")]
pub struct InteractiveArgs {
    /// Initial values for the prompts
    #[command(flatten)]
    pub search: SearchArgs,
}

/// Prompt until the answer parses. Returns `None` if the user bails out.
fn prompt_parsed<T, E>(
    message: &str,
    initial: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>>
where
    E: std::fmt::Display,
{
    loop {
        let answer = match Text::new(message).with_initial_value(initial).prompt() {
            Ok(answer) => answer,
            Err(e) => return cancelled(e),
        };
        match parse(answer.trim()) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => eprintln!("{} {}", "Invalid value:".red(), e),
        }
    }
}

/// Escape and Ctrl-C end the session quietly; anything else is an error.
fn cancelled<T>(err: InquireError) -> Result<Option<T>> {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => Ok(None),
        other => Err(other.into()),
    }
}

/// Ask for every input once, updating `calc` in place.
/// Returns `false` if the user cancelled.
fn edit_inputs(calc: &mut Calculator) -> Result<bool> {
    let resistors = match Text::new("Available resistors (Ω):")
        .with_initial_value(&calc.resistors)
        .with_help_message("Comma separated, e.g. 100, 220, 4k7")
        .prompt()
    {
        Ok(text) => text,
        Err(e) => return cancelled(e).map(|_: Option<()>| false),
    };
    calc.resistors = resistors;

    let initial_target = rescalc_core::format_ohms(calc.params.target);
    let Some(target) = prompt_parsed("Target value (Ω):", &initial_target, |s| {
        s.parse::<Resistance>().map(|r| r.to_f64())
    })?
    else {
        return Ok(false);
    };
    calc.params.target = target;

    let Some(tolerance) = prompt_parsed(
        "Tolerance (%):",
        &calc.params.tolerance.to_string(),
        f64::from_str,
    )?
    else {
        return Ok(false);
    };
    calc.params.tolerance = tolerance;

    let Some(max_size) = prompt_parsed(
        "Max resistors:",
        &calc.params.max_size.to_string(),
        usize::from_str,
    )?
    else {
        return Ok(false);
    };
    calc.params.max_size = max_size;

    let modes = vec![
        ConnectionMode::Both,
        ConnectionMode::Series,
        ConnectionMode::Parallel,
    ];
    let cursor = modes
        .iter()
        .position(|m| *m == calc.params.mode)
        .unwrap_or_default();
    match Select::new("Connection type:", modes)
        .with_starting_cursor(cursor)
        .prompt()
    {
        Ok(mode) => calc.params.mode = mode,
        Err(e) => return cancelled(e).map(|_: Option<()>| false),
    }

    Ok(true)
}

pub fn execute(args: InteractiveArgs, loaded: LoadedConfig) -> Result<()> {
    let mut config = loaded.config;
    args.search.apply(&mut config);
    let limit = Some(config.limit);

    let mut calc = Calculator::from_config(&config);

    loop {
        if !edit_inputs(&mut calc)? {
            break;
        }

        if !calc.calculate() {
            eprintln!("{}", "Keeping the previous results".dimmed());
        }

        println!();
        calc.results()
            .write_table(calc.params.mode, limit, io::stdout().lock())?;
        println!();

        match Confirm::new("Calculate again?").with_default(true).prompt() {
            Ok(true) => continue,
            Ok(false) => break,
            Err(e) => {
                cancelled::<()>(e)?;
                break;
            }
        }
    }

    Ok(())
}
