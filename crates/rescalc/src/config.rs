use anyhow::Result;
use clap::Args;

use crate::find::SearchArgs;
use crate::LoadedConfig;

#[derive(Args, Debug)]
#[command(about = "Print the effective configuration as TOML")]
pub struct ConfigArgs {
    /// Overrides to apply before printing
    #[command(flatten)]
    pub search: SearchArgs,

    /// Only print the path of the configuration file in use
    #[arg(long)]
    pub path: bool,
}

pub fn execute(args: ConfigArgs, loaded: LoadedConfig) -> Result<()> {
    if args.path {
        match &loaded.path {
            Some(path) => println!("{}", path.display()),
            None => println!("(defaults)"),
        }
        return Ok(());
    }

    let mut config = loaded.config;
    args.search.apply(&mut config);

    match &loaded.path {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# Built-in defaults"),
    }
    print!("{}", config.to_toml_string()?);
    Ok(())
}
