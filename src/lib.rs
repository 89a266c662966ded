pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod list;
pub mod token;
pub mod types;
pub mod upload;
pub mod util;

#[cfg(test)]
mod testing;

use crate::cli::{CliArgs, Command};
use crate::config::{Settings, load_config};

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let settings = Settings::resolve(&args, load_config()?)?;
    match &args.command {
        Command::Ls(ls) => commands::ls(&settings, ls).await?,
        Command::Upload(upload) => commands::upload(&settings, upload).await?,
    }
    Ok(())
}
