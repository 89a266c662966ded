use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dropbox",
    version,
    about = "List and upload files in a Dropbox account"
)]
pub struct CliArgs {
    /// Dropbox API key
    #[arg(long, env = "DROPBOX_KEY", global = true, hide_env_values = true)]
    pub key: Option<String>,

    /// Dropbox API secret
    #[arg(long, env = "DROPBOX_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// Dropbox API domain
    #[arg(long, env = "DROPBOX_DOMAIN", global = true)]
    pub domain: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List files of a Dropbox folder
    Ls(LsArgs),
    /// Upload one or more files to a Dropbox folder
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LsArgs {
    /// List recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Folder to list
    pub folder: String,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Local files to upload
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Destination folder
    pub folder: String,
}
