use crate::cli::CliArgs;
use crate::client::DEFAULT_DOMAIN;
use crate::error::{DbxError, Result};
use crate::token::TokenStore;
use crate::upload::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH: &str = "~/.config/dropbox/config.toml";

/// Optional defaults from the config file. Flags and environment variables
/// take precedence.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FileConfig {
    pub key: Option<String>,
    pub secret: Option<String>,
    pub domain: Option<String>,
    pub token_file: Option<String>,
    pub chunk_size: Option<u64>,
}

pub fn load_config() -> Result<FileConfig> {
    load_config_from(&expand(CONFIG_PATH))
}

/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<FileConfig> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(e) => Err(DbxError::Config(format!(
            "unable to read {}: {e}",
            path.display()
        ))),
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Everything a command needs, resolved from flags, environment and config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub key: String,
    pub secret: String,
    pub domain: String,
    pub token_store: TokenStore,
    pub chunk_size: u64,
}

impl Settings {
    pub fn resolve(args: &CliArgs, file: FileConfig) -> Result<Self> {
        let key = pick(args.key.clone(), file.key)
            .ok_or_else(|| DbxError::Auth("Dropbox API key is missing".to_string()))?;
        let secret = pick(args.secret.clone(), file.secret)
            .ok_or_else(|| DbxError::Auth("Dropbox API secret is missing".to_string()))?;
        let domain = pick(args.domain.clone(), file.domain)
            .map(|d| normalize_domain(&d))
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

        let token_store = match file.token_file {
            Some(path) => TokenStore::new(expand(&path)),
            None => TokenStore::beside_executable()?,
        };

        let chunk_size = file.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(DbxError::Config(format!(
                "chunk_size must be between 1 and {MAX_CHUNK_SIZE}, got {chunk_size}"
            )));
        }

        Ok(Self {
            key,
            secret,
            domain,
            token_store,
            chunk_size,
        })
    }
}

/// First non-empty value.
fn pick(flag: Option<String>, file: Option<String>) -> Option<String> {
    flag.filter(|s| !s.is_empty())
        .or(file.filter(|s| !s.is_empty()))
}

/// Domains are host suffixes such as `.dropboxapi.com`.
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    if domain.starts_with('.') {
        domain.to_string()
    } else {
        format!(".{domain}")
    }
}
