use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DbxError, Result};

/// OAuth2 bearer token as persisted between runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// A token file on disk, readable and writable by its owner only.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<executable>.token`, next to the running binary.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|source| DbxError::TokenIo {
            path: PathBuf::from("<executable>"),
            source,
        })?;
        let mut path = exe.into_os_string();
        path.push(".token");
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no token has been saved yet.
    pub fn load(&self) -> Result<Option<Token>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DbxError::TokenIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let token = serde_json::from_slice(&data).map_err(|source| DbxError::CorruptToken {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(token))
    }

    pub fn save(&self, token: &Token) -> Result<()> {
        let encoded = serde_json::to_vec_pretty(token).map_err(DbxError::TokenEncode)?;
        self.write(&encoded).map_err(|source| DbxError::TokenIo {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies to newly created files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(data)?;
        file.sync_all()
    }
}
