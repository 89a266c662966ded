use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single Dropbox API call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint-specific error (HTTP 409), e.g. `path/not_found/..`.
    #[error("{endpoint}: {summary}")]
    Endpoint { endpoint: String, summary: String },

    #[error("{endpoint}: unexpected status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint}: unable to decode response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to encode request argument: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The stage of an upload that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    Upload,
    Start,
    Append,
    Finish,
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStep::Upload => "upload",
            UploadStep::Start => "upload session start",
            UploadStep::Append => "upload session append",
            UploadStep::Finish => "upload session finish",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum DbxError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("unable to access token file {}: {source}", .path.display())]
    TokenIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to deserialize token from {}: {source}", .path.display())]
    CorruptToken {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to serialize token to JSON: {0}")]
    TokenEncode(#[source] serde_json::Error),

    #[error("{op} failed for {path}: {source}")]
    Remote {
        op: &'static str,
        path: String,
        #[source]
        source: ApiError,
    },

    #[error("{step} failed for {path}: {source}")]
    UploadFailed {
        step: UploadStep,
        path: String,
        #[source]
        source: ApiError,
    },

    #[error("unable to read {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T, E = DbxError> = std::result::Result<T, E>;
