use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Add,
    Overwrite,
}

/// Everything needed to finalize an upload at its destination.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub path: String,
    pub mode: WriteMode,
    pub autorename: bool,
    pub client_modified: DateTime<Utc>,
    pub mute: bool,
}

impl CommitInfo {
    /// Overwrites whatever lives at `path`. The timestamp is truncated to whole
    /// seconds, the API rejects fractional ones.
    pub fn new(path: impl Into<String>, client_modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::Overwrite,
            autorename: false,
            client_modified: client_modified.trunc_subsecs(0),
            mute: false,
        }
    }
}

/// Position inside an open upload session.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadSessionCursor {
    pub session_id: String,
    pub offset: u64,
}

impl UploadSessionCursor {
    pub fn new(session_id: impl Into<String>, offset: u64) -> Self {
        Self {
            session_id: session_id.into(),
            offset,
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct UploadSessionStartArg {
    pub close: bool,
}

#[derive(Deserialize, Debug)]
pub(crate) struct UploadSessionStartResult {
    pub session_id: String,
}

#[derive(Serialize, Debug)]
pub(crate) struct UploadSessionAppendArg<'a> {
    pub cursor: &'a UploadSessionCursor,
    pub close: bool,
}

#[derive(Serialize, Debug)]
pub(crate) struct UploadSessionFinishArg<'a> {
    pub cursor: &'a UploadSessionCursor,
    pub commit: &'a CommitInfo,
}

#[derive(Serialize, Debug)]
pub(crate) struct ListFolderArg<'a> {
    pub path: &'a str,
    pub recursive: bool,
}

#[derive(Serialize, Debug)]
pub(crate) struct ListFolderContinueArg<'a> {
    pub cursor: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub path_display: String,
    pub size: u64,
    pub client_modified: DateTime<Utc>,
    pub server_modified: DateTime<Utc>,
    #[serde(default)]
    pub rev: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FolderMetadata {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub path_display: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DeletedMetadata {
    pub name: String,
    #[serde(default)]
    pub path_display: String,
}

/// One entry of a folder listing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

impl Metadata {
    pub fn path_display(&self) -> &str {
        match self {
            Metadata::File(f) => &f.path_display,
            Metadata::Folder(f) => &f.path_display,
            Metadata::Deleted(f) => &f.path_display,
        }
    }
}

/// One page of a folder listing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// Body of an HTTP 409 response.
#[derive(Deserialize, Debug)]
pub(crate) struct EndpointErrorBody {
    pub error_summary: String,
}
