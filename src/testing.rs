use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};

use crate::api::DropboxApi;
use crate::error::{ApiError, UploadStep};
use crate::types::{CommitInfo, FileMetadata, ListFolderResult, Metadata, UploadSessionCursor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload {
        path: String,
        len: u64,
    },
    Start {
        len: u64,
    },
    Append {
        session_id: String,
        offset: u64,
        len: u64,
    },
    Finish {
        session_id: String,
        offset: u64,
        len: u64,
        path: String,
    },
    ListFolder {
        path: String,
        recursive: bool,
    },
    ListFolderContinue {
        cursor: String,
    },
}

/// Records every call and, like the real service, rejects appends whose
/// offset does not match the bytes already received by the session.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    received: Mutex<Vec<u8>>,
    commits: Mutex<Vec<CommitInfo>>,
    pages: Mutex<VecDeque<ListFolderResult>>,
    fail_step: Option<UploadStep>,
    fail_list_after: Option<usize>,
}

const SESSION_ID: &str = "session-0001";

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(step: UploadStep) -> Self {
        Self {
            fail_step: Some(step),
            ..Self::default()
        }
    }

    pub fn with_pages(pages: Vec<ListFolderResult>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    /// Serve `pages` but fail the listing call that follows the first `n`.
    pub fn with_pages_failing_after(pages: Vec<ListFolderResult>, n: usize) -> Self {
        Self {
            fail_list_after: Some(n),
            ..Self::with_pages(pages)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// All bytes received, in arrival order.
    pub fn received(&self) -> Vec<u8> {
        self.received.lock().unwrap().clone()
    }

    /// Commits of every upload that reached the fake, successful or not.
    pub fn commits(&self) -> Vec<CommitInfo> {
        self.commits.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail(&self, step: UploadStep) -> Result<(), ApiError> {
        if self.fail_step == Some(step) {
            return Err(ApiError::Status {
                endpoint: step.to_string(),
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }

    fn next_page(&self) -> Result<ListFolderResult, ApiError> {
        let served = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::ListFolder { .. } | Call::ListFolderContinue { .. }))
            .count()
            - 1;
        if self.fail_list_after == Some(served) {
            return Err(ApiError::Endpoint {
                endpoint: "files/list_folder/continue".to_string(),
                summary: "reset/..".to_string(),
            });
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Endpoint {
                endpoint: "files/list_folder".to_string(),
                summary: "no more pages".to_string(),
            })
    }
}

pub fn file_metadata(path: &str, size: u64) -> FileMetadata {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    FileMetadata {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        id: format!("id:{path}"),
        path_display: path.to_string(),
        size,
        client_modified: at,
        server_modified: at,
        rev: "015f".to_string(),
    }
}

pub fn page(entries: Vec<Metadata>, cursor: &str, has_more: bool) -> ListFolderResult {
    ListFolderResult {
        entries,
        cursor: cursor.to_string(),
        has_more,
    }
}

impl DropboxApi for FakeApi {
    async fn upload(&self, commit: &CommitInfo, body: Vec<u8>) -> Result<FileMetadata, ApiError> {
        self.record(Call::Upload {
            path: commit.path.clone(),
            len: body.len() as u64,
        });
        self.commits.lock().unwrap().push(commit.clone());
        self.fail(UploadStep::Upload)?;
        self.received.lock().unwrap().extend_from_slice(&body);
        Ok(file_metadata(&commit.path, body.len() as u64))
    }

    async fn upload_session_start(&self, body: Vec<u8>) -> Result<String, ApiError> {
        self.record(Call::Start {
            len: body.len() as u64,
        });
        self.fail(UploadStep::Start)?;
        self.received.lock().unwrap().extend_from_slice(&body);
        Ok(SESSION_ID.to_string())
    }

    async fn upload_session_append(
        &self,
        cursor: &UploadSessionCursor,
        body: Vec<u8>,
    ) -> Result<(), ApiError> {
        self.record(Call::Append {
            session_id: cursor.session_id.clone(),
            offset: cursor.offset,
            len: body.len() as u64,
        });
        self.fail(UploadStep::Append)?;
        let mut received = self.received.lock().unwrap();
        if cursor.offset != received.len() as u64 {
            return Err(ApiError::Endpoint {
                endpoint: "files/upload_session/append_v2".to_string(),
                summary: "incorrect_offset/..".to_string(),
            });
        }
        received.extend_from_slice(&body);
        Ok(())
    }

    async fn upload_session_finish(
        &self,
        cursor: &UploadSessionCursor,
        commit: &CommitInfo,
        body: Vec<u8>,
    ) -> Result<FileMetadata, ApiError> {
        self.record(Call::Finish {
            session_id: cursor.session_id.clone(),
            offset: cursor.offset,
            len: body.len() as u64,
            path: commit.path.clone(),
        });
        self.commits.lock().unwrap().push(commit.clone());
        self.fail(UploadStep::Finish)?;
        let mut received = self.received.lock().unwrap();
        if cursor.offset != received.len() as u64 {
            return Err(ApiError::Endpoint {
                endpoint: "files/upload_session/finish".to_string(),
                summary: "lookup_failed/incorrect_offset/..".to_string(),
            });
        }
        received.extend_from_slice(&body);
        Ok(file_metadata(&commit.path, received.len() as u64))
    }

    async fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderResult, ApiError> {
        self.record(Call::ListFolder {
            path: path.to_string(),
            recursive,
        });
        self.next_page()
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult, ApiError> {
        self.record(Call::ListFolderContinue {
            cursor: cursor.to_string(),
        });
        self.next_page()
    }
}
