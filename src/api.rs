use std::future::Future;

use crate::error::ApiError;
use crate::types::{CommitInfo, FileMetadata, ListFolderResult, UploadSessionCursor};

/// The remote calls this tool makes. [`crate::client::DropboxClient`] talks
/// to Dropbox over HTTP; tests substitute a recording fake.
pub trait DropboxApi {
    /// Single-request upload of a whole file.
    fn upload(
        &self,
        commit: &CommitInfo,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<FileMetadata, ApiError>> + Send;

    /// Opens a session with its first chunk and returns the session ID.
    fn upload_session_start(
        &self,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// `cursor.offset` must equal the number of bytes the session holds.
    fn upload_session_append(
        &self,
        cursor: &UploadSessionCursor,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn upload_session_finish(
        &self,
        cursor: &UploadSessionCursor,
        commit: &CommitInfo,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<FileMetadata, ApiError>> + Send;

    fn list_folder(
        &self,
        path: &str,
        recursive: bool,
    ) -> impl Future<Output = Result<ListFolderResult, ApiError>> + Send;

    fn list_folder_continue(
        &self,
        cursor: &str,
    ) -> impl Future<Output = Result<ListFolderResult, ApiError>> + Send;
}
