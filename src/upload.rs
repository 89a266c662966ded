use std::path::Path;

use indicatif::ProgressBar;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::api::DropboxApi;
use crate::error::{ApiError, DbxError, Result, UploadStep};
use crate::types::{CommitInfo, FileMetadata, UploadSessionCursor};

/// 16 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1 << 24;

/// Largest body a single session call accepts.
pub const MAX_CHUNK_SIZE: u64 = 150 * 1024 * 1024;

/// Inputs that fit one chunk go up in a single `upload` call. Larger ones open
/// a session with the first chunk and commit the tail with `finish`.
pub struct Uploader<'a, A> {
    api: &'a A,
    chunk_size: u64,
    progress: ProgressBar,
}

impl<'a, A: DropboxApi> Uploader<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(DbxError::Config(format!(
                "chunk size must be between 1 and {MAX_CHUNK_SIZE} bytes, got {chunk_size}"
            )));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// Advanced by the number of bytes each call transmits.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Uploads `total_size` bytes from `reader`. `source` only labels I/O
    /// errors.
    pub async fn upload<R>(
        &self,
        reader: &mut R,
        source: &Path,
        commit: &CommitInfo,
        total_size: u64,
    ) -> Result<FileMetadata>
    where
        R: AsyncRead + Unpin,
    {
        if total_size > self.chunk_size {
            self.upload_chunked(reader, source, commit, total_size)
                .await
        } else {
            self.upload_small(reader, source, commit, total_size).await
        }
    }

    pub async fn upload_small<R>(
        &self,
        reader: &mut R,
        source: &Path,
        commit: &CommitInfo,
        total_size: u64,
    ) -> Result<FileMetadata>
    where
        R: AsyncRead + Unpin,
    {
        let body = read_chunk(reader, source, total_size).await?;
        debug!(path = %commit.path, bytes = total_size, "upload");
        let metadata = self
            .api
            .upload(commit, body)
            .await
            .map_err(|e| failed(UploadStep::Upload, commit, e))?;
        self.progress.inc(total_size);
        Ok(metadata)
    }

    /// Requires `total_size > chunk_size`; smaller inputs belong to
    /// [`Uploader::upload_small`].
    pub async fn upload_chunked<R>(
        &self,
        reader: &mut R,
        source: &Path,
        commit: &CommitInfo,
        total_size: u64,
    ) -> Result<FileMetadata>
    where
        R: AsyncRead + Unpin,
    {
        let chunk = self.chunk_size;
        if total_size <= chunk {
            return Err(DbxError::Usage(format!(
                "{} bytes fit in one {chunk} byte chunk, use a single upload",
                total_size
            )));
        }

        let body = read_chunk(reader, source, chunk).await?;
        debug!(path = %commit.path, bytes = chunk, "upload session start");
        let session_id = self
            .api
            .upload_session_start(body)
            .await
            .map_err(|e| failed(UploadStep::Start, commit, e))?;
        self.progress.inc(chunk);

        let mut cursor = UploadSessionCursor::new(session_id, chunk);
        while total_size - cursor.offset > chunk {
            let body = read_chunk(reader, source, chunk).await?;
            debug!(
                session = %cursor.session_id,
                offset = cursor.offset,
                bytes = chunk,
                "upload session append"
            );
            self.api
                .upload_session_append(&cursor, body)
                .await
                .map_err(|e| failed(UploadStep::Append, commit, e))?;
            cursor.offset += chunk;
            self.progress.inc(chunk);
        }

        let rest = total_size - cursor.offset;
        let body = read_chunk(reader, source, rest).await?;
        debug!(
            session = %cursor.session_id,
            offset = cursor.offset,
            bytes = rest,
            "upload session finish"
        );
        let metadata = self
            .api
            .upload_session_finish(&cursor, commit, body)
            .await
            .map_err(|e| failed(UploadStep::Finish, commit, e))?;
        self.progress.inc(rest);
        Ok(metadata)
    }
}

fn failed(step: UploadStep, commit: &CommitInfo, source: ApiError) -> DbxError {
    DbxError::UploadFailed {
        step,
        path: commit.path.clone(),
        source,
    }
}

/// Reads exactly `len` bytes. A short read means the input changed size after
/// it was stat'ed.
async fn read_chunk<R>(reader: &mut R, source: &Path, len: u64) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let size = usize::try_from(len).map_err(|_| DbxError::LocalIo {
        path: source.to_path_buf(),
        source: std::io::Error::other(format!("chunk of {len} bytes does not fit in memory")),
    })?;
    let mut buf = vec![0u8; size];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|source_err| DbxError::LocalIo {
            path: source.to_path_buf(),
            source: source_err,
        })?;
    Ok(buf)
}
