use std::fmt::Write as _;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::DropboxApi;
use crate::error::ApiError;
use crate::types::{
    CommitInfo, EndpointErrorBody, FileMetadata, ListFolderArg, ListFolderContinueArg,
    ListFolderResult, UploadSessionAppendArg, UploadSessionCursor, UploadSessionFinishArg,
    UploadSessionStartArg, UploadSessionStartResult,
};

pub const DEFAULT_DOMAIN: &str = ".dropboxapi.com";

const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Base URLs of the two API hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// RPC host, e.g. `https://api.dropboxapi.com/2`.
    pub api: String,
    /// Content-upload host, e.g. `https://content.dropboxapi.com/2`.
    pub content: String,
}

impl Endpoints {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            api: format!("https://api{domain}/2"),
            content: format!("https://content{domain}/2"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::for_domain(DEFAULT_DOMAIN)
    }
}

pub struct DropboxClient {
    pub client: Client,
    pub token: String,
    pub endpoints: Endpoints,
}

impl DropboxClient {
    pub fn new(token: impl Into<String>, endpoints: Endpoints) -> Self {
        Self::with_http(Client::new(), token, endpoints)
    }

    pub fn with_http(client: Client, token: impl Into<String>, endpoints: Endpoints) -> Self {
        Self {
            client,
            token: token.into(),
            endpoints,
        }
    }

    fn rpc<T: Serialize + ?Sized>(&self, endpoint: &str, arg: &T) -> RequestBuilder {
        self.client
            .post(format!("{}/{endpoint}", self.endpoints.api))
            .bearer_auth(&self.token)
            .json(arg)
    }

    fn content<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        arg: &T,
        body: Vec<u8>,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .post(format!("{}/{endpoint}", self.endpoints.content))
            .bearer_auth(&self.token)
            .header(API_ARG_HEADER, header_safe_json(arg)?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body))
    }
}

/// Sends the request and decodes a successful JSON response.
async fn dispatch<T: DeserializeOwned>(endpoint: &str, req: RequestBuilder) -> Result<T, ApiError> {
    debug!(endpoint, "dropbox request");
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        // append_v2 answers with `null`, sometimes with nothing at all.
        let body = if body.trim().is_empty() { "null" } else { &body };
        return serde_json::from_str(body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        });
    }

    if status == StatusCode::CONFLICT {
        if let Ok(err) = serde_json::from_str::<EndpointErrorBody>(&body) {
            return Err(ApiError::Endpoint {
                endpoint: endpoint.to_string(),
                summary: err.error_summary,
            });
        }
    }
    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// JSON for the `Dropbox-API-Arg` header. Header values must be visible ASCII,
/// so DEL and everything above it is written as `\uXXXX` escapes.
pub(crate) fn header_safe_json<T: Serialize + ?Sized>(arg: &T) -> Result<String, ApiError> {
    let json = serde_json::to_string(arg)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if (c as u32) < 0x7f {
            out.push(c);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{unit:04x}");
        }
    }
    Ok(out)
}

impl DropboxApi for DropboxClient {
    async fn upload(&self, commit: &CommitInfo, body: Vec<u8>) -> Result<FileMetadata, ApiError> {
        const ENDPOINT: &str = "files/upload";
        dispatch(ENDPOINT, self.content(ENDPOINT, commit, body)?).await
    }

    async fn upload_session_start(&self, body: Vec<u8>) -> Result<String, ApiError> {
        const ENDPOINT: &str = "files/upload_session/start";
        let arg = UploadSessionStartArg { close: false };
        let res: UploadSessionStartResult =
            dispatch(ENDPOINT, self.content(ENDPOINT, &arg, body)?).await?;
        Ok(res.session_id)
    }

    async fn upload_session_append(
        &self,
        cursor: &UploadSessionCursor,
        body: Vec<u8>,
    ) -> Result<(), ApiError> {
        const ENDPOINT: &str = "files/upload_session/append_v2";
        let arg = UploadSessionAppendArg {
            cursor,
            close: false,
        };
        dispatch(ENDPOINT, self.content(ENDPOINT, &arg, body)?).await
    }

    async fn upload_session_finish(
        &self,
        cursor: &UploadSessionCursor,
        commit: &CommitInfo,
        body: Vec<u8>,
    ) -> Result<FileMetadata, ApiError> {
        const ENDPOINT: &str = "files/upload_session/finish";
        let arg = UploadSessionFinishArg { cursor, commit };
        dispatch(ENDPOINT, self.content(ENDPOINT, &arg, body)?).await
    }

    async fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderResult, ApiError> {
        const ENDPOINT: &str = "files/list_folder";
        let arg = ListFolderArg { path, recursive };
        dispatch(ENDPOINT, self.rpc(ENDPOINT, &arg)).await
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult, ApiError> {
        const ENDPOINT: &str = "files/list_folder/continue";
        let arg = ListFolderContinueArg { cursor };
        dispatch(ENDPOINT, self.rpc(ENDPOINT, &arg)).await
    }
}
