use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::api::DropboxApi;
use crate::auth::{OAuthConfig, OAuthEndpoint, get_access_token, prompt};
use crate::cli::{LsArgs, UploadArgs};
use crate::client::{DropboxClient, Endpoints};
use crate::config::Settings;
use crate::error::{DbxError, Result};
use crate::list;
use crate::types::CommitInfo;
use crate::upload::Uploader;
use crate::util::pathify;

async fn connect(settings: &Settings) -> Result<DropboxClient> {
    let oauth = OAuthConfig::new(
        &settings.key,
        &settings.secret,
        OAuthEndpoint::for_domain(&settings.domain),
    )?;
    let token = get_access_token(&oauth, &settings.token_store, &reqwest::Client::new(), || {
        prompt("Enter the access code here: ")
    })
    .await?;
    Ok(DropboxClient::new(
        token.access_token,
        Endpoints::for_domain(&settings.domain),
    ))
}

pub async fn ls(settings: &Settings, args: &LsArgs) -> Result<()> {
    let path = pathify(&args.folder);
    let client = connect(settings).await?;

    let entries = list::list(&client, &path, args.recursive);
    futures::pin_mut!(entries);
    while let Some(entry) = entries.try_next().await? {
        if let Some(line) = list::format_entry(&entry) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn upload(settings: &Settings, args: &UploadArgs) -> Result<()> {
    let folder = pathify(&args.folder);
    let client = connect(settings).await?;
    upload_all(&client, settings.chunk_size, &args.inputs, &folder).await
}

/// Uploads `inputs` in order. The first failure stops the batch.
pub async fn upload_all<A: DropboxApi>(
    api: &A,
    chunk_size: u64,
    inputs: &[PathBuf],
    folder: &str,
) -> Result<()> {
    for input in inputs {
        upload_file(api, chunk_size, input, folder).await?;
    }
    Ok(())
}

/// Commits `input` to `<folder>/<file name>`, stamped with its mtime.
async fn upload_file<A: DropboxApi>(
    api: &A,
    chunk_size: u64,
    input: &Path,
    folder: &str,
) -> Result<()> {
    let local_err = |source| DbxError::LocalIo {
        path: input.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::open(input).await.map_err(local_err)?;
    let meta = file.metadata().await.map_err(local_err)?;
    if !meta.is_file() {
        return Err(DbxError::Usage(format!(
            "{} is not a regular file",
            input.display()
        )));
    }
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DbxError::Usage(format!("{} has no usable file name", input.display())))?;

    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    let commit = CommitInfo::new(format!("{folder}/{name}"), modified);

    let pb = ProgressBar::new(meta.len());
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message(name.to_string());

    let uploader = Uploader::new(api)
        .with_chunk_size(chunk_size)?
        .with_progress(pb.clone());
    let uploaded = uploader
        .upload(&mut file, input, &commit, meta.len())
        .await;
    match uploaded {
        Ok(metadata) => {
            pb.finish_and_clear();
            info!(
                input = %input.display(),
                path = %metadata.path_display,
                bytes = metadata.size,
                "uploaded"
            );
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e)
        }
    }
}
