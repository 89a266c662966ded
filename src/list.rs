use async_stream::try_stream;
use futures::Stream;

use crate::api::DropboxApi;
use crate::error::{DbxError, Result};
use crate::types::{FileMetadata, FolderMetadata, Metadata};

/// Streams the entries under `path`, following the listing cursor until the
/// server reports no more pages. The stream can be consumed once.
pub fn list<'a, A: DropboxApi>(
    api: &'a A,
    path: &'a str,
    recursive: bool,
) -> impl Stream<Item = Result<Metadata>> + 'a {
    try_stream! {
        let mut page = api
            .list_folder(path, recursive)
            .await
            .map_err(|source| DbxError::Remote {
                op: "list_folder",
                path: path.to_string(),
                source,
            })?;

        loop {
            for entry in page.entries {
                yield entry;
            }
            if !page.has_more {
                break;
            }
            page = api
                .list_folder_continue(&page.cursor)
                .await
                .map_err(|source| DbxError::Remote {
                    op: "list_folder_continue",
                    path: path.to_string(),
                    source,
                })?;
        }
    }
}

/// `ls` line for an entry; deleted entries have none.
pub fn format_entry(entry: &Metadata) -> Option<String> {
    match entry {
        Metadata::File(f) => Some(format_file(f)),
        Metadata::Folder(f) => Some(format_folder(f)),
        Metadata::Deleted(_) => None,
    }
}

fn format_file(f: &FileMetadata) -> String {
    format!(
        "-rw-r--r--\t{}\t{}\t{}",
        f.size,
        f.server_modified.format("%a %b %d %H:%M:%S %z %Y"),
        f.path_display
    )
}

fn format_folder(f: &FolderMetadata) -> String {
    format!("drw-r--r--\t0\t\t{}", f.path_display)
}
