//! Single-project archive transfer
//!
//! Resolves the archive URL for one work item, retries the request a fixed
//! number of times, then streams the body into
//! `output_root/<group path>/<project>_<hash>.zip`.

use std::future::Future;
use std::path::{Path, PathBuf};

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::client::ApiClient;
use crate::core::error::{Error, Result};
use crate::core::naming::archive_file_name;
use crate::core::stream::{create_http_stream, TransferOptions};
use crate::core::types::WorkItem;

/// What a successful transfer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transferred {
    /// Archive written to `path`
    Archived { path: PathBuf, bytes: u64 },
    /// Project has no default branch; nothing to download
    NoDefaultBranch,
}

impl Transferred {
    pub fn bytes(&self) -> u64 {
        match self {
            Transferred::Archived { bytes, .. } => *bytes,
            Transferred::NoDefaultBranch => 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Transferred::Archived { path, .. } => Some(path),
            Transferred::NoDefaultBranch => None,
        }
    }
}

/// Run `operation` up to `max_attempts` times with a fixed delay in between
///
/// Only transport errors are retried.
pub(crate) async fn with_attempts<F, Fut, T>(
    label: &str,
    options: &TransferOptions,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transport() && attempt < max_attempts => {
                warn!("{e} for '{label}' (attempt {attempt}/{max_attempts})");
                tokio::time::sleep(options.retry_delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_transport() {
                    warn!("{e} for '{label}' (attempt {attempt}/{max_attempts})");
                }
                return Err(e);
            }
        }
    }
}

/// Archive one project's default branch to disk
pub async fn transfer_archive(
    client: &ApiClient,
    output_root: &Path,
    item: &WorkItem,
    options: &TransferOptions,
) -> Result<Transferred> {
    let project = &item.project;

    let Some(branch) = project.default_branch() else {
        info!(
            "Skipping project '{}' in group '{}' (no default branch)",
            project.name, item.group_name
        );
        return Ok(Transferred::NoDefaultBranch);
    };

    let archive_url = client.endpoints().archive(project.id, branch)?;
    let group_dir = output_root.join(&item.group_path);
    let destination = group_dir.join(archive_file_name(&project.name, archive_url.as_str()));

    let response = with_attempts(&project.name, options, || client.get_archive(&archive_url)).await?;

    tokio::fs::create_dir_all(&group_dir)
        .await
        .map_err(|source| Error::Write {
            path: group_dir.clone(),
            source,
        })?;

    let mut file = tokio::fs::File::create(&destination)
        .await
        .map_err(|source| Error::Write {
            path: destination.clone(),
            source,
        })?;

    let mut stream = create_http_stream(response);
    let copied = stream_to_writer(
        &mut stream,
        &mut file,
        &destination,
        archive_url.as_str(),
        options.buffer_size,
    )
    .await;

    match copied {
        Ok(bytes) => {
            info!(
                "Downloaded archive for project '{}' in group '{}' => '{}'",
                project.name,
                item.group_name,
                destination.display()
            );
            Ok(Transferred::Archived {
                path: destination,
                bytes,
            })
        }
        Err(e) => {
            drop(file);
            // partial archives are worthless
            let _ = tokio::fs::remove_file(&destination).await;
            Err(e)
        }
    }
}

/// Copy the body into `writer`, separating read failures from write failures
async fn stream_to_writer<R, W>(
    reader: &mut R,
    writer: &mut W,
    destination: &Path,
    url: &str,
    buffer_size: usize,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut written = 0u64;

    let write_error = |source: std::io::Error| Error::Write {
        path: destination.to_path_buf(),
        source,
    };

    loop {
        let bytes_read = reader.read(&mut buffer).await.map_err(|e| Error::Transport {
            url: url.to_string(),
            reason: format!("Stream read error: {e}"),
        })?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .await
            .map_err(write_error)?;
        written += bytes_read as u64;
    }

    writer.flush().await.map_err(write_error)?;
    Ok(written)
}
