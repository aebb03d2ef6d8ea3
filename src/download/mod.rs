//! Downloading GeoNames resources into the staging directory.
//!
//! A [`Downloader`] fetches a [`Resource`], decompresses it when it is
//! archived and returns the path of the text file. Transfers go to a `.part`
//! file that is renamed only once the body is complete, so an interrupted or
//! cancelled download never leaves a file that looks valid.
//!
//! Transient failures (timeouts, 5xx, 429, short bodies) are retried with
//! exponential backoff; anything else is returned to the caller immediately.

mod extract;
mod resource;

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;
use tokio_retry::RetryIf;
use tokio_util::sync::CancellationToken;

use crate::config::{PARTIAL_DOWNLOAD_SUFFIX, TCP_CONNECT_TIMEOUT_SECS, USER_AGENT};
use crate::error_handling::{get_retry_strategy, is_retriable, DownloadError, InitializationError};

pub use resource::{ArchiveFormat, GeoNamesResources, Resource};

#[cfg(test)]
pub(crate) use extract::tests as extract_tests;

/// Fetches resources into a staging directory and remembers what it staged.
pub struct Downloader {
    client: reqwest::Client,
    directory: PathBuf,
    cancel: CancellationToken,
    staged: Vec<PathBuf>,
}

impl Downloader {
    /// Creates a downloader writing into `directory`.
    ///
    /// `timeout` bounds a single attempt, including the body transfer.
    pub fn new(directory: impl Into<PathBuf>, timeout: Duration) -> Result<Self, InitializationError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            directory: directory.into(),
            cancel: CancellationToken::new(),
            staged: Vec::new(),
        })
    }

    /// Uses `token` to abort in-flight downloads.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Files staged (downloaded, extracted or reused) by this downloader.
    pub fn staged_files(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Fetches `resource` and returns the path of its text file.
    ///
    /// A non-empty local copy is reused unless `force` is set. For archived
    /// resources, an archive already on disk is extracted without downloading
    /// again; if it turns out to be corrupt it is discarded and fetched anew.
    pub async fn fetch(&mut self, resource: &Resource, force: bool) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| DownloadError::Io {
                path: self.directory.clone(),
                source,
            })?;

        let target = self.directory.join(&resource.file_name);
        if !force && is_non_empty(&target).await {
            info!("Using existing {}", target.display());
            self.stage(target.clone());
            return Ok(target);
        }

        if resource.format == ArchiveFormat::Plain {
            self.download(resource.url.as_str(), &target).await?;
            self.stage(target.clone());
            return Ok(target);
        }

        let archive = self.directory.join(resource.archive_name());
        if !force && is_non_empty(&archive).await {
            match unpack(resource, &archive, &target).await {
                Ok(()) => {
                    info!("Extracted existing archive {}", archive.display());
                    self.stage(archive);
                    self.stage(target.clone());
                    return Ok(target);
                }
                Err(DownloadError::CorruptArchive { reason, .. }) => {
                    warn!(
                        "Discarding corrupt archive {} ({}), downloading again",
                        archive.display(),
                        reason
                    );
                }
                Err(e) => return Err(e),
            }
        }

        self.download(resource.url.as_str(), &archive).await?;
        self.stage(archive.clone());
        unpack(resource, &archive, &target).await?;
        self.stage(target.clone());
        Ok(target)
    }

    /// Removes every file this downloader staged.
    pub async fn cleanup(&mut self) -> Result<(), DownloadError> {
        for path in self.staged.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(DownloadError::Io { path, source }),
            }
        }
        Ok(())
    }

    fn stage(&mut self, path: PathBuf) {
        if !self.staged.contains(&path) {
            self.staged.push(path);
        }
    }

    /// Downloads `url` to `destination` with retries and cancellation.
    async fn download(&self, url: &str, destination: &Path) -> Result<(), DownloadError> {
        let partial = partial_path(destination);
        let client = &self.client;
        let partial_ref = partial.as_path();

        info!("Downloading {}", url);
        let attempts = RetryIf::spawn(
            get_retry_strategy(),
            move || download_once(client, url, partial_ref),
            |e: &DownloadError| {
                let retry = is_retriable(e);
                if retry {
                    warn!("Download of {} failed ({}), retrying...", url, e);
                }
                retry
            },
        );

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DownloadError::Cancelled(url.to_string())),
            result = attempts => result,
        };

        match result {
            Ok(bytes) => {
                tokio::fs::rename(&partial, destination)
                    .await
                    .map_err(|source| DownloadError::Io {
                        path: destination.to_path_buf(),
                        source,
                    })?;
                info!("Downloaded {} ({} bytes)", destination.display(), bytes);
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

/// One transfer attempt, streamed to `partial`. The partial file is removed on failure.
async fn download_once(
    client: &reqwest::Client,
    url: &str,
    partial: &Path,
) -> Result<u64, DownloadError> {
    let result = stream_to_file(client, url, partial).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(partial).await;
    }
    result
}

async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    partial: &Path,
) -> Result<u64, DownloadError> {
    let transport = |source| DownloadError::Transport {
        url: url.to_string(),
        source,
    };
    let io_error = |source| DownloadError::Io {
        path: partial.to_path_buf(),
        source,
    };

    let mut response = client.get(url).send().await.map_err(transport)?;
    if !response.status().is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    let expected = response.content_length();

    let mut file = tokio::fs::File::create(partial).await.map_err(io_error)?;
    let mut received: u64 = 0;
    while let Some(chunk) = response.chunk().await.map_err(transport)? {
        file.write_all(&chunk).await.map_err(io_error)?;
        received += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;

    if let Some(expected) = expected {
        if received != expected {
            return Err(DownloadError::Incomplete {
                url: url.to_string(),
                expected,
                received,
            });
        }
    }
    Ok(received)
}

/// Extracts the resource's text file from `archive` off the async runtime.
async fn unpack(resource: &Resource, archive: &Path, target: &Path) -> Result<(), DownloadError> {
    let format = resource.format;
    let entry = resource.file_name.clone();
    let archive_owned = archive.to_path_buf();
    let target_owned = target.to_path_buf();

    let joined = tokio::task::spawn_blocking(move || match format {
        ArchiveFormat::Zip => extract::extract_zip_entry(&archive_owned, &entry, &target_owned),
        ArchiveFormat::Gzip => extract::extract_gzip(&archive_owned, &target_owned),
        ArchiveFormat::Plain => Ok(0),
    })
    .await;

    match joined {
        Ok(result) => result.map(|_| ()),
        Err(e) => Err(DownloadError::CorruptArchive {
            path: archive.to_path_buf(),
            reason: format!("extraction task failed: {}", e),
        }),
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(PARTIAL_DOWNLOAD_SUFFIX);
    PathBuf::from(name)
}

async fn is_non_empty(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
