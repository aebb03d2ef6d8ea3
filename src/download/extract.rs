//! Archive extraction utilities.
//!
//! This module extracts the text file of a GeoNames resource from the
//! downloaded zip or gzip archive. Output is written next to the target and
//! renamed into place, so a failed extraction never leaves a truncated file.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::config::PARTIAL_DOWNLOAD_SUFFIX;
use crate::error_handling::DownloadError;

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(PARTIAL_DOWNLOAD_SUFFIX);
    PathBuf::from(name)
}

fn corrupt(archive: &Path, reason: impl ToString) -> DownloadError {
    DownloadError::CorruptArchive {
        path: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Copies `reader` into `target` through a partial file.
///
/// Read failures mean the archive is damaged; write failures are local I/O.
fn copy_into_place(
    reader: &mut impl io::Read,
    archive: &Path,
    target: &Path,
) -> Result<u64, DownloadError> {
    let partial = partial_path(target);
    let io_error = |source| DownloadError::Io {
        path: partial.clone(),
        source,
    };

    let mut out = File::create(&partial).map_err(io_error)?;
    let copied = match io::copy(reader, &mut out) {
        Ok(copied) => copied,
        Err(e) => {
            drop(out);
            let _ = std::fs::remove_file(&partial);
            return Err(corrupt(archive, e));
        }
    };
    drop(out);

    std::fs::rename(&partial, target).map_err(|source| DownloadError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(copied)
}

/// Extracts `entry` from a zip archive into `target`.
pub(crate) fn extract_zip_entry(
    archive: &Path,
    entry: &str,
    target: &Path,
) -> Result<u64, DownloadError> {
    log::debug!("Extracting {} from {}", entry, archive.display());

    let file = File::open(archive).map_err(|source| DownloadError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| corrupt(archive, e))?;
    let mut zipped = zip.by_name(entry).map_err(|e| match e {
        ZipError::FileNotFound => DownloadError::MissingEntry {
            path: archive.to_path_buf(),
            entry: entry.to_string(),
        },
        other => corrupt(archive, other),
    })?;

    let copied = copy_into_place(&mut zipped, archive, target)?;
    log::info!(
        "Extracted {} from {} ({} bytes)",
        entry,
        archive.display(),
        copied
    );
    Ok(copied)
}

/// Decompresses a gzip file into `target`.
pub(crate) fn extract_gzip(archive: &Path, target: &Path) -> Result<u64, DownloadError> {
    let file = File::open(archive).map_err(|source| DownloadError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let copied = copy_into_place(&mut decoder, archive, target)?;
    log::info!("Decompressed {} ({} bytes)", archive.display(), copied);
    Ok(copied)
}
