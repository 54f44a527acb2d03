//! Extraction of the binary from downloaded release archives

use crate::errors::DownloadError;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::BufReader;
use tokio_tar::Archive;

/// Whether a download URL points at a gzipped tarball
pub fn is_tar_gz(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.ends_with(".tar.gz") || path.ends_with(".tgz")
}

/// Unpack the entry named `binary_name` from `archive_path` into `target_dir`
pub async fn extract_binary(
    archive_path: &Path,
    binary_name: &str,
    target_dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let file = File::open(archive_path).await?;
    let mut archive = Archive::new(GzipDecoder::new(BufReader::new(file)));

    let mut entries = archive
        .entries()
        .map_err(|e| DownloadError::Failed(format!("Failed to read archive entries: {}", e)))?;

    while let Some(entry) = entries.next().await {
        let mut entry = entry
            .map_err(|e| DownloadError::Failed(format!("Failed to read archive entry: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| DownloadError::Failed(format!("Failed to get entry path: {}", e)))?
            .into_owned();

        if path.file_name().map_or(false, |name| name == binary_name) {
            let binary_path = target_dir.join(binary_name);
            entry.unpack(&binary_path).await.map_err(|e| {
                DownloadError::Failed(format!("Failed to extract {}: {}", binary_name, e))
            })?;
            return Ok(binary_path);
        }
    }

    Err(DownloadError::Failed(format!(
        "Archive {} does not contain '{}'",
        archive_path.display(),
        binary_name
    )))
}
