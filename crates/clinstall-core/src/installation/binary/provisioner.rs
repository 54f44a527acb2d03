//! HTTP binary provisioner

use crate::config::InstallerConfig;
use crate::errors::{DownloadError, FinalizeError, InstallationError};
use crate::installation::binary::archive;
use crate::installation::binary::release::{GitHubRelease, ReleaseSource};
use crate::installation::traits::{BinaryProvisioner, DownloadDescriptor, Platform, TempBinary};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Downloads the bundled binary over HTTP and installs it into a directory
#[derive(Debug, Clone)]
pub struct HttpBinaryProvisioner {
    client: Client,
    source: ReleaseSource,
    binary_name: String,
    install_dir: PathBuf,
    platform: Platform,
}

impl HttpBinaryProvisioner {
    pub fn new(
        client: Client,
        source: ReleaseSource,
        binary_name: impl Into<String>,
        install_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            source,
            binary_name: binary_name.into(),
            install_dir,
            platform: Platform::current(),
        }
    }

    pub fn from_config(config: &InstallerConfig) -> Result<Self, InstallationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.download.connect_timeout_secs))
            .user_agent(config.download.user_agent.clone())
            .build()?;

        let source = match (&config.download.source.url, &config.download.source.github) {
            (Some(url), _) => ReleaseSource::Direct {
                template: url.clone(),
            },
            (None, Some(github)) => ReleaseSource::GitHub(GitHubRelease::from_config(github)),
            (None, None) => {
                return Err(InstallationError::InvalidConfiguration {
                    message: "No download source configured".to_string(),
                })
            }
        };

        Ok(Self::new(
            client,
            source,
            config.tool.binary_name.clone(),
            config.resolve_install_dir()?,
        ))
    }

    /// Resolve assets for another platform than the one we run on
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    async fn make_executable(path: &Path) -> Result<(), FinalizeError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let to_error = |source| FinalizeError::Permissions {
                path: path.to_path_buf(),
                source,
            };
            let mut permissions = fs::metadata(path).await.map_err(to_error)?.permissions();
            permissions.set_mode(0o755);
            fs::set_permissions(path, permissions).await.map_err(to_error)?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }
}

#[async_trait]
impl BinaryProvisioner for HttpBinaryProvisioner {
    async fn download_descriptor(&self) -> Result<DownloadDescriptor, DownloadError> {
        let url = self
            .source
            .resolve(&self.client, &self.binary_name, &self.platform)
            .await?;

        Ok(DownloadDescriptor {
            url,
            binary_name: self.binary_name.clone(),
        })
    }

    async fn download(
        &self,
        url: &str,
        binary_name: &str,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<TempBinary, DownloadError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::Failed(format!(
                "Download of {} failed with status {}",
                url,
                response.status()
            )));
        }

        let dir = tempfile::Builder::new().prefix("clinstall-").tempdir()?;
        let packed = archive::is_tar_gz(url);
        let download_path = if packed {
            dir.path().join(format!("{}.tar.gz", binary_name))
        } else {
            dir.path().join(binary_name)
        };

        let mut progress = ProgressTracker::new(response.content_length());
        let mut file = fs::File::create(&download_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            if let Some(percent) = progress.advance(chunk.len() as u64) {
                on_progress(percent);
            }
        }
        file.flush().await?;
        drop(file);

        log::debug!("Downloaded {} bytes from {}", progress.received(), url);

        let binary_path = if packed {
            let extracted = archive::extract_binary(&download_path, binary_name, dir.path()).await?;
            fs::remove_file(&download_path).await?;
            extracted
        } else {
            download_path
        };

        Ok(TempBinary::new(dir, binary_path))
    }

    async fn finalize(&self, path: &Path) -> Result<PathBuf, FinalizeError> {
        let file_name = path.file_name().ok_or_else(|| FinalizeError::InvalidSource {
            path: path.to_path_buf(),
        })?;

        fs::create_dir_all(&self.install_dir)
            .await
            .map_err(|source| FinalizeError::CreateDir {
                dir: self.install_dir.clone(),
                source,
            })?;

        let target = self.install_dir.join(file_name);
        let move_error = |source| FinalizeError::Move {
            from: path.to_path_buf(),
            to: target.clone(),
            source,
        };

        if let Err(e) = fs::rename(path, &target).await {
            // Crossing filesystems; copy next to the target, then swap it in
            log::debug!("Rename into {} failed ({}), copying instead", target.display(), e);
            let mut staging_name = file_name.to_os_string();
            staging_name.push(".tmp");
            let staging = self.install_dir.join(staging_name);

            if let Err(source) = fs::copy(path, &staging).await {
                let _ = fs::remove_file(&staging).await;
                return Err(move_error(source));
            }
            if let Err(source) = fs::rename(&staging, &target).await {
                let _ = fs::remove_file(&staging).await;
                return Err(move_error(source));
            }
            if let Err(e) = fs::remove_file(path).await {
                log::warn!("Could not remove {} after copying: {}", path.display(), e);
            }
        }

        Self::make_executable(&target).await?;
        Ok(target)
    }
}

/// Turns received byte counts into whole percentages, reporting each value once
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: Option<u64>,
    received: u64,
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            received: 0,
            last: None,
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Record `bytes` more; returns the new percentage when it changed
    pub fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.received += bytes;
        let total = self.total?;
        let percent = (self.received.saturating_mul(100) / total).min(100) as u8;
        if self.last == Some(percent) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }
}
