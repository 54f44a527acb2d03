//! Collaborator traits consumed by the install orchestrator

use crate::errors::{DownloadError, FinalizeError, ProcessError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Runs shell commands on behalf of the orchestrator
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` with `cwd` as working directory; any non-zero exit is an error
    async fn exec(&self, command: &str, cwd: &Path) -> Result<(), ProcessError>;
}

/// Resolves, downloads and places the bundled binary
#[async_trait]
pub trait BinaryProvisioner: Send + Sync {
    /// Resolve where the binary for the current platform can be downloaded from
    async fn download_descriptor(&self) -> Result<DownloadDescriptor, DownloadError>;

    /// Download the binary to a temporary location.
    ///
    /// `on_progress` receives percentages in `0..=100`. Connectivity failures
    /// must be reported as [`DownloadError::Offline`].
    async fn download(
        &self,
        url: &str,
        binary_name: &str,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<TempBinary, DownloadError>;

    /// Move a downloaded binary into its install location, replacing any
    /// existing binary of the same name. Returns the installed path.
    async fn finalize(&self, path: &Path) -> Result<PathBuf, FinalizeError>;
}

/// Surfaces the completion notification; fire-and-forget
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Surfaces a user-facing error message with an optional underlying cause
pub trait ErrorPresenter: Send + Sync {
    fn show(&self, message: &str, trace: Option<&dyn std::error::Error>);
}

/// Reports whether the host is known to be offline
pub trait Connectivity: Send + Sync {
    fn is_offline(&self) -> bool;
}

/// Where to fetch the bundled binary from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub url: String,
    pub binary_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// A downloaded binary that has not been finalized yet.
///
/// Owns the temporary directory it lives in. Dropping the handle removes the
/// directory as well; `cleanup` does so explicitly and reports errors.
#[derive(Debug)]
pub struct TempBinary {
    path: PathBuf,
    dir: TempDir,
}

impl TempBinary {
    pub fn new(dir: TempDir, path: PathBuf) -> Self {
        Self { path, dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the temporary directory and everything left in it
    pub fn cleanup(self) -> std::io::Result<()> {
        log::debug!("Removing temporary directory {}", self.dir.path().display());
        self.dir.close()
    }
}

/// Platform detection utilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Get the current platform
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Convert to the `os-arch` form used in release asset names
    pub fn to_asset_format(&self) -> String {
        let os = match self.os.as_str() {
            "macos" => "darwin",
            other => other,
        };

        let arch = match self.arch.as_str() {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            other => other,
        };

        format!("{}-{}", os, arch)
    }

    /// Other names this OS goes by in asset names
    pub fn os_aliases(&self) -> &'static [&'static str] {
        match self.os.as_str() {
            "macos" => &["macos", "darwin", "osx", "apple"],
            "windows" => &["windows", "-win", "win32", "win64"],
            "linux" => &["linux"],
            _ => &[],
        }
    }

    /// Other names this architecture goes by in asset names
    pub fn arch_aliases(&self) -> &'static [&'static str] {
        match self.arch.as_str() {
            "x86_64" => &["x86_64", "amd64", "x64"],
            "aarch64" => &["aarch64", "arm64"],
            _ => &[],
        }
    }
}
