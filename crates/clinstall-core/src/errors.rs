//! Error types for the installation flow
//!
//! `InstallationError` is what a run ends with; its `Display` text is exactly
//! the message shown to the user. The collaborator errors below it
//! (`ProcessError`, `DownloadError`, `FinalizeError`) carry the detail that
//! ends up in logs or in the trace handed to the error presenter.

use crate::installation::state::FailureReason;
use std::path::PathBuf;
use thiserror::Error;

/// Fixed message shown when the host reports that it is offline.
pub const OFFLINE_MESSAGE: &str = "Could not download binary. You're offline!";
/// Fixed message shown for any download failure not classified as offline.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Could not download binary";
/// Fixed message shown when the downloaded binary cannot be moved into place.
pub const FINALIZE_FAILED_MESSAGE: &str = "Not able to move binary";

/// Errors that end an installation run
#[derive(Error, Debug)]
pub enum InstallationError {
    #[error("Could not download binary. You're offline!")]
    Offline,

    #[error("{message}")]
    PackageManagerInstall { message: String },

    #[error("{message}")]
    DownloadOffline { message: String },

    #[error("Could not download binary")]
    Download { reason: String },

    #[error("Not able to move binary")]
    Finalize { reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("I/O error during installation: {message}")]
    IoError { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },
}

impl InstallationError {
    /// The terminal UI state this error maps to, if it happened mid-run
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            InstallationError::PackageManagerInstall { .. } => Some(FailureReason::PackageManagerInstall),
            InstallationError::DownloadOffline { .. } => Some(FailureReason::DownloadOffline),
            InstallationError::Download { .. } => Some(FailureReason::Download),
            InstallationError::Finalize { .. } => Some(FailureReason::Finalize),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InstallationError {
    fn from(err: std::io::Error) -> Self {
        InstallationError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for InstallationError {
    fn from(err: reqwest::Error) -> Self {
        InstallationError::NetworkError {
            message: err.to_string(),
        }
    }
}

impl From<DownloadError> for InstallationError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Offline(message) => InstallationError::DownloadOffline { message },
            DownloadError::Failed(reason) => InstallationError::Download { reason },
        }
    }
}

impl From<FinalizeError> for InstallationError {
    fn from(err: FinalizeError) -> Self {
        InstallationError::Finalize {
            reason: err.to_string(),
        }
    }
}

/// Failure of a shell command run by a `ProcessRunner`
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code:?}: {stderr}")]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Failure while resolving or downloading the bundled binary.
///
/// The offline case is its own variant so the orchestrator never has to
/// inspect messages to decide what to show.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    #[error("{0}")]
    Offline(String),
    #[error("{0}")]
    Failed(String),
}

impl DownloadError {
    pub fn is_offline(&self) -> bool {
        matches!(self, DownloadError::Offline(_))
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            DownloadError::Offline(format!(
                "Could not reach the download server. You're offline! ({})",
                err
            ))
        } else {
            DownloadError::Failed(err.to_string())
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::Failed(format!("I/O error while downloading: {}", err))
    }
}

/// Failure while moving a downloaded binary into its install location
#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Source path {} has no file name", path.display())]
    InvalidSource { path: PathBuf },

    #[error("Failed to create install directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to mark {} as executable: {source}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
