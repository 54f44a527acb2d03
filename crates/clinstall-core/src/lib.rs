//! Installer for a command-line tool.
//!
//! Installs the tool globally through its package manager when that is
//! available, and otherwise downloads a prebuilt binary and moves it into an
//! install directory.
//!
//! - **Configuration**: YAML settings for the tool, package manager, and download source
//! - **Orchestration**: a single-run state machine that reports its progress to observers
//! - **Provisioning**: release lookup, streamed download, and archive extraction over HTTP

pub mod config;
pub mod errors;
pub mod installation;

pub use config::{ConfigLoader, InstallerConfig};
pub use errors::{DownloadError, FinalizeError, InstallationError, ProcessError};
pub use installation::{
    InstallMethod, InstallOrchestrator, InstallOutcome, InstallState, OrchestratorSettings,
    StateObserver,
};

#[cfg(test)]
pub mod test_utils;
