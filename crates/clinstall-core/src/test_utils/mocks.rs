//! Recording collaborators for orchestrator tests

use crate::errors::{DownloadError, FinalizeError, ProcessError};
use crate::installation::orchestrator::OrchestratorSettings;
use crate::installation::state::{InstallState, StateObserver};
use crate::installation::traits::{
    BinaryProvisioner, Connectivity, DownloadDescriptor, ErrorPresenter, Notification, Notifier,
    ProcessRunner, TempBinary,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const VERSION_COMMAND: &str = "npm -v";
pub const INSTALL_COMMAND: &str = "npm install -g now";

pub fn test_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        tool_name: "now".to_string(),
        package_manager: "npm".to_string(),
        version_command: VERSION_COMMAND.to_string(),
        install_command: INSTALL_COMMAND.to_string(),
        permissions_help_url: "https://docs.npmjs.com/getting-started/fixing-npm-permissions"
            .to_string(),
        use_package_manager: true,
        home_dir: std::env::temp_dir(),
    }
}

/// Succeeds for the commands it was told about, fails everything else
#[derive(Debug, Default)]
pub struct MockProcessRunner {
    succeeding: HashSet<String>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeding(mut self, command: &str) -> Self {
        self.succeeding.insert(command.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(command, _)| command).collect()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn exec(&self, command: &str, cwd: &Path) -> Result<(), ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), cwd.to_path_buf()));

        if self.succeeding.contains(command) {
            Ok(())
        } else {
            Err(ProcessError::Exit {
                command: command.to_string(),
                code: Some(1),
                stderr: "mock failure".to_string(),
            })
        }
    }
}

/// Scripted provisioner that records every call
pub struct MockProvisioner {
    descriptor: Result<DownloadDescriptor, DownloadError>,
    download: Result<Vec<u8>, DownloadError>,
    finalize_ok: bool,
    progress_steps: Vec<u8>,
    install_dir: PathBuf,
    calls: Mutex<Vec<String>>,
    temp_dirs: Mutex<Vec<PathBuf>>,
    downloaded: Mutex<Vec<PathBuf>>,
    finalized: Mutex<Vec<PathBuf>>,
}

impl MockProvisioner {
    pub fn new(install_dir: PathBuf) -> Self {
        Self {
            descriptor: Ok(DownloadDescriptor {
                url: "https://example.com/now-linux".to_string(),
                binary_name: "now".to_string(),
            }),
            download: Ok(b"#!/bin/sh\necho now\n".to_vec()),
            finalize_ok: true,
            progress_steps: vec![25, 50, 100],
            install_dir,
            calls: Mutex::new(Vec::new()),
            temp_dirs: Mutex::new(Vec::new()),
            downloaded: Mutex::new(Vec::new()),
            finalized: Mutex::new(Vec::new()),
        }
    }

    pub fn with_descriptor_error(mut self, error: DownloadError) -> Self {
        self.descriptor = Err(error);
        self
    }

    pub fn with_download_error(mut self, error: DownloadError) -> Self {
        self.download = Err(error);
        self
    }

    pub fn with_finalize_failure(mut self) -> Self {
        self.finalize_ok = false;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Temporary directories handed out by `download`
    pub fn temp_dirs(&self) -> Vec<PathBuf> {
        self.temp_dirs.lock().unwrap().clone()
    }

    /// Binary paths handed out by `download`
    pub fn downloaded(&self) -> Vec<PathBuf> {
        self.downloaded.lock().unwrap().clone()
    }

    /// Paths `finalize` was asked to move into place
    pub fn finalized(&self) -> Vec<PathBuf> {
        self.finalized.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl BinaryProvisioner for MockProvisioner {
    async fn download_descriptor(&self) -> Result<DownloadDescriptor, DownloadError> {
        self.record("download_descriptor");
        self.descriptor.clone()
    }

    async fn download(
        &self,
        _url: &str,
        binary_name: &str,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<TempBinary, DownloadError> {
        self.record("download");
        let data = self.download.clone()?;

        for step in &self.progress_steps {
            on_progress(*step);
        }

        let dir = tempfile::tempdir()?;
        let path = dir.path().join(binary_name);
        std::fs::write(&path, data)?;
        self.temp_dirs.lock().unwrap().push(dir.path().to_path_buf());
        self.downloaded.lock().unwrap().push(path.clone());
        Ok(TempBinary::new(dir, path))
    }

    async fn finalize(&self, path: &Path) -> Result<PathBuf, FinalizeError> {
        self.record("finalize");
        assert!(
            path.exists(),
            "finalize called with {} which no longer exists",
            path.display()
        );
        self.finalized.lock().unwrap().push(path.to_path_buf());
        let target = self.install_dir.join(path.file_name().unwrap_or_default());
        if self.finalize_ok {
            Ok(target)
        } else {
            Err(FinalizeError::Move {
                from: path.to_path_buf(),
                to: target,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }
}

/// Records every (message, trace) pair shown
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    shown: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingPresenter {
    pub fn shown(&self) -> Vec<(String, Option<String>)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.shown().into_iter().map(|(message, _)| message).collect()
    }
}

impl ErrorPresenter for RecordingPresenter {
    fn show(&self, message: &str, trace: Option<&dyn std::error::Error>) {
        self.shown
            .lock()
            .unwrap()
            .push((message.to_string(), trace.map(|t| t.to_string())));
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    states: Mutex<Vec<InstallState>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<InstallState> {
        self.states.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<InstallState> {
        self.states.lock().unwrap().last().cloned()
    }
}

impl StateObserver for RecordingObserver {
    fn on_transition(&self, state: &InstallState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedConnectivity {
    offline: bool,
}

impl FixedConnectivity {
    pub fn online() -> Self {
        Self { offline: false }
    }

    pub fn offline() -> Self {
        Self { offline: true }
    }
}

impl Connectivity for FixedConnectivity {
    fn is_offline(&self) -> bool {
        self.offline
    }
}
