//! Installation orchestrator
//!
//! Installs the tool through the package manager when one is present, and
//! falls back to downloading the prebuilt binary otherwise. Every failure is
//! handed to the error presenter and reported back as an [`InstallOutcome`];
//! `run` itself never fails.

use crate::config::{home_dir, InstallerConfig};
use crate::errors::InstallationError;
use crate::installation::binary::HttpBinaryProvisioner;
use crate::installation::connectivity::EnvConnectivity;
use crate::installation::process::ShellProcessRunner;
use crate::installation::reporting::{LogErrorPresenter, LogNotifier};
use crate::installation::state::{InstallState, StateObserver};
use crate::installation::traits::{
    BinaryProvisioner, Connectivity, ErrorPresenter, Notification, Notifier, ProcessRunner,
    TempBinary,
};
use std::path::PathBuf;
use std::sync::Arc;

/// How the tool ended up installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMethod {
    PackageManager,
    Bundled { path: PathBuf },
}

/// Result of one installation run
#[derive(Debug)]
pub enum InstallOutcome {
    /// The host reported itself offline; nothing was attempted
    Offline,
    Installed(InstallMethod),
    Failed(InstallationError),
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed(_))
    }
}

/// Commands and texts the orchestrator works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub tool_name: String,
    pub package_manager: String,
    pub version_command: String,
    pub install_command: String,
    pub permissions_help_url: String,
    /// When false the bundled binary is always used
    pub use_package_manager: bool,
    /// Working directory for package manager commands
    pub home_dir: PathBuf,
}

impl OrchestratorSettings {
    pub fn from_config(config: &InstallerConfig) -> Result<Self, InstallationError> {
        Ok(Self {
            tool_name: config.tool.name.clone(),
            package_manager: config.package_manager.name.clone(),
            version_command: config.package_manager.version_command.clone(),
            install_command: config.package_manager.install_command.clone(),
            permissions_help_url: config.package_manager.permissions_help_url.clone(),
            use_package_manager: config.package_manager.enabled,
            home_dir: home_dir()?,
        })
    }

    /// Remediation shown when the package manager install fails
    pub fn permissions_message(&self) -> String {
        format!(
            "Not able to install the CLI using {}. Please ensure that the permissions are fixed: \n\n{}",
            self.package_manager, self.permissions_help_url
        )
    }

    pub fn completion_notification(&self) -> Notification {
        Notification {
            title: format!("Finished Installing {} CLI", self.tool_name),
            body: format!("You can now use `{}` from the command line.", self.tool_name),
        }
    }
}

/// Per-run bookkeeping; discarded when `run` returns
struct InstallSession<'a> {
    observer: Option<&'a dyn StateObserver>,
}

impl<'a> InstallSession<'a> {
    fn new(observer: Option<&'a dyn StateObserver>) -> Self {
        Self { observer }
    }

    fn transition(&self, state: InstallState) {
        log::debug!("Install state -> {:?}", state);
        if let Some(observer) = self.observer {
            observer.on_transition(&state);
        }
    }
}

/// Drives a single install of the command-line tool
pub struct InstallOrchestrator {
    runner: Arc<dyn ProcessRunner>,
    provisioner: Arc<dyn BinaryProvisioner>,
    notifier: Arc<dyn Notifier>,
    presenter: Arc<dyn ErrorPresenter>,
    connectivity: Arc<dyn Connectivity>,
    settings: OrchestratorSettings,
}

impl InstallOrchestrator {
    pub fn new(
        settings: OrchestratorSettings,
        runner: Arc<dyn ProcessRunner>,
        provisioner: Arc<dyn BinaryProvisioner>,
        notifier: Arc<dyn Notifier>,
        presenter: Arc<dyn ErrorPresenter>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            runner,
            provisioner,
            notifier,
            presenter,
            connectivity,
            settings,
        }
    }

    pub fn builder(settings: OrchestratorSettings) -> InstallOrchestratorBuilder {
        InstallOrchestratorBuilder::new(settings)
    }

    /// Orchestrator wired with the shell runner, the HTTP provisioner, and the
    /// environment connectivity signal; reporting goes to the given sinks
    pub fn create_default(
        config: &InstallerConfig,
        notifier: Arc<dyn Notifier>,
        presenter: Arc<dyn ErrorPresenter>,
    ) -> Result<Self, InstallationError> {
        Self::builder(OrchestratorSettings::from_config(config)?)
            .runner(Arc::new(ShellProcessRunner::new()))
            .provisioner(Arc::new(HttpBinaryProvisioner::from_config(config)?))
            .connectivity(Arc::new(EnvConnectivity::new(config.connectivity_env.clone())))
            .notifier(notifier)
            .presenter(presenter)
            .build()
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run the installation once
    pub async fn run(&self, observer: Option<&dyn StateObserver>) -> InstallOutcome {
        let session = InstallSession::new(observer);

        if self.connectivity.is_offline() {
            let error = InstallationError::Offline;
            log::warn!("Host reports it is offline, not installing {}", self.settings.tool_name);
            self.presenter.show(&error.to_string(), None);
            return InstallOutcome::Offline;
        }

        session.transition(InstallState::Installing);

        let mut temp_binary: Option<TempBinary> = None;

        let method = if self.settings.use_package_manager && self.package_manager_installed().await {
            log::info!(
                "Installing {} with {}",
                self.settings.tool_name, self.settings.package_manager
            );

            if let Err(e) = self
                .runner
                .exec(&self.settings.install_command, &self.settings.home_dir)
                .await
            {
                let error = InstallationError::PackageManagerInstall {
                    message: self.settings.permissions_message(),
                };
                return self.stop_installation(&session, error, Some(&e));
            }

            InstallMethod::PackageManager
        } else {
            log::info!("Installing bundled {} binary", self.settings.tool_name);

            match self.load_bundled(&session).await {
                Ok((temp, path)) => {
                    temp_binary = Some(temp);
                    InstallMethod::Bundled { path }
                }
                Err(error) => return self.stop_installation(&session, error, None),
            }
        };

        session.transition(InstallState::Done);
        log::info!("Finished installing {} ({:?})", self.settings.tool_name, method);

        self.notifier.notify(&self.settings.completion_notification());

        if let Some(temp) = temp_binary {
            if let Err(e) = temp.cleanup() {
                log::warn!("Failed to remove temporary download directory: {}", e);
            }
        }

        InstallOutcome::Installed(method)
    }

    /// Whether the package manager answers its version command.
    ///
    /// Any failure means "not installed"; it is never surfaced.
    async fn package_manager_installed(&self) -> bool {
        match self
            .runner
            .exec(&self.settings.version_command, &self.settings.home_dir)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("{} not available: {}", self.settings.package_manager, e);
                false
            }
        }
    }

    /// Download the bundled binary and move it into place.
    ///
    /// The returned handle still owns the temporary directory so the caller
    /// can clean it up once the run has completed.
    async fn load_bundled(
        &self,
        session: &InstallSession<'_>,
    ) -> Result<(TempBinary, PathBuf), InstallationError> {
        session.transition(InstallState::Downloading { progress: 0 });

        let descriptor = self.provisioner.download_descriptor().await.map_err(|e| {
            log::warn!("Could not resolve download URL: {}", e);
            InstallationError::from(e)
        })?;

        log::debug!("Downloading {} from {}", descriptor.binary_name, descriptor.url);

        let on_progress = |progress: u8| {
            session.transition(InstallState::Downloading { progress });
        };

        let temp = self
            .provisioner
            .download(&descriptor.url, &descriptor.binary_name, &on_progress)
            .await
            .map_err(|e| {
                log::warn!("Download of {} failed: {}", descriptor.url, e);
                InstallationError::from(e)
            })?;

        session.transition(InstallState::Installing);

        let installed = self.provisioner.finalize(temp.path()).await.map_err(|e| {
            log::warn!("Could not move {}: {}", temp.path().display(), e);
            InstallationError::from(e)
        })?;

        log::info!("Installed {} to {}", descriptor.binary_name, installed.display());
        Ok((temp, installed))
    }

    fn stop_installation(
        &self,
        session: &InstallSession<'_>,
        error: InstallationError,
        trace: Option<&dyn std::error::Error>,
    ) -> InstallOutcome {
        if let Some(reason) = error.failure_reason() {
            session.transition(InstallState::Failed { reason });
        }

        self.presenter.show(&error.to_string(), trace);
        InstallOutcome::Failed(error)
    }
}

/// Builder for [`InstallOrchestrator`].
///
/// Runner, provisioner and connectivity are required; reporting defaults to
/// the log.
pub struct InstallOrchestratorBuilder {
    settings: OrchestratorSettings,
    runner: Option<Arc<dyn ProcessRunner>>,
    provisioner: Option<Arc<dyn BinaryProvisioner>>,
    notifier: Option<Arc<dyn Notifier>>,
    presenter: Option<Arc<dyn ErrorPresenter>>,
    connectivity: Option<Arc<dyn Connectivity>>,
}

impl InstallOrchestratorBuilder {
    pub fn new(settings: OrchestratorSettings) -> Self {
        Self {
            settings,
            runner: None,
            provisioner: None,
            notifier: None,
            presenter: None,
            connectivity: None,
        }
    }

    pub fn runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn provisioner(mut self, provisioner: Arc<dyn BinaryProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn presenter(mut self, presenter: Arc<dyn ErrorPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn build(self) -> Result<InstallOrchestrator, InstallationError> {
        let runner = self.runner.ok_or_else(|| missing("process runner"))?;
        let provisioner = self.provisioner.ok_or_else(|| missing("binary provisioner"))?;
        let connectivity = self.connectivity.ok_or_else(|| missing("connectivity signal"))?;

        Ok(InstallOrchestrator::new(
            self.settings,
            runner,
            provisioner,
            self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
            self.presenter.unwrap_or_else(|| Arc::new(LogErrorPresenter)),
            connectivity,
        ))
    }
}

fn missing(collaborator: &str) -> InstallationError {
    InstallationError::InvalidConfiguration {
        message: format!("Install orchestrator requires a {}", collaborator),
    }
}
