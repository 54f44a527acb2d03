//! Installation of the command-line tool
//!
//! The orchestrator decides between the package manager and the bundled
//! binary; everything it talks to sits behind the traits in [`traits`].

pub mod binary;
pub mod connectivity;
pub mod orchestrator;
pub mod process;
pub mod reporting;
pub mod state;
pub mod traits;

pub use binary::HttpBinaryProvisioner;
pub use connectivity::EnvConnectivity;
pub use orchestrator::{
    InstallMethod, InstallOrchestrator, InstallOrchestratorBuilder, InstallOutcome,
    OrchestratorSettings,
};
pub use process::ShellProcessRunner;
pub use reporting::{ConsoleErrorPresenter, ConsoleNotifier, LogErrorPresenter, LogNotifier};
pub use state::{ChannelObserver, FailureReason, InstallState, StateObserver, UiSnapshot};
pub use traits::{
    BinaryProvisioner, Connectivity, DownloadDescriptor, ErrorPresenter, Notification, Notifier,
    Platform, ProcessRunner, TempBinary,
};
