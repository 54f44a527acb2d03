//! Install state machine and UI observers
//!
//! A run moves through `Idle -> Installing -> [Downloading(p)* -> Installing]
//! -> Done | Failed`. UIs either observe the enum directly or render the flag
//! view returned by [`InstallState::snapshot`].

use serde::Serialize;
use tokio::sync::mpsc;

/// Why a run ended in the failed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    PackageManagerInstall,
    DownloadOffline,
    Download,
    Finalize,
}

/// State of one installation run as seen by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InstallState {
    #[default]
    Idle,
    Installing,
    Downloading { progress: u8 },
    Failed { reason: FailureReason },
    Done,
}

impl InstallState {
    /// `Done` and `Failed` end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallState::Done | InstallState::Failed { .. })
    }

    pub fn snapshot(&self) -> UiSnapshot {
        match self {
            InstallState::Idle => UiSnapshot::default(),
            InstallState::Installing => UiSnapshot {
                installing: true,
                ..UiSnapshot::default()
            },
            InstallState::Downloading { progress } => UiSnapshot {
                installing: true,
                downloading: true,
                progress: Some(*progress),
                ..UiSnapshot::default()
            },
            InstallState::Failed { .. } => UiSnapshot::default(),
            InstallState::Done => UiSnapshot {
                done: true,
                ..UiSnapshot::default()
            },
        }
    }
}

/// Flag view of an [`InstallState`] for UIs that render booleans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UiSnapshot {
    pub installing: bool,
    pub downloading: bool,
    pub done: bool,
    pub progress: Option<u8>,
}

/// Receives every state transition of a run.
///
/// Called synchronously from the install flow, so implementations must not
/// block.
pub trait StateObserver: Send + Sync {
    fn on_transition(&self, state: &InstallState);
}

impl<F> StateObserver for F
where
    F: Fn(&InstallState) + Send + Sync,
{
    fn on_transition(&self, state: &InstallState) {
        self(state)
    }
}

/// Forwards transitions to a channel so a UI task can subscribe to them
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<InstallState>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<InstallState>) -> Self {
        Self { sender }
    }

    /// Create an observer together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<InstallState>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl StateObserver for ChannelObserver {
    fn on_transition(&self, state: &InstallState) {
        if self.sender.send(state.clone()).is_err() {
            log::debug!("State subscriber dropped, discarding transition {:?}", state);
        }
    }
}
