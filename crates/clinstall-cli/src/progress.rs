//! Terminal rendering of install state transitions

use clinstall_core::installation::{InstallState, StateObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner while installing, percentage bar while downloading
pub struct ProgressObserver {
    bar: ProgressBar,
    spinner_style: ProgressStyle,
    download_style: ProgressStyle,
    tool_name: String,
}

impl ProgressObserver {
    pub fn new(tool_name: &str) -> anyhow::Result<Self> {
        Self::with_bar(ProgressBar::new_spinner(), tool_name)
    }

    pub fn with_bar(bar: ProgressBar, tool_name: &str) -> anyhow::Result<Self> {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner} {msg}")?
            .tick_strings(TICK_STRINGS);
        let download_style = ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos:>3}%")?
            .progress_chars("=> ");

        Ok(Self {
            bar,
            spinner_style,
            download_style,
            tool_name: tool_name.to_string(),
        })
    }

    fn spin(&self, message: String) {
        self.bar.set_style(self.spinner_style.clone());
        self.bar.set_message(message);
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }
}

impl StateObserver for ProgressObserver {
    fn on_transition(&self, state: &InstallState) {
        match state {
            InstallState::Idle => {}
            InstallState::Installing => {
                if self.bar.length() == Some(100) {
                    self.spin(format!("Moving {} into place", self.tool_name));
                } else {
                    self.spin(format!("Installing {} CLI", self.tool_name));
                }
            }
            InstallState::Downloading { progress } => {
                if self.bar.length() != Some(100) {
                    self.bar.disable_steady_tick();
                    self.bar.set_style(self.download_style.clone());
                    self.bar.set_length(100);
                    self.bar.set_message(format!("Downloading {}", self.tool_name));
                }
                self.bar.set_position(u64::from(*progress));
            }
            InstallState::Done => self.bar.finish_and_clear(),
            InstallState::Failed { .. } => {
                self.bar.abandon_with_message(format!("Installing {} CLI failed", self.tool_name));
            }
        }
    }
}
