//! Notifiers and error presenters

use crate::installation::traits::{ErrorPresenter, Notification, Notifier};

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        log::info!("{}: {}", notification.title, notification.body);
    }
}

/// Prints notifications to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        println!("{}", notification.title);
        println!("{}", notification.body);
    }
}

/// Writes errors to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorPresenter;

impl ErrorPresenter for LogErrorPresenter {
    fn show(&self, message: &str, trace: Option<&dyn std::error::Error>) {
        match trace {
            Some(trace) => log::error!("{} ({})", message, trace),
            None => log::error!("{}", message),
        }
    }
}

/// Prints errors to stderr, the underlying cause on its own line
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleErrorPresenter;

impl ConsoleErrorPresenter {
    pub fn render(message: &str, trace: Option<&dyn std::error::Error>) -> String {
        match trace {
            Some(trace) => format!("Error: {}\n\nCaused by: {}", message, trace),
            None => format!("Error: {}", message),
        }
    }
}

impl ErrorPresenter for ConsoleErrorPresenter {
    fn show(&self, message: &str, trace: Option<&dyn std::error::Error>) {
        eprintln!("{}", Self::render(message, trace));
    }
}
