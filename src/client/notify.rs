//! Toast notifications.

use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    Success(String),
    Error(String),
}

impl Toast {
    pub fn message(&self) -> &str {
        match self {
            Toast::Success(m) | Toast::Error(m) => m,
        }
    }
}

/// Sink for user-visible notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notify(Toast::Error(message.to_string()));
    }
}

/// Writes notifications to the log
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast {
            Toast::Success(message) => info!(toast = "success", "{}", message),
            Toast::Error(message) => warn!(toast = "error", "{}", message),
        }
    }
}

/// Keeps every notification, for headless front ends and tests
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.toasts()
            .into_iter()
            .filter_map(|t| match t {
                Toast::Error(m) => Some(m),
                Toast::Success(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}
