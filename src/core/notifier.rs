//! Outcome reporting towards the host UI.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::errors::{RemoteError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Remote,
    Warning,
    Success,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeKind::Validation => "validation",
            NoticeKind::Remote => "remote",
            NoticeKind::Warning => "warning",
            NoticeKind::Success => "success",
        };
        f.write_str(label)
    }
}

/// Host-supplied callback receiving `(kind, message)` pairs. The core never
/// renders anything itself.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);

    fn validation(&self, err: &ValidationError) {
        self.notify(NoticeKind::Validation, &err.message);
    }

    fn remote(&self, err: &RemoteError) {
        self.notify(NoticeKind::Remote, &err.to_string());
    }
}

/// Default notifier: forwards every notice to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => tracing::info!(%kind, "{message}"),
            NoticeKind::Validation => tracing::debug!(%kind, "{message}"),
            NoticeKind::Remote | NoticeKind::Warning => tracing::warn!(%kind, "{message}"),
        }
    }
}

/// Keeps every notice in memory. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<(NoticeKind, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Removes and returns the recorded notices.
    pub fn drain(&self) -> Vec<(NoticeKind, String)> {
        self.notices
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push((kind, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationKind;

    #[test]
    fn recording_notifier_shares_log_between_clones() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        handle.validation(&ValidationError::new(ValidationKind::LimitReached, "full"));
        handle.notify(NoticeKind::Success, "done");

        assert_eq!(notifier.count(NoticeKind::Validation), 1);
        assert_eq!(notifier.drain().len(), 2);
        assert!(notifier.notices().is_empty());
    }
}
