//! User-facing notifications.
//!
//! Sync failures never abort an item save; they are reported through a
//! [`Notifier`] instead (a toast in an editor UI, a log line elsewhere).

use std::fmt;
use tracing::{error, info, warn};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// Side channel for messages meant for the author.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, message: &str);
}

/// Notifier that writes to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info | NotifyLevel::Success => info!(%level, "{message}"),
            NotifyLevel::Warning => warn!(%level, "{message}"),
            NotifyLevel::Danger => error!(%level, "{message}"),
        }
    }
}
