use livewatch_common::i18n::tr;
use livewatch_common::types::{AlertLevel, AlertMessage};
use serde::{Deserialize, Serialize};

/// Auto-dismiss delay for warning toasts.
pub const WARNING_DURATION_MS: u64 = 5000;
/// Auto-dismiss delay for info toasts.
pub const INFO_DURATION_MS: u64 = 3000;

/// A user-facing message with a level and an optional auto-dismiss delay.
///
/// `duration_ms == None` means the notification persists until dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: AlertLevel,
    pub content: String,
    pub duration_ms: Option<u64>,
}

impl Notification {
    /// Builds a notification with the duration policy for `level`.
    pub fn new(level: AlertLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
            duration_ms: duration_for(level),
        }
    }

    /// Prefixes `message` with the localized label for `level`.
    ///
    /// ```
    /// use livewatch_common::types::AlertLevel;
    /// use livewatch_notify::Notification;
    ///
    /// let n = Notification::for_level(AlertLevel::Error, "conversion collapsed", "en-US");
    /// assert_eq!(n.content, "Alert: conversion collapsed");
    /// assert_eq!(n.duration_ms, None);
    /// ```
    pub fn for_level(level: AlertLevel, message: &str, locale: &str) -> Self {
        Self::new(level, format!("{}{}", prefix(level, locale), message))
    }

    pub fn for_alert(alert: &AlertMessage, locale: &str) -> Self {
        Self::for_level(alert.level, &alert.message, locale)
    }

    /// The toast shown when a refresh or tick fails.
    pub fn fetch_failure(locale: &str) -> Self {
        Self::new(AlertLevel::Error, tr(locale, "feed.fetch_failed"))
    }

    pub fn is_persistent(&self) -> bool {
        self.duration_ms.is_none()
    }
}

pub fn duration_for(level: AlertLevel) -> Option<u64> {
    match level {
        AlertLevel::Error => None,
        AlertLevel::Warning => Some(WARNING_DURATION_MS),
        AlertLevel::Info => Some(INFO_DURATION_MS),
    }
}

fn prefix(level: AlertLevel, locale: &str) -> &'static str {
    match level {
        AlertLevel::Error => tr(locale, "notify.prefix.error"),
        AlertLevel::Warning => tr(locale, "notify.prefix.warning"),
        AlertLevel::Info => tr(locale, "notify.prefix.info"),
    }
}
