use crate::error::Result;
use crate::{Notification, NotificationChannel};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use livewatch_common::types::AlertLevel;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use utoipa::ToSchema;

pub const DEFAULT_TOAST_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Toast {
    pub id: String,
    pub level: AlertLevel,
    pub content: String,
    /// `None` keeps the toast until it is dismissed
    pub duration_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.duration_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .map(|ms| self.created_at + Duration::milliseconds(ms))
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(true, |at| now < at)
    }
}

/// In-memory toast list, newest first, capped at `capacity`.
pub struct ToastBoard {
    toasts: Mutex<VecDeque<Toast>>,
    capacity: usize,
}

impl ToastBoard {
    pub fn new(capacity: usize) -> Self {
        Self {
            toasts: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, notification: &Notification) -> Toast {
        self.push_at(notification, Utc::now())
    }

    pub fn push_at(&self, notification: &Notification, now: DateTime<Utc>) -> Toast {
        let toast = Toast {
            id: livewatch_common::id::next_id(),
            level: notification.level,
            content: notification.content.clone(),
            duration_ms: notification.duration_ms,
            created_at: now,
        };
        let mut toasts = self.lock();
        toasts.push_front(toast.clone());
        toasts.truncate(self.capacity);
        toast
    }

    /// Toasts still visible at `now`, newest first. Expired auto-dismiss
    /// toasts are dropped from the board.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Toast> {
        let mut toasts = self.lock();
        toasts.retain(|t| t.is_active(now));
        toasts.iter().cloned().collect()
    }

    /// Returns whether a toast with `id` was removed.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        before != toasts.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_CAPACITY)
    }
}

#[async_trait]
impl NotificationChannel for ToastBoard {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let toast = self.push(notification);
        tracing::debug!(id = %toast.id, level = %toast.level, "Toast posted");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "toast"
    }
}
