//! Toast and webhook notifications for alerts and feed failures.
//!
//! A [`Notification`] is routed by level to one or more
//! [`NotificationChannel`] implementations. The built-in channels are the
//! in-memory [`channels::toast::ToastBoard`] read by the UI and an optional
//! JSON webhook.

pub mod channels;
pub mod error;
pub mod manager;
pub mod notification;
pub mod routing;


use async_trait::async_trait;

pub use error::NotifyError;
pub use manager::NotificationManager;
pub use notification::Notification;

/// A delivery target for notifications.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails. Nothing is retried.
    async fn send(&self, notification: &Notification) -> error::Result<()>;

    /// Returns the channel type name (e.g., `"toast"`, `"webhook"`).
    fn channel_name(&self) -> &str;
}
