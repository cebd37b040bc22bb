use crate::routing::ChannelRoute;
use crate::{Notification, NotificationChannel};
use livewatch_common::types::AlertMessage;
use std::sync::Arc;

pub struct NotificationManager {
    channels: Vec<Arc<dyn NotificationChannel>>,
    routes: Vec<ChannelRoute>,
}

impl NotificationManager {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>, routes: Vec<ChannelRoute>) -> Self {
        Self { channels, routes }
    }

    /// Sends `notification` to every route whose minimum level it meets.
    /// Channel failures are logged and do not stop other routes. Returns the
    /// number of successful deliveries.
    pub async fn notify(&self, notification: &Notification) -> usize {
        let mut delivered = 0;
        for route in &self.routes {
            if !route.should_send(notification.level) {
                continue;
            }

            let Some(channel) = self.channels.get(route.channel_index) else {
                tracing::warn!(index = route.channel_index, "Route points at a missing channel");
                continue;
            };

            match channel.send(notification).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(
                        channel = channel.channel_name(),
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }
        delivered
    }

    pub async fn notify_alert(&self, alert: &AlertMessage, locale: &str) -> usize {
        tracing::debug!(
            alert_id = %alert.id,
            metric = %alert.rule.metric,
            level = %alert.level,
            value = alert.current_value,
            "Notifying alert"
        );
        self.notify(&Notification::for_alert(alert, locale)).await
    }

    pub async fn notify_fetch_failure(&self, locale: &str) -> usize {
        self.notify(&Notification::fetch_failure(locale)).await
    }

    pub fn channels(&self) -> &[Arc<dyn NotificationChannel>] {
        &self.channels
    }
}
