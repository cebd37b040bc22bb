use crate::state::AppState;
use livewatch_alert::AlertEvaluator;
use livewatch_common::types::{AlertLevel, MetricSnapshot};
use livewatch_feed::FeedEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Alerts at or above this level raise a toast.
pub const NOTIFY_MIN_LEVEL: AlertLevel = AlertLevel::Warning;

/// Subscribes to the feed before returning, so no event published after
/// this call is missed.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    let events = state.feed.subscribe();
    tokio::spawn(run(state, events))
}

pub async fn run(state: AppState, mut events: broadcast::Receiver<FeedEvent>) {
    loop {
        match events.recv().await {
            Ok(FeedEvent::Snapshot(metrics)) => {
                handle_snapshot(&state, &metrics).await;
            }
            Ok(FeedEvent::FetchFailed(error)) => {
                tracing::debug!(error = %error, "Posting fetch failure toast");
                state.notifier.notify_fetch_failure(state.locale()).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Alert pipeline lagged behind the feed");
            }
            Err(RecvError::Closed) => {
                tracing::info!("Feed closed, alert pipeline exiting");
                return;
            }
        }
    }
}

/// Checks `metrics` against the rules and notifies new warning and error
/// alerts. Returns the number of new alerts.
pub async fn handle_snapshot(state: &AppState, metrics: &[MetricSnapshot]) -> usize {
    let new_alerts = state.lock_evaluator().check(metrics);

    for alert in AlertEvaluator::notable(&new_alerts, NOTIFY_MIN_LEVEL) {
        state.notifier.notify_alert(alert, state.locale()).await;
    }
    new_alerts.len()
}
