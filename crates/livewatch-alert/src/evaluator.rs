use chrono::{DateTime, Utc};
use livewatch_common::types::{find_metric, AlertLevel, AlertMessage, AlertRule, MetricSnapshot};
use std::collections::VecDeque;

pub const DEFAULT_MAX_ALERTS: usize = 50;

/// Applies a fixed rule set to metric snapshots and owns the alert list.
///
/// The list is newest-first and never longer than `max_alerts`; overflow is
/// dropped from the tail.
pub struct AlertEvaluator {
    rules: Vec<AlertRule>,
    alerts: VecDeque<AlertMessage>,
    max_alerts: usize,
}

impl AlertEvaluator {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self::with_capacity(rules, DEFAULT_MAX_ALERTS)
    }

    pub fn with_capacity(rules: Vec<AlertRule>, max_alerts: usize) -> Self {
        let max_alerts = max_alerts.max(1);
        Self {
            rules,
            alerts: VecDeque::with_capacity(max_alerts),
            max_alerts,
        }
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    pub fn max_alerts(&self) -> usize {
        self.max_alerts
    }

    /// Match every rule against `metrics` without touching the alert list.
    pub fn evaluate(&self, metrics: &[MetricSnapshot]) -> Vec<AlertMessage> {
        self.evaluate_at(metrics, Utc::now())
    }

    pub fn evaluate_at(&self, metrics: &[MetricSnapshot], now: DateTime<Utc>) -> Vec<AlertMessage> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let current_value = matching_value(rule, metrics)?;
                Some(AlertMessage {
                    id: livewatch_common::id::next_id(),
                    rule: rule.clone(),
                    current_value,
                    message: rule.message.clone(),
                    level: rule.level,
                    timestamp: now,
                    read: false,
                })
            })
            .collect()
    }

    /// Evaluate, record the new alerts at the head of the list, and return
    /// them.
    pub fn check(&mut self, metrics: &[MetricSnapshot]) -> Vec<AlertMessage> {
        let new_alerts = self.evaluate(metrics);
        self.record(&new_alerts);
        new_alerts
    }

    fn record(&mut self, new_alerts: &[AlertMessage]) {
        for alert in new_alerts.iter().rev() {
            self.alerts.push_front(alert.clone());
        }
        if self.alerts.len() > self.max_alerts {
            tracing::debug!(
                dropped = self.alerts.len() - self.max_alerts,
                "Alert list over capacity, dropping oldest"
            );
            self.alerts.truncate(self.max_alerts);
        }
        for alert in new_alerts {
            tracing::info!(
                alert_id = %alert.id,
                metric = %alert.rule.metric,
                level = %alert.level,
                value = alert.current_value,
                threshold = alert.rule.threshold,
                "Alert raised"
            );
        }
    }

    /// Newest first.
    pub fn alerts(&self) -> &VecDeque<AlertMessage> {
        &self.alerts
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.read).count()
    }

    pub fn has_unread(&self) -> bool {
        self.alerts.iter().any(|a| !a.read)
    }

    /// Mark an alert read. Unknown ids are ignored. Returns whether the id
    /// was present.
    pub fn mark_read(&mut self, alert_id: &str) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == alert_id) {
            Some(alert) => {
                alert.read = true;
                true
            }
            None => {
                tracing::debug!(alert_id, "mark_read: alert not found, ignoring");
                false
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.alerts.clear();
    }

    /// Drop alerts already marked read; returns how many were removed.
    pub fn clear_read(&mut self) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|a| !a.read);
        before - self.alerts.len()
    }

    /// Alerts at `level` or above among the given batch.
    pub fn notable(alerts: &[AlertMessage], min_level: AlertLevel) -> impl Iterator<Item = &AlertMessage> {
        alerts.iter().filter(move |a| a.level >= min_level)
    }
}

/// The observed value when `rule` matches, `None` when the metric is absent,
/// not numeric, or the comparison fails.
fn matching_value(rule: &AlertRule, metrics: &[MetricSnapshot]) -> Option<f64> {
    let metric = find_metric(metrics, &rule.metric)?;
    let value = metric.value.as_number()?;
    rule.operator.check(value, rule.threshold).then_some(value)
}
