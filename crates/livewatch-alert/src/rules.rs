use crate::error::{AlertError, Result};
use livewatch_common::i18n::tr;
use livewatch_common::types::{metric_keys, AlertLevel, AlertRule, CompareOp};
use serde::{Deserialize, Serialize};

/// Rule as written in configuration. Operator and level stay textual until
/// [`RuleConfig::build`] validates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub metric: String,
    pub operator: String,
    pub threshold: f64,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub message: String,
}

fn default_level() -> String {
    "warning".to_string()
}

impl RuleConfig {
    pub fn build(&self) -> Result<AlertRule> {
        if self.metric.trim().is_empty() {
            return Err(AlertError::EmptyMetric);
        }
        let operator: CompareOp = self
            .operator
            .parse()
            .map_err(|_| AlertError::InvalidOperator(self.operator.clone()))?;
        let level: AlertLevel = self
            .level
            .parse()
            .map_err(|_| AlertError::InvalidLevel(self.level.clone()))?;
        let message = if self.message.is_empty() {
            format!("{} {} {}", self.metric, operator, self.threshold)
        } else {
            self.message.clone()
        };
        Ok(AlertRule {
            metric: self.metric.clone(),
            operator,
            threshold: self.threshold,
            level,
            message,
        })
    }
}

/// Build every configured rule, failing on the first invalid one.
pub fn build_rules(configs: &[RuleConfig]) -> Result<Vec<AlertRule>> {
    configs.iter().map(RuleConfig::build).collect()
}

/// The stock live-commerce rule set.
pub fn default_rules(locale: &str) -> Vec<AlertRule> {
    let rule = |metric: &str, threshold: f64, level: AlertLevel, message_key: &str| AlertRule {
        metric: metric.to_string(),
        operator: CompareOp::LessThan,
        threshold,
        level,
        message: tr(locale, message_key).to_string(),
    };

    vec![
        rule(
            metric_keys::ONLINE_USERS,
            500.0,
            AlertLevel::Warning,
            "rule.onlineUsers.low",
        ),
        rule(
            metric_keys::CONVERSION_RATE,
            2.0,
            AlertLevel::Error,
            "rule.conversionRate.low",
        ),
        rule(
            metric_keys::SALES_AMOUNT,
            100_000.0,
            AlertLevel::Warning,
            "rule.salesAmount.low",
        ),
        rule(
            metric_keys::AVG_ORDER_VALUE,
            200.0,
            AlertLevel::Info,
            "rule.avgOrderValue.low",
        ),
    ]
}
