/// Errors raised while building alert rules from configuration.
///
/// # Examples
///
/// ```rust
/// use livewatch_alert::error::AlertError;
///
/// let err = AlertError::InvalidOperator("between".to_string());
/// assert!(err.to_string().contains("between"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// The comparison operator is not one of the supported forms.
    #[error("Alert: invalid operator '{0}'")]
    InvalidOperator(String),

    /// The level is not `info`, `warning` or `error`.
    #[error("Alert: invalid level '{0}'")]
    InvalidLevel(String),

    /// The rule has no metric key.
    #[error("Alert: rule metric must not be empty")]
    EmptyMetric,
}

pub type Result<T> = std::result::Result<T, AlertError>;
