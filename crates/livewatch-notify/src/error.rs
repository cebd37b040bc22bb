/// Errors that can occur while delivering notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// An HTTP request to an external endpoint failed.
    #[error("Notify: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serializing the payload failed.
    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint answered with a non-success status.
    #[error("Notify: {service} returned status={status}, body={body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    /// Invalid channel configuration and other local failures.
    #[error("Notify: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
