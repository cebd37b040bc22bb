/// Errors produced while fetching metric frames.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The source failed for a reason of its own.
    #[error("Feed: source error: {0}")]
    Source(String),

    /// Transport or decoding failure talking to a remote source.
    #[error("Feed: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote envelope carried a non-zero code.
    #[error("Feed: remote returned code={code}: {message}")]
    Envelope { code: i32, message: String },

    /// The remote envelope reported success but carried no data.
    #[error("Feed: remote response has no data")]
    EmptyEnvelope,
}

pub type Result<T> = std::result::Result<T, FeedError>;
