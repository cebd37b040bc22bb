use crate::error::{FeedError, Result};
use crate::{FeedFrame, MetricSource};
use async_trait::async_trait;
use livewatch_common::types::{Envelope, FetchFilters};
use std::time::Duration;

pub const METRICS_PATH: &str = "/api/live-commerce/metrics";

/// Pulls frames from a remote `{ code, data, message }` endpoint.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, METRICS_PATH)
    }
}

#[async_trait]
impl MetricSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, filters: Option<&FetchFilters>) -> Result<FeedFrame> {
        let mut request = self.client.get(self.endpoint());
        if let Some(filters) = filters {
            request = request.query(&filters.query_pairs());
        }

        let envelope: Envelope<FeedFrame> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_envelope(envelope)
    }
}

pub(crate) fn unwrap_envelope(envelope: Envelope<FeedFrame>) -> Result<FeedFrame> {
    if envelope.code != 0 {
        return Err(FeedError::Envelope {
            code: envelope.code,
            message: envelope.message,
        });
    }
    envelope.data.ok_or(FeedError::EmptyEnvelope)
}
