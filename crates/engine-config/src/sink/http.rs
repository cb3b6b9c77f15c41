use crate::{error::SinkError, report::ValidationReport, sink::MetricsSink};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// POSTs the full report to a callback URL, retrying with exponential
/// backoff until the endpoint answers with a success status.
#[derive(Debug, Clone)]
pub struct HttpCallbackSink {
    client: reqwest::Client,
    url: String,
    auth_token: Option<String>,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl HttpCallbackSink {
    pub fn new(url: impl Into<String>, auth_token: Option<String>) -> Self {
        HttpCallbackSink {
            client: reqwest::Client::new(),
            url: url.into(),
            auth_token,
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
        }
    }

    pub fn with_retries(mut self, max_attempts: u32, initial_backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.initial_backoff = initial_backoff;
        self
    }
}

#[async_trait]
impl MetricsSink for HttpCallbackSink {
    async fn publish(&self, report: &ValidationReport) -> Result<(), SinkError> {
        let mut backoff = self.initial_backoff;
        let mut last_failure = None;

        for attempt in 1..=self.max_attempts {
            let mut request = self.client.post(&self.url).json(report);
            if let Some(token) = &self.auth_token {
                request = request.bearer_auth(token);
            }

            last_failure = match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!(url = %self.url, attempt, "Report delivered");
                    return Ok(());
                }
                Ok(resp) => {
                    warn!(attempt, status = %resp.status(), "Report callback rejected");
                    Some(SinkError::Rejected {
                        attempts: self.max_attempts,
                        status: resp.status().as_u16(),
                    })
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Report callback failed");
                    Some(SinkError::Http(err))
                }
            };

            if attempt < self.max_attempts {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }

        Err(last_failure.unwrap_or(SinkError::Rejected {
            attempts: self.max_attempts,
            status: 0,
        }))
    }
}
