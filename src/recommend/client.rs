//! HTTP client for the recommendation backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ConfigError, RequestError};

use super::model::{
    HealthStatus, Recommendation, RecommendationRequest, RecommendationResponse, Transaction,
};

/// Boundary to the external recommendation service.
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    /// Base address requests are sent to.
    fn base_url(&self) -> &str;

    /// Liveness check. Never fails: any problem reads as disconnected.
    async fn probe_health(&self) -> HealthStatus;

    /// Ask for the best card for a spending profile.
    async fn request_recommendation(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendation, RequestError>;

    /// Ask which card to use for a single purchase.
    async fn request_transaction_advice(
        &self,
        transaction: &Transaction,
    ) -> Result<Recommendation, RequestError>;
}

/// reqwest-backed [`RecommendationClient`].
pub struct HttpRecommendationClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecommendationClient {
    /// Create a client for `base_url`. A `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_for_recommendation<B>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Recommendation, RequestError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(path);
        debug!(%url, "Requesting recommendation");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Recommendation request rejected");
            let message = if text.trim().is_empty() {
                format!("Request failed: {}", status.as_u16())
            } else {
                text
            };
            return Err(RequestError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: RecommendationResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(%url, body = %text, "Unexpected recommendation response");
            RequestError::InvalidResponse(format!(
                "Unexpected response from recommendation service: {e}"
            ))
        })?;

        Ok(parsed.into())
    }
}

#[async_trait]
impl RecommendationClient for HttpRecommendationClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn probe_health(&self) -> HealthStatus {
        let url = self.url("health");
        let connected = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                resp.json::<serde_json::Value>().await.is_ok()
            }
            Ok(resp) => {
                debug!(%url, status = resp.status().as_u16(), "Health probe failed");
                false
            }
            Err(e) => {
                debug!(%url, error = %e, "Health probe unreachable");
                false
            }
        };
        HealthStatus { connected }
    }

    async fn request_recommendation(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendation, RequestError> {
        self.post_for_recommendation("recommend/card", request).await
    }

    async fn request_transaction_advice(
        &self,
        transaction: &Transaction,
    ) -> Result<Recommendation, RequestError> {
        self.post_for_recommendation("recommend/transaction", transaction)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = HttpRecommendationClient::new("http://127.0.0.1:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.url("/health"), "http://127.0.0.1:8000/health");
        assert_eq!(
            client.url("recommend/card"),
            "http://127.0.0.1:8000/recommend/card"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_reads_as_disconnected() {
        // Port 9 (discard) is not served in test environments.
        let client =
            HttpRecommendationClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2)))
                .unwrap();
        assert!(!client.probe_health().await.connected);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let client =
            HttpRecommendationClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2)))
                .unwrap();
        let req = RecommendationRequest {
            is_student: true,
            primary_spend: "Dining".to_string(),
            priority: "cashback".to_string(),
        };
        let err = client.request_recommendation(&req).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
        assert!(!err.user_message().is_empty());
    }
}
