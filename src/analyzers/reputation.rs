//! Reputation lookup against the remote skill registry.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::data::ReputationTier;
use crate::error::AnalyzerError;

/// Source of trust tiers for skill names.
pub trait ReputationSource: Send + Sync {
    /// Looks up the trust tier of a skill by name.
    fn lookup<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ReputationTier>> + Send + 'a>>;
}

/// Reputation service response body.
#[derive(Deserialize, Debug)]
struct ReputationResponse {
    status: String,
}

/// HTTP client for the reputation service.
pub struct HttpReputationClient {
    /// HTTP client for API requests.
    client: Client,
    /// Base URL; the encoded skill name is appended as the last path segment.
    endpoint: String,
    /// Request time budget.
    timeout: Duration,
}

impl HttpReputationClient {
    /// Creates a client for the given base URL.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Builds the lookup URL for a skill name.
    pub(crate) fn lookup_url(&self, name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            AnalyzerError::InvalidResponseFormat(format!(
                "invalid reputation endpoint '{}': {e}",
                self.endpoint
            ))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                AnalyzerError::InvalidResponseFormat(format!(
                    "reputation endpoint cannot be a base: {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .push(name);

        Ok(url)
    }
}

impl ReputationSource for HttpReputationClient {
    fn lookup<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ReputationTier>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.lookup_url(name)?;

            info!(url = %url, skill = %name, "Sending reputation lookup");

            let response = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        AnalyzerError::Timeout {
                            operation: "reputation lookup",
                            timeout: self.timeout,
                        }
                    } else {
                        AnalyzerError::NetworkError(e.to_string())
                    }
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_else(|e| {
                    debug!("Failed to read error response body: {e}");
                    String::new()
                });
                return Err(AnalyzerError::ReputationRequestFailed(format!(
                    "HTTP {status}: {error_text}"
                ))
                .into());
            }

            let body: ReputationResponse = response
                .json()
                .await
                .map_err(|e| AnalyzerError::InvalidResponseFormat(e.to_string()))?;

            let tier = ReputationTier::from_status(&body.status);
            debug!(skill = %name, status = %body.status, tier = %tier, "Reputation lookup complete");

            Ok(tier)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpReputationClient {
        HttpReputationClient::new(
            format!("{}/api/reputation", server.uri()),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn lookup_url_encodes_name() {
        let client = HttpReputationClient::new("https://example.com/api/rep/", Duration::from_secs(1));
        let url = client.lookup_url("my skill/v2").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/rep/my%20skill%2Fv2");
    }

    #[test]
    fn lookup_url_without_trailing_slash() {
        let client = HttpReputationClient::new("https://example.com/api/rep", Duration::from_secs(1));
        let url = client.lookup_url("weather").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/rep/weather");
    }

    #[test]
    fn lookup_url_rejects_invalid_endpoint() {
        let client = HttpReputationClient::new("not a url", Duration::from_secs(1));
        assert!(client.lookup_url("weather").is_err());
    }

    #[tokio::test]
    async fn benign_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reputation/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "benign"
            })))
            .mount(&server)
            .await;

        let tier = client_for(&server).lookup("weather").await.unwrap();
        assert_eq!(tier, ReputationTier::Benign);
    }

    #[tokio::test]
    async fn malicious_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reputation/stealer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "MALICIOUS",
                "reason": "exfiltrates credentials"
            })))
            .mount(&server)
            .await;

        let tier = client_for(&server).lookup("stealer").await.unwrap();
        assert_eq!(tier, ReputationTier::Malicious);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("weather").await.unwrap_err();
        assert!(err.to_string().contains("503"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("weather").await.unwrap_err();
        assert!(err.to_string().contains("Invalid response format"));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "benign" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = HttpReputationClient::new(
            format!("{}/api/reputation", server.uri()),
            Duration::from_millis(100),
        );
        let err = client.lookup("weather").await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "unexpected error: {err}");
    }
}
