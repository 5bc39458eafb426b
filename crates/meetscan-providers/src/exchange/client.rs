//! HTTP client for EWS SOAP operations.

use base64::Engine;
use reqwest::{Response, StatusCode};
use tracing::{trace, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::ExchangeConfig;

/// HTTP client posting SOAP envelopes to the EWS endpoint.
#[derive(Debug)]
pub struct ExchangeClient {
    client: reqwest::Client,
    config: ExchangeConfig,
}

impl ExchangeClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ExchangeConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ProviderError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Posts a SOAP envelope and returns the response body.
    pub async fn post_soap(&self, body: &str) -> ProviderResult<String> {
        trace!(url = %self.config.ews_url, "sending EWS request");

        let response = self
            .client
            .post(self.config.ews_url.as_str())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header(
                "Authorization",
                basic_auth(&self.config.username, &self.config.password),
            )
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("request timeout")
                } else if e.is_connect() {
                    ProviderError::network(format!("connection failed: {}", e))
                } else {
                    ProviderError::network(format!("request failed: {}", e))
                }
            })?;

        self.handle_response(response).await
    }

    /// Maps the HTTP response status and extracts the body.
    async fn handle_response(&self, response: Response) -> ProviderResult<String> {
        let status = response.status();
        trace!(status = %status, "received EWS response");

        match status {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| ProviderError::network(format!("failed to read response: {}", e))),
            StatusCode::UNAUTHORIZED => Err(ProviderError::authentication(
                "authentication failed: invalid credentials",
            )),
            StatusCode::FORBIDDEN => Err(ProviderError::authorization("access denied to mailbox")),
            StatusCode::NOT_FOUND => Err(ProviderError::not_found("EWS endpoint not found")),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(ProviderError::rate_limited("too many requests to server"))
            }
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::server(format!(
                    "server error ({}): {}",
                    s, body
                )))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %s, "unexpected response status");
                Err(ProviderError::invalid_response(format!(
                    "unexpected status {}: {}",
                    s, body
                )))
            }
        }
    }
}

/// Builds an HTTP Basic authorization header value (RFC 7617).
fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}
