//! Nanostore REST client
//!
//! Every endpoint the dashboard reads is a `GET` that answers with the
//! standard records envelope. Requests carry the operator's bearer token;
//! when no token is stored the request is never sent and
//! [`ClientError::MissingToken`] is returned instead.

pub mod cameramanager;
pub mod error;
pub mod nanostore;
#[cfg(not(target_arch = "wasm32"))]
pub mod poller;
pub mod pubsub;
pub mod report;
pub mod robotmanager;
pub mod summary;
pub mod token;

pub use error::ClientError;
pub use summary::DashboardSummary;
pub use token::{StaticToken, TokenSource};

use nanostore_core::DashboardConfig;
use nanostore_core::types::{Records, is_no_records_message};
use reqwest::{Client, ClientBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("nanostore-client/", env!("CARGO_PKG_VERSION"));

/// Query parameters; pairs with an empty value are not sent
pub type Query<'a> = [(&'a str, String)];

/// Body of a response, or the 404 the services send for an empty match
#[derive(Debug)]
pub enum Envelope<T> {
    Records(Records<T>),
    NotFound {
        message: String,
        /// The body was `{"message": "no records found"}`
        no_records: bool,
    },
}

/// Client for the robot manager, nanostore, pub/sub and camera manager
/// services
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl DashboardClient {
    /// Create a new client builder
    pub fn builder() -> DashboardClientBuilder {
        DashboardClientBuilder::default()
    }

    /// Client for the configured origin
    pub fn from_config(
        config: &DashboardConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        Self::builder()
            .base_url(config.api_origin.clone())
            .timeout(config.request_timeout)
            .token_source(tokens)
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an authenticated `GET` request
    pub fn request(&self, path: &str, query: &Query<'_>) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.tokens.token().ok_or(ClientError::MissingToken)?;
        let url = format!("{}{}", self.base_url, path);
        let query: Vec<(&str, &str)> = query
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (*key, value.as_str()))
            .collect();

        Ok(self
            .client
            .get(url)
            .query(&query)
            .header(header::AUTHORIZATION, token)
            .header(header::CONTENT_TYPE, "application/json"))
    }

    /// Send a request, keeping 404 responses apart from other failures
    pub async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<Envelope<T>, ClientError> {
        let request = self.request(path, query)?;
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(Envelope::Records(serde_json::from_str(&body)?));
        }

        let message = error_message(&body, status);
        if status == StatusCode::NOT_FOUND {
            let no_records = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| value.get("message").map(is_no_records_message))
                .unwrap_or(false);
            tracing::debug!(path, no_records, "endpoint answered 404");
            return Ok(Envelope::NotFound {
                message,
                no_records,
            });
        }

        tracing::error!(path, status = status.as_u16(), %message, "request failed");
        Err(ClientError::from_status(status, message))
    }

    /// Fetch records; a "no records found" 404 is an empty result
    pub async fn get_records<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<Records<T>, ClientError> {
        match self.fetch_envelope(path, query).await? {
            Envelope::Records(records) => Ok(records),
            Envelope::NotFound {
                no_records: true,
                message,
            } => Ok(Records {
                message: Some(serde_json::Value::String(message)),
                ..Records::empty()
            }),
            Envelope::NotFound { message, .. } => Err(ClientError::NotFound(message)),
        }
    }
}

/// `message` from a JSON error body, or the body itself
fn error_message(body: &str, status: StatusCode) -> String {
    if body.trim().is_empty() {
        return status.to_string();
    }
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Builder for [`DashboardClient`]
#[derive(Default)]
pub struct DashboardClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl DashboardClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (ignored on wasm)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Where tokens are read from on every request
    pub fn token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Use a fixed token
    pub fn token(self, token: impl AsRef<str>) -> Self {
        self.token_source(Arc::new(StaticToken::new(token.as_ref())))
    }

    /// Build the client
    pub fn build(self) -> Result<DashboardClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = self.timeout;

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        );

        let client = client_builder.build()?;
        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(StaticToken::none()));

        Ok(DashboardClient {
            client,
            base_url,
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = DashboardClient::builder()
            .base_url("https://amsstores1.leapmile.com/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://amsstores1.leapmile.com");
    }

    #[test]
    fn test_request_without_token_fails_fast() {
        let client = DashboardClient::builder()
            .base_url("http://localhost:9")
            .build()
            .unwrap();
        assert!(matches!(
            client.request("/robotmanager/robots", &[]),
            Err(ClientError::MissingToken)
        ));
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"bad tray"}"#, StatusCode::BAD_REQUEST),
            "bad tray"
        );
        assert_eq!(error_message("oops", StatusCode::BAD_REQUEST), "oops");
        assert_eq!(
            error_message("", StatusCode::BAD_GATEWAY),
            StatusCode::BAD_GATEWAY.to_string()
        );
    }
}
