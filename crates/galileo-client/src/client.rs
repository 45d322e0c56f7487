//! Core HTTP plumbing shared by every endpoint method.

use std::sync::Arc;

use bytes::Bytes;
use log::{debug, trace};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Async client for the Galileo backend.
///
/// Holds a pooled [`reqwest::Client`] and shared configuration, so clones are
/// cheap and share connections. Endpoint methods live in the per-area modules
/// (`datasources`, `preprocesses`, `trainings`, `deployments`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Creates a client for the backend described by `config`.
    ///
    /// No request is made; an unreachable backend surfaces on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        debug!(
            base_url = config.base_url().as_str(),
            timeout_ms = config.timeout().as_millis() as u64;
            "Creating API client"
        );

        // The total timeout is applied per request so event streams can stay open.
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts a request with the configured total timeout.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.streaming_request(method, path)?.timeout(self.config.timeout()))
    }

    /// Starts a request without a total timeout, for long-lived responses.
    pub(crate) fn streaming_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.config.endpoint(path)?;
        trace!(method = method.as_str(), url = url.as_str(); "Preparing request");
        Ok(self.http.request(method, url))
    }

    /// Sends a request and turns non-2xx responses into [`ClientError::Status`].
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = response.url().as_str(); "Received response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status, &body))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        decode(response, &format!("GET {path}")).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let context = format!("{method} {path}");
        let response = self.send(self.request(method, path)?.json(body)).await?;
        decode(response, &context).await
    }

    /// Sends a bodyless request and decodes the JSON answer.
    pub(crate) async fn call_json<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T> {
        let context = format!("{method} {path}");
        let response = self.send(self.request(method, path)?).await?;
        decode(response, &context).await
    }

    pub(crate) async fn get_bytes(&self, path: &str, query: &[(&str, String)]) -> Result<Bytes> {
        let response = self.send(self.request(Method::GET, path)?.query(query)).await?;
        Ok(response.bytes().await?)
    }
}

/// Reads a response body and deserializes it, naming the endpoint on failure.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
        context: context.to_string(),
        source,
    })
}
