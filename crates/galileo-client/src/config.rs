//! Configuration for the backend client.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

/// Origin of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default timeout for a complete request/response exchange: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for establishing a connection: 10 seconds.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`ApiClient`](crate::ApiClient).
///
/// The base URL is always explicit configuration; nothing in the client
/// reaches for a compiled-in origin other than [`Default`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the URL cannot be parsed or
    /// is not an `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::InvalidConfig(format!("invalid base URL `{base_url}`: {err}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "unsupported URL scheme `{}`",
                base_url.scheme()
            )));
        }

        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: Self::default_user_agent(),
        })
    }

    /// Sets the per-request timeout. Event streams are exempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the backend origin.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Resolves an absolute endpoint path against the base URL.
    ///
    /// Any path prefix on the base URL is preserved, so a backend mounted at
    /// `http://host/api` resolves `/datasources/` to `http://host/api/datasources/`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    fn default_user_agent() -> String {
        format!("galileo-client/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("default base URL is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ClientConfig::new("http://localhost:8000").unwrap();
        assert_eq!(
            config.endpoint("/datasources/").unwrap().as_str(),
            "http://localhost:8000/datasources/"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let config = ClientConfig::new("http://example.com/api/").unwrap();
        assert_eq!(
            config.endpoint("/trainings/t1/execute/").unwrap().as_str(),
            "http://example.com/api/trainings/t1/execute/"
        );
    }

    #[test]
    fn test_rejects_invalid_base_urls() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ClientError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert!(config.user_agent().starts_with("galileo-client/"));
    }
}
