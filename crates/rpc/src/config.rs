//! Configuration for the fee currency price oracle client.

use crate::eth::fees::RpcFeeCurrencyOracle;
use core::time::Duration;
use jsonrpsee::{
    core::ClientError,
    http_client::{HttpClient, HttpClientBuilder},
};
use serde::{Deserialize, Serialize};

/// Default Celo mainnet RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://forno.celo.org";

/// Settings for the price oracle HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeeOracleConfig {
    /// JSON-RPC endpoint of a Celo node.
    pub url: String,

    /// Timeout of a single price query.
    ///
    /// There are no retries, so a slow node fails the estimation once this
    /// elapses.
    pub request_timeout: Duration,

    /// Maximum size in bytes of a response body.
    pub max_response_size: u32,
}

impl Default for FeeOracleConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            // prices are single quantities
            max_response_size: 1024 * 1024,
        }
    }
}

impl FeeOracleConfig {
    /// Creates a new [`FeeOracleConfig`] for `url` with default limits.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    /// Sets the request timeout.
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the maximum response size.
    pub const fn with_max_response_size(mut self, max_response_size: u32) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    /// Builds the HTTP client. Does not connect.
    pub fn build_client(&self) -> Result<HttpClient, ClientError> {
        HttpClientBuilder::default()
            .request_timeout(self.request_timeout)
            .max_response_size(self.max_response_size)
            .build(&self.url)
    }

    /// Builds a [`RpcFeeCurrencyOracle`] over an HTTP client.
    pub fn build_oracle(&self) -> Result<RpcFeeCurrencyOracle<HttpClient>, ClientError> {
        self.build_client().map(RpcFeeCurrencyOracle::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = FeeOracleConfig::default();
        assert_eq!(config.url, DEFAULT_RPC_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_response_size, 1024 * 1024);
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = FeeOracleConfig::new("http://localhost:8545")
            .with_request_timeout(Duration::from_millis(500))
            .with_max_response_size(4096);

        assert_eq!(config.url, "http://localhost:8545");
        assert_eq!(config.request_timeout, Duration::from_millis(500));
        assert_eq!(config.max_response_size, 4096);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: FeeOracleConfig =
            serde_json::from_str(r#"{"url":"http://127.0.0.1:8545"}"#).unwrap();
        assert_eq!(config, FeeOracleConfig::new("http://127.0.0.1:8545"));
    }

    #[tokio::test]
    async fn test_build_oracle() {
        let oracle = FeeOracleConfig::new("http://127.0.0.1:8545").build_oracle();
        assert!(oracle.is_ok());

        assert!(FeeOracleConfig::new("not a url").build_client().is_err());
    }
}
