//! OpenAI client configuration and credential handling.

use crate::error::{Result, SubragError};
use async_openai::{config::OpenAIConfig, Client};
use std::fmt;
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// An OpenAI API key.
///
/// `Debug` and `Display` never print the key, so it is safe to pass through
/// `tracing` fields and error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting empty or whitespace-only input.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Read the key from `OPENAI_API_KEY`, if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("OPENAI_API_KEY").ok().and_then(Self::new)
    }

    /// Expose the raw key. Only the client constructor should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Create an OpenAI client for the given key with the default timeout.
pub fn create_client(api_key: &ApiKey) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: &ApiKey,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SubragError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new().with_api_key(api_key.expose());
    Ok(Client::with_config(config).with_http_client(http_client))
}
