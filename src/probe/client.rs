//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic for transient failures (max 3 retries)
//! - HEAD-based existence checks

use crate::error::ProbeError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("autobump/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ProbeError::network("HTTP client", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Check whether a resource exists with a HEAD request.
    ///
    /// 2xx means present, 404/410 absent. Rate limiting, server errors and
    /// connection failures are retried; anything else is an error.
    pub async fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.client.head(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(url, %status, attempt, "HEAD probe");

                    if status.is_success() {
                        return Ok(true);
                    }
                    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
                        return Ok(false);
                    }
                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        return Err(ProbeError::network(url, format!("HTTP {}", status)));
                    }
                    last_error = Some(ProbeError::network(url, format!("HTTP {}", status)));
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        ProbeError::Timeout {
                            location: url.to_string(),
                        }
                    } else {
                        ProbeError::network(url, e.to_string())
                    });
                }
            }

            if attempt < self.max_retries {
                // Wait before retrying with exponential backoff
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| ProbeError::network(url, "unknown error")))
    }
}
