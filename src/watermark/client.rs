//! Remote transform client.
//!
//! Produces watermarked image bytes through a two-stage network operation:
//!
//! 1. `GET` the origin URL for the raw image bytes
//! 2. `POST` those bytes to the transform endpoint as an octet stream
//!
//! Each stage fails independently ([`WatermarkError::Fetch`] vs
//! [`WatermarkError::Transform`]) so callers can tell which collaborator
//! misbehaved. No retries happen at this layer; a failed attempt is
//! terminal for that resolution attempt and the fallback policy lives in
//! the resolver.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::time::Duration;

use super::WatermarkError;
use crate::constants::{DEFAULT_TRANSFORM_ENDPOINT, DEFAULT_TRANSFORM_TIMEOUT_SECS};

/// Source of watermarked bytes for an origin URL.
///
/// The production implementation is [`HttpTransformClient`]; tests inject
/// mocks to drive the resolver through its failure paths.
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Produce watermarked bytes for the image at `url`.
    async fn transform(&self, url: &str) -> Result<Bytes, WatermarkError>;
}

/// Configuration for the HTTP transform client.
#[derive(Debug, Clone)]
pub struct TransformClientConfig {
    /// Transform endpoint receiving the raw bytes.
    pub endpoint: String,
    /// Timeout applied to each of the two HTTP calls.
    pub timeout: Duration,
}

impl Default for TransformClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TRANSFORM_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TRANSFORM_TIMEOUT_SECS),
        }
    }
}

/// HTTP implementation of [`ImageTransformer`].
#[derive(Debug, Clone)]
pub struct HttpTransformClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpTransformClient {
    /// Create a new transform client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `WatermarkError::Config` if the endpoint is empty or not an
    /// HTTP(S) URL, or if the HTTP client cannot be created.
    pub fn new(config: TransformClientConfig) -> Result<Self, WatermarkError> {
        if config.endpoint.is_empty() {
            return Err(WatermarkError::Config(
                "transform endpoint must not be empty".to_string(),
            ));
        }
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(WatermarkError::Config(format!(
                "transform endpoint must be an http(s) URL: {}",
                config.endpoint
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WatermarkError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint,
            http_client,
        })
    }

    /// The configured transform endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the raw image bytes from the origin URL.
    async fn fetch_origin(&self, url: &str) -> Result<Bytes, WatermarkError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            WatermarkError::Fetch {
                status: None,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatermarkError::Fetch {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        response.bytes().await.map_err(|e| WatermarkError::Fetch {
            status: None,
            message: format!("Failed to read origin body: {e}"),
        })
    }

    /// Send raw bytes to the transform endpoint, returning the watermarked
    /// body.
    async fn post_transform(&self, raw: Bytes) -> Result<Bytes, WatermarkError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, raw.len())
            .body(raw)
            .send()
            .await
            .map_err(|e| WatermarkError::Transform {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatermarkError::Transform {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| WatermarkError::Transform {
                status: None,
                message: format!("Failed to read transform body: {e}"),
            })
    }
}

#[async_trait]
impl ImageTransformer for HttpTransformClient {
    async fn transform(&self, url: &str) -> Result<Bytes, WatermarkError> {
        let raw = self.fetch_origin(url).await?;
        tracing::debug!(url, bytes = raw.len(), "fetched origin image");
        self.post_transform(raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_points_at_production_endpoint() {
        let config = TransformClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_TRANSFORM_ENDPOINT);
        assert_eq!(
            config.timeout,
            Duration::from_secs(DEFAULT_TRANSFORM_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_client_rejects_empty_endpoint() {
        let result = HttpTransformClient::new(TransformClientConfig {
            endpoint: String::new(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(WatermarkError::Config(_))));
    }

    #[test]
    fn test_client_rejects_non_http_endpoint() {
        let result = HttpTransformClient::new(TransformClientConfig {
            endpoint: "ftp://transform.example.com/watermark".to_string(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(WatermarkError::Config(_))));
    }

    #[test]
    fn test_client_creation_with_valid_endpoint() {
        let client = HttpTransformClient::new(TransformClientConfig::default())
            .expect("should create client");
        assert_eq!(client.endpoint(), DEFAULT_TRANSFORM_ENDPOINT);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTransformClient>();
    }
}
