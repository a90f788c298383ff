// Configuration module

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::catalog::client::CatalogClientConfig;
use crate::constants::{
    DEFAULT_CATALOG_ENDPOINT, DEFAULT_CATALOG_TIMEOUT_SECS, DEFAULT_RESOLVE_CONCURRENCY,
    DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_TRANSFORM_ENDPOINT, DEFAULT_TRANSFORM_TIMEOUT_SECS,
};
use crate::watermark::TransformClientConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

/// Watermark pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkSettings {
    /// Transform endpoint receiving raw image bytes
    #[serde(default = "default_transform_endpoint")]
    pub transform_endpoint: String,

    /// Timeout per transform HTTP call in seconds
    #[serde(default = "default_transform_timeout_secs")]
    pub timeout_secs: u64,

    /// How many resolutions to drive concurrently when walking the catalog
    #[serde(default = "default_resolve_concurrency")]
    pub resolve_concurrency: usize,
}

/// Catalog API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// GraphQL endpoint of the catalog
    #[serde(default = "default_catalog_endpoint")]
    pub endpoint: String,

    /// Timeout per catalog request in seconds
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Debounce delay for search-as-you-type in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_transform_endpoint() -> String {
    DEFAULT_TRANSFORM_ENDPOINT.to_string()
}

fn default_transform_timeout_secs() -> u64 {
    DEFAULT_TRANSFORM_TIMEOUT_SECS
}

fn default_resolve_concurrency() -> usize {
    DEFAULT_RESOLVE_CONCURRENCY
}

fn default_catalog_endpoint() -> String {
    DEFAULT_CATALOG_ENDPOINT.to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    DEFAULT_CATALOG_TIMEOUT_SECS
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            transform_endpoint: default_transform_endpoint(),
            timeout_secs: default_transform_timeout_secs(),
            resolve_concurrency: default_resolve_concurrency(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            endpoint: default_catalog_endpoint(),
            timeout_secs: default_catalog_timeout_secs(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl WatermarkSettings {
    /// Transform client configuration derived from these settings.
    pub fn client_config(&self) -> TransformClientConfig {
        TransformClientConfig {
            endpoint: self.transform_endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl CatalogSettings {
    /// Catalog client configuration derived from these settings.
    pub fn client_config(&self) -> CatalogClientConfig {
        CatalogClientConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, endpoint) in [
            ("watermark.transform_endpoint", &self.watermark.transform_endpoint),
            ("catalog.endpoint", &self.catalog.endpoint),
        ] {
            if endpoint.is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("{} must be an http(s) URL: {}", name, endpoint));
            }
        }

        if self.watermark.timeout_secs == 0 {
            return Err("watermark.timeout_secs must be greater than 0".to_string());
        }
        if self.catalog.timeout_secs == 0 {
            return Err("catalog.timeout_secs must be greater than 0".to_string());
        }
        if self.watermark.resolve_concurrency == 0 {
            return Err("watermark.resolve_concurrency must be greater than 0".to_string());
        }

        Ok(())
    }
}
