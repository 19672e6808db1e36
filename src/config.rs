//! Configuration for the MISP IOC service
//!
//! The endpoint URL and auth key come from the environment. They stay
//! optional in the loaded config so the connection-check operation can
//! report on what is missing; retrieval operations resolve them through
//! `credentials()` and fail hard until both are present.

use crate::error::{IocError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub misp: MispConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// MISP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MispConfig {
    /// Instance URL (MISP_URL)
    pub url: Option<String>,
    /// Opaque auth key (MISP_API_KEY)
    pub api_key: Option<String>,
    /// Relative lookback passed to restSearch, e.g. "24h" or "60d"
    pub search_window: String,
    /// Off by default; local Docker instances ship self-signed certs
    pub verify_tls: bool,
    pub request_timeout_secs: u64,
}

/// Resolved endpoint and credential, required by every retrieval call
#[derive(Debug, Clone)]
pub struct MispCredentials {
    pub url: Url,
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8087,
        }
    }
}

impl Default for MispConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            search_window: "24h".to_string(),
            verify_tls: false,
            request_timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            misp: MispConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("MISP_SERVER_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("MISP_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| IocError::Config(format!("Invalid MISP_SERVER_PORT: {}", e)))?;
        }

        if let Ok(url) = std::env::var("MISP_URL") {
            if !url.is_empty() {
                config.misp.url = Some(url);
            }
        }

        if let Ok(key) = std::env::var("MISP_API_KEY") {
            if !key.is_empty() {
                config.misp.api_key = Some(key);
            }
        }

        if let Ok(window) = std::env::var("MISP_SEARCH_WINDOW") {
            config.misp.search_window = window;
        }

        if let Ok(verify) = std::env::var("MISP_VERIFY_TLS") {
            config.misp.verify_tls = matches!(verify.as_str(), "1" | "true" | "yes");
        }

        if let Ok(timeout) = std::env::var("MISP_TIMEOUT_SECS") {
            config.misp.request_timeout_secs = timeout
                .parse()
                .map_err(|e| IocError::Config(format!("Invalid MISP_TIMEOUT_SECS: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(IocError::Config("Server port cannot be 0".to_string()));
        }

        if self.misp.search_window.is_empty() {
            return Err(IocError::Config("Search window cannot be empty".to_string()));
        }

        if self.misp.request_timeout_secs == 0 {
            return Err(IocError::Config("Request timeout cannot be 0".to_string()));
        }

        if let Some(url) = self.misp.url.as_deref().filter(|u| !u.is_empty()) {
            Url::parse(url)
                .map_err(|e| IocError::Config(format!("MISP_URL is not a valid URL: {}", e)))?;
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.misp.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl MispConfig {
    /// Resolve the endpoint and auth key, erroring on whichever is missing
    pub fn credentials(&self) -> Result<MispCredentials> {
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                IocError::Config("MISP_URL not found in environment variables".to_string())
            })?;

        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                IocError::Config("MISP_API_KEY not found in environment variables".to_string())
            })?;

        let url = Url::parse(url)
            .map_err(|e| IocError::Config(format!("MISP_URL is not a valid URL: {}", e)))?;

        Ok(MispCredentials {
            url,
            api_key: api_key.to_string(),
        })
    }
}
