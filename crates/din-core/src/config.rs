//! Pipeline Configuration Management
//!
//! Handles configuration from a TOML file and environment variables,
//! with defaults that reproduce the stock DIN 8580 chart.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction step settings
    pub extract: ExtractConfig,

    /// Render step settings
    pub render: RenderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Apply environment variables on top of this configuration
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (env takes this shape)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Extract
        if let Some(secs) = lookup("DIN8580_HTTP_TIMEOUT_SECS") {
            self.extract.http_timeout_secs = parse_value("DIN8580_HTTP_TIMEOUT_SECS", &secs)?;
        }
        if let Some(flag) = lookup("DIN8580_INSECURE_TLS_FALLBACK") {
            self.extract.insecure_tls_fallback = parse_flag("DIN8580_INSECURE_TLS_FALLBACK", &flag)?;
        }
        if let Some(lang) = lookup("DIN8580_LABEL_LANGUAGE") {
            self.extract.label_language = lang;
        }
        if let Some(id) = lookup("DIN8580_ROOT_ID") {
            self.extract.root_id = id;
        }
        if let Some(label) = lookup("DIN8580_ROOT_LABEL") {
            self.extract.root_label = label;
        }

        // Render
        if let Some(title) = lookup("DIN8580_TITLE") {
            self.render.title = title;
        }
        if let Some(url) = lookup("DIN8580_D3_URL") {
            self.render.d3_url = url;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.json_format = match format.to_lowercase().as_str() {
                "json" => true,
                "text" | "pretty" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOG_FORMAT".to_string(),
                        value: format,
                    })
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extract.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "extract.http_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.extract.root_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired("extract.root_id".to_string()));
        }
        if self.render.d3_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("render.d3_url".to_string()));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Extraction step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Timeout for fetching a URL source, in seconds
    pub http_timeout_secs: u64,

    /// Retry once without certificate verification when the TLS handshake fails
    pub insecure_tls_fallback: bool,

    /// Preferred `rdfs:label` language tag
    pub label_language: String,

    /// Id of the synthetic root node
    pub root_id: String,

    /// Label of the synthetic root node
    pub root_label: String,

    /// User-Agent header for URL sources
    pub user_agent: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            insecure_tls_fallback: false,
            label_language: "de".to_string(),
            root_id: "urn:local:din8580:root".to_string(),
            root_label: "DIN8580".to_string(),
            user_agent: concat!("din8580/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Render step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Page title and heading
    pub title: String,

    /// CDN location of the D3 v7 bundle
    pub d3_url: String,

    /// Depth expanded when the page opens (root is depth 0)
    pub initial_depth: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "DIN8580 Interactive Full Taxonomy".to_string(),
            d3_url: "https://d3js.org/d3.v7.min.js".to_string(),
            initial_depth: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
