//! Server configuration parsing.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use pastebin::{StoreUrl, StoreUrlError};

/// Server configuration loaded from a TOML file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener and public URL settings.
    pub server: ServerConfig,
    /// Backend selection and expiry.
    pub store: StoreConfig,
    /// Outbound notification of new pastes.
    pub webhook: WebhookConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Server bind settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1" or "0.0.0.0").
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Path segment pastes are POSTed to. Empty means the root path.
    pub endpoint: String,
    /// Host used in returned paste URLs instead of the request's Host header.
    pub public_host: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            endpoint: "paste".into(),
            public_host: None,
        }
    }
}

/// Record store settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection string: `hash://<dir>`, `hash+full://<dir>` or `counter://<dir>`.
    pub url: String,
    /// Expiry horizon for digest-keyed pastes, in seconds.
    pub ttl_secs: u64,
    /// How often expired pastes are swept, in seconds. 0 disables sweeping.
    pub sweep_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "hash://./data/pastes".into(),
            ttl_secs: pastebin::DEFAULT_TTL.as_secs(),
            sweep_interval_secs: 3600,
        }
    }
}

/// Webhook settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Endpoint that receives every new paste URL. Unset disables the webhook.
    pub url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "pastebin=debug,tower_http=info".
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// "stdout", "stderr" or a file path.
    pub output: String,
    /// ANSI colors when writing to a terminal.
    pub color: bool,
    /// Include the event target.
    pub target: bool,
    /// Include timestamps.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            output: "stderr".into(),
            color: true,
            target: true,
            timestamps: true,
        }
    }
}

/// Values supplied on the command line or through the environment. Each one
/// that is set replaces the corresponding file setting.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub endpoint: Option<String>,
    pub store_url: Option<String>,
    pub webhook_url: Option<String>,
    pub public_host: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Apply command-line / environment overrides.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.server.endpoint = endpoint;
        }
        if let Some(url) = overrides.store_url {
            self.store.url = url;
        }
        if let Some(url) = overrides.webhook_url.filter(|u| !u.is_empty()) {
            self.webhook.url = Some(url);
        }
        if let Some(host) = overrides.public_host.filter(|h| !h.is_empty()) {
            self.server.public_host = Some(host);
        }
    }

    /// Check the settings that cannot be checked by deserialization alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.server.endpoint.trim_matches('/');
        let routable = endpoint
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '/' | ':' | '{' | '}' | '*' | '?' | '#'));
        if !routable {
            return Err(ConfigError::InvalidEndpoint(self.server.endpoint.clone()));
        }
        self.store_url()?;
        Ok(())
    }

    /// Get the socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    /// The parsed store connection string.
    pub fn store_url(&self) -> Result<StoreUrl, ConfigError> {
        self.store.url.parse().map_err(ConfigError::StoreUrl)
    }

    /// Expiry horizon for digest-keyed pastes.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.store.ttl_secs)
    }

    /// Sweep interval, `None` when sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.store.sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.store.sweep_interval_secs))
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String, std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
    /// Malformed store connection string.
    StoreUrl(StoreUrlError),
    /// Endpoint segment that cannot be routed.
    InvalidEndpoint(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config file '{}': {}", path, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::StoreUrl(e) => write!(f, "Invalid store url: {}", e),
            ConfigError::InvalidEndpoint(endpoint) => {
                write!(f, "Invalid endpoint '{}': must be a single path segment", endpoint)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
