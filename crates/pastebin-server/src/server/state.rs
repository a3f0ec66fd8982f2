//! Application state management.

use std::sync::Arc;

use pastebin::{RecordStore, StoreError, StoreUrl, open_store};

use super::config::{Config, ConfigError};
use super::webhook::{Webhook, WebhookError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The paste store, opened once at startup.
    store: Arc<dyn RecordStore>,
    /// Path segment pastes are POSTed to, without slashes.
    endpoint: String,
    /// Host written into returned URLs, overriding the request's Host header.
    public_host: Option<String>,
    /// Host used when neither a public host nor a Host header is available.
    fallback_host: String,
    /// Receives every new paste URL when configured.
    webhook: Option<Webhook>,
}

impl AppState {
    /// Create state around an already opened store, with default settings.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            endpoint: "paste".into(),
            public_host: None,
            fallback_host: "localhost".into(),
            webhook: None,
        }
    }

    /// Create a new AppState from configuration, opening (or creating) the store.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        config.validate().map_err(StateError::Config)?;
        let url = config.store_url().map_err(StateError::Config)?;
        let store = open_store(&url, config.ttl())
            .map_err(|source| StateError::OpenStore { url: url.clone(), source })?;

        let webhook = match &config.webhook.url {
            Some(url) => Some(
                Webhook::new(url, config.webhook.timeout_secs).map_err(StateError::Webhook)?,
            ),
            None => None,
        };

        let mut state = Self::new(store).with_endpoint(&config.server.endpoint);
        state.public_host = config.server.public_host.clone();
        state.fallback_host = config.bind_addr();
        state.webhook = webhook;
        Ok(state)
    }

    /// Set the POST endpoint. Leading and trailing slashes are ignored.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_matches('/').to_string();
        self
    }

    /// Set the host written into returned paste URLs.
    pub fn with_public_host(mut self, host: impl Into<String>) -> Self {
        self.public_host = Some(host.into());
        self
    }

    /// Announce new pastes to `webhook`.
    pub fn with_webhook(mut self, webhook: Webhook) -> Self {
        self.webhook = Some(webhook);
        self
    }

    /// The paste store.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// A shared handle to the paste store.
    pub fn store_handle(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// The route pastes are POSTed to, e.g. `/paste`, or `/` when the
    /// endpoint is empty.
    pub fn endpoint_path(&self) -> String {
        format!("/{}", self.endpoint)
    }

    pub fn webhook(&self) -> Option<&Webhook> {
        self.webhook.as_ref()
    }

    /// Host to put in a paste URL: the configured public host, else the
    /// request's Host header, else the bind address.
    pub fn url_host<'a>(&'a self, request_host: Option<&'a str>) -> &'a str {
        self.public_host
            .as_deref()
            .or(request_host.filter(|h| !h.is_empty()))
            .unwrap_or(self.fallback_host.as_str())
    }
}

/// Errors that can occur when setting up application state.
#[derive(Debug)]
pub enum StateError {
    /// The configuration could not describe a store.
    Config(ConfigError),
    /// Failed to open (or create) the store.
    OpenStore { url: StoreUrl, source: StoreError },
    /// Failed to build the webhook client.
    Webhook(WebhookError),
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Config(e) => write!(f, "{}", e),
            StateError::OpenStore { url, source } => {
                write!(f, "Failed to open store '{}': {}", url, source)
            }
            StateError::Webhook(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StateError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pastebin::KeyScheme;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir, scheme: &str) -> Config {
        let mut config = Config::default();
        config.store.url = format!("{}://{}", scheme, dir.path().join("store").display());
        config.server.bind = "127.0.0.1".into();
        config.server.port = 3000;
        config
    }

    #[test]
    fn test_from_config_opens_store() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&config_for(&dir, "counter")).unwrap();

        assert_eq!(state.store().scheme(), KeyScheme::Counter);
        assert_eq!(state.endpoint_path(), "/paste");
        assert!(state.webhook().is_none());
    }

    #[test]
    fn test_url_host_precedence() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&config_for(&dir, "hash")).unwrap();

        assert_eq!(state.url_host(Some("example.org")), "example.org");
        assert_eq!(state.url_host(None), "127.0.0.1:3000");
        assert_eq!(state.url_host(Some("")), "127.0.0.1:3000");

        let state = state.with_public_host("paste.example.com");
        assert_eq!(state.url_host(Some("example.org")), "paste.example.com");
    }

    #[test]
    fn test_endpoint_slashes_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&config_for(&dir, "hash"))
            .unwrap()
            .with_endpoint("/submit/");
        assert_eq!(state.endpoint_path(), "/submit");

        let state = state.with_endpoint("");
        assert_eq!(state.endpoint_path(), "/");
    }

    #[test]
    fn test_unroutable_endpoint_fails_before_router() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir, "hash");
        config.server.endpoint = ":paste".into();
        assert!(matches!(
            AppState::from_config(&config),
            Err(StateError::Config(ConfigError::InvalidEndpoint(_)))
        ));
    }

    #[test]
    fn test_bad_store_url_fails() {
        let mut config = Config::default();
        config.store.url = "mysql://db".into();
        assert!(matches!(
            AppState::from_config(&config),
            Err(StateError::Config(ConfigError::StoreUrl(_)))
        ));
    }
}
