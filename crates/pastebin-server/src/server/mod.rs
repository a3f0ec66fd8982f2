//! HTTP API server for pastebin.
//!
//! Pastes are submitted by POST to a configurable endpoint, read back as an
//! HTML page at `/{key}`, and the root path redirects to the latest paste.
//! New paste URLs are optionally announced to a webhook, and expired pastes
//! are swept in the background.

mod config;
mod error;
mod logging;
mod render;
mod routes;
mod state;
mod sweeper;
mod webhook;

pub use config::{
    Config, ConfigError, LogFormat, LoggingConfig, Overrides, ServerConfig, StoreConfig,
    WebhookConfig,
};
pub use error::ApiError;
pub use logging::{LoggingError, init as init_logging};
pub use routes::router;
pub use state::{AppState, StateError};
pub use sweeper::spawn_sweeper;
pub use webhook::{Webhook, WebhookError};
