//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use pastebin::{ExpiringOptions, ExpiringStore, KeyScheme, ManualClock};
use pastebin_server::server::{AppState, Config, router};
use tempfile::TempDir;

/// MD5 of "hello" is 5d41402abc4b2a76b9719d911017c592.
pub const HELLO_SHORT_KEY: &str = "5d41402";
pub const HELLO_FULL_KEY: &str = "5d41402abc4b2a76b9719d911017c592";

/// Start of time for stores driven by a [`ManualClock`].
pub const START: u64 = 1_700_000_000;

/// A router over a fresh store in a temporary directory.
pub struct TestApp {
    pub server: TestServer,
    _temp_dir: TempDir, // Keep alive for test duration
}

impl TestApp {
    /// Short-digest store with the default `/paste` endpoint.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(|_| {})
    }

    /// Store selected by the url prefix: `hash`, `hash+full` or `counter`.
    pub fn with_scheme(prefix: &str) -> anyhow::Result<Self> {
        let prefix = prefix.to_string();
        Self::with_config(move |config| {
            config.store.url = config.store.url.replacen("hash", &prefix, 1);
        })
    }

    /// Start from the default configuration, pointed at a temporary store,
    /// then apply `adjust`.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.server.bind = "127.0.0.1".into();
        config.server.port = 0;
        config.store.url = format!("hash://{}", temp_dir.path().join("store").display());
        adjust(&mut config);

        let state = AppState::from_config(&config)?;
        Self::from_state(state, temp_dir)
    }

    /// Wrap an already built state. `temp_dir` must own the store's files.
    pub fn from_state(state: AppState, temp_dir: TempDir) -> anyhow::Result<Self> {
        let server = TestServer::new(router(state))?;
        Ok(Self {
            server,
            _temp_dir: temp_dir,
        })
    }
}

/// A short-digest store whose clock the test controls.
pub fn expiring_state(ttl: Duration) -> anyhow::Result<(AppState, Arc<ManualClock>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(START));
    let store = ExpiringStore::open(
        temp_dir.path(),
        ExpiringOptions {
            scheme: KeyScheme::ShortDigest,
            ttl,
            clock: clock.clone(),
        },
    )?;
    Ok((AppState::new(Arc::new(store)), clock, temp_dir))
}

/// The key at the end of a returned paste URL.
pub fn key_from_url(url: &str) -> &str {
    url.trim_end().rsplit('/').next().unwrap_or_default()
}
