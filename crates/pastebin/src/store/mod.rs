//! Record stores: where pastes live and how their keys are assigned.
//!
//! Two backends implement [`RecordStore`]:
//!
//! - [`ExpiringStore`]: keys derived from the payload digest, every record
//!   expires after a fixed horizon (seven days by default).
//! - [`CounterStore`]: keys are sequential integers assigned at insert time,
//!   records are kept forever.
//!
//! Both are fjall databases and are selected at startup from a [`StoreUrl`].

mod clock;
mod counter;
mod error;
mod expiring;
mod meta;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::key::{KeyScheme, PasteKey};

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::CounterStore;
pub use error::StoreError;
pub use expiring::{DEFAULT_TTL, ExpiringOptions, ExpiringStore};

/// The contract every paste backend fulfils.
///
/// `Ok(None)` always means "no such record" (or, for
/// [`latest`](Self::latest), "the store is empty"); `Err` always means the
/// backend itself failed.
pub trait RecordStore: Send + Sync {
    /// The key scheme this store assigns and accepts.
    fn scheme(&self) -> KeyScheme;

    /// Persist `payload` and return the key it can be read back under.
    fn submit(&self, payload: &[u8]) -> Result<PasteKey, StoreError>;

    /// Read the payload stored under `key`.
    fn get(&self, key: &PasteKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// The key the landing page should point at.
    fn latest(&self) -> Result<Option<PasteKey>, StoreError>;

    /// Number of readable records. Walks the whole store.
    fn count(&self) -> Result<usize, StoreError>;

    /// Physically remove expired records, returning how many were removed.
    fn purge_expired(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}

/// Errors from parsing a store connection string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreUrlError {
    #[error("store url '{0}' has no scheme, expected '<scheme>://<path>'")]
    MissingScheme(String),

    #[error("unknown store scheme '{0}', expected 'hash', 'hash+full' or 'counter'")]
    UnknownScheme(String),

    #[error("store url '{0}' has an empty path")]
    MissingPath(String),
}

/// A store connection string: `hash://<dir>`, `hash+full://<dir>` or
/// `counter://<dir>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUrl {
    pub scheme: KeyScheme,
    pub path: PathBuf,
}

impl StoreUrl {
    fn prefix(&self) -> &'static str {
        match self.scheme {
            KeyScheme::ShortDigest => "hash",
            KeyScheme::FullDigest => "hash+full",
            KeyScheme::Counter => "counter",
        }
    }
}

impl FromStr for StoreUrl {
    type Err = StoreUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, path) = s
            .split_once("://")
            .ok_or_else(|| StoreUrlError::MissingScheme(s.to_string()))?;

        let scheme = match prefix {
            "hash" => KeyScheme::ShortDigest,
            "hash+full" => KeyScheme::FullDigest,
            "counter" => KeyScheme::Counter,
            other => return Err(StoreUrlError::UnknownScheme(other.to_string())),
        };

        if path.is_empty() {
            return Err(StoreUrlError::MissingPath(s.to_string()));
        }

        Ok(Self {
            scheme,
            path: PathBuf::from(path),
        })
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.prefix(), self.path.display())
    }
}

/// Open (creating if needed) the store described by `url`.
///
/// `ttl` is the expiry horizon for digest-keyed stores and is ignored by the
/// counter store.
pub fn open_store(url: &StoreUrl, ttl: Duration) -> Result<Arc<dyn RecordStore>, StoreError> {
    open_at(url.scheme, &url.path, ttl)
}

/// Open the store described by `url`, failing if it was never created.
pub fn open_existing_store(
    url: &StoreUrl,
    ttl: Duration,
) -> Result<Arc<dyn RecordStore>, StoreError> {
    if !url.path.exists() {
        return Err(StoreError::NotInitialized(url.path.display().to_string()));
    }
    open_at(url.scheme, &url.path, ttl)
}

fn open_at(
    scheme: KeyScheme,
    path: &Path,
    ttl: Duration,
) -> Result<Arc<dyn RecordStore>, StoreError> {
    match scheme {
        KeyScheme::Counter => Ok(Arc::new(CounterStore::open(path)?)),
        digest => Ok(Arc::new(ExpiringStore::open(
            path,
            ExpiringOptions {
                scheme: digest,
                ttl,
                ..ExpiringOptions::default()
            },
        )?)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_store_urls() {
        let url: StoreUrl = "hash://./data/pastes".parse().unwrap();
        assert_eq!(url.scheme, KeyScheme::ShortDigest);
        assert_eq!(url.path, PathBuf::from("./data/pastes"));

        let url: StoreUrl = "hash+full:///var/lib/pastes".parse().unwrap();
        assert_eq!(url.scheme, KeyScheme::FullDigest);
        assert_eq!(url.path, PathBuf::from("/var/lib/pastes"));

        let url: StoreUrl = "counter://pastes".parse().unwrap();
        assert_eq!(url.scheme, KeyScheme::Counter);
        assert_eq!(url.to_string(), "counter://pastes");
    }

    #[test]
    fn test_malformed_store_urls() {
        assert_eq!(
            "./data".parse::<StoreUrl>(),
            Err(StoreUrlError::MissingScheme("./data".to_string()))
        );
        assert_eq!(
            "redis://localhost".parse::<StoreUrl>(),
            Err(StoreUrlError::UnknownScheme("redis".to_string()))
        );
        assert_eq!(
            "counter://".parse::<StoreUrl>(),
            Err(StoreUrlError::MissingPath("counter://".to_string()))
        );
    }

    #[test]
    fn test_open_store_selects_backend() {
        let dir = TempDir::new().unwrap();

        for (prefix, scheme) in [
            ("hash", KeyScheme::ShortDigest),
            ("hash+full", KeyScheme::FullDigest),
            ("counter", KeyScheme::Counter),
        ] {
            let url: StoreUrl = format!("{}://{}", prefix, dir.path().join(prefix).display())
                .parse()
                .unwrap();
            let store = open_store(&url, DEFAULT_TTL).unwrap();
            assert_eq!(store.scheme(), scheme);

            let key = store.submit(b"payload").unwrap();
            assert_eq!(store.get(&key).unwrap(), Some(b"payload".to_vec()));
            assert_eq!(store.latest().unwrap(), Some(key));
        }
    }

    #[test]
    fn test_open_existing_requires_directory() {
        let dir = TempDir::new().unwrap();
        let url = StoreUrl {
            scheme: KeyScheme::Counter,
            path: dir.path().join("missing"),
        };
        assert!(matches!(
            open_existing_store(&url, DEFAULT_TTL),
            Err(StoreError::NotInitialized(_))
        ));
    }
}
