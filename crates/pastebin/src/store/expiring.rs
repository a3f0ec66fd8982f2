//! Hash-keyed store with a fixed expiry horizon.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::key::{KeyScheme, PasteKey};
use crate::logging::{debug, info, trace, warn};

use super::clock::{Clock, SystemClock};
use super::error::StoreError;
use super::meta::open_meta;
use super::RecordStore;

/// Seven days, the horizon after which a hash-keyed paste disappears.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

const PASTES_KEYSPACE: &str = "pastes";
const EXPIRY_KEYSPACE: &str = "expiry";

/// Options for opening an [`ExpiringStore`].
#[derive(Debug, Clone)]
pub struct ExpiringOptions {
    /// Digest scheme used to derive keys. Must not be [`KeyScheme::Counter`].
    pub scheme: KeyScheme,
    /// Horizon applied when [`ExpiringStore::put`] is given no explicit TTL.
    pub ttl: Duration,
    /// Time source for expiry decisions.
    pub clock: Arc<dyn Clock>,
}

impl Default for ExpiringOptions {
    fn default() -> Self {
        Self {
            scheme: KeyScheme::ShortDigest,
            ttl: DEFAULT_TTL,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Content-addressed paste store where every record carries an expiry time.
///
/// Records live in the `pastes` keyspace as `expires_at (u64 BE) ‖ payload`,
/// keyed by the hex digest. An `expiry` keyspace indexes
/// `expires_at (u64 BE) ‖ key` so expired records can be swept in time order.
/// Both entries are written in one batch: a reader never sees a record whose
/// expiry is not yet recorded.
///
/// Expired records are invisible to [`get`](RecordStore::get) and
/// [`latest`](RecordStore::latest) as soon as their horizon passes, and are
/// physically removed by [`purge_expired`](RecordStore::purge_expired).
///
/// # Example
///
/// ```ignore
/// use pastebin::store::{ExpiringOptions, ExpiringStore, RecordStore};
///
/// let store = ExpiringStore::open(Path::new("data/pastes"), ExpiringOptions::default())?;
/// let key = store.submit(b"hello")?;
/// assert_eq!(key.as_str(), "5d41402");
/// assert_eq!(store.get(&key)?, Some(b"hello".to_vec()));
/// ```
pub struct ExpiringStore {
    db: fjall::Database,
    pastes: Keyspace,
    expiry: Keyspace,
    scheme: KeyScheme,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    // Held by put and purge_expired.
    write_lock: Mutex<()>,
}

impl ExpiringStore {
    /// Open the store at `path`, creating it if it does not exist yet.
    pub fn open(path: &Path, options: ExpiringOptions) -> Result<Self, StoreError> {
        if !options.scheme.is_digest() {
            return Err(StoreError::UnsupportedScheme(options.scheme));
        }

        let db = fjall::Database::builder(path).open()?;
        open_meta(&db, path, options.scheme)?;
        let pastes = db.keyspace(PASTES_KEYSPACE, KeyspaceCreateOptions::default)?;
        let expiry = db.keyspace(EXPIRY_KEYSPACE, KeyspaceCreateOptions::default)?;

        Ok(Self {
            db,
            pastes,
            expiry,
            scheme: options.scheme,
            ttl: options.ttl,
            clock: options.clock,
            write_lock: Mutex::new(()),
        })
    }

    /// Store `payload` under `key`, expiring after `ttl` (or the store
    /// default).
    ///
    /// The record and its expiry index entry are committed together. If the
    /// commit fails nothing is written and the error is returned. An existing
    /// record under the same key is replaced and its horizon restarted.
    pub fn put(
        &self,
        key: &PasteKey,
        payload: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let ttl = ttl.unwrap_or(self.ttl);
        let expires_at = self.clock.now().saturating_add(ttl.as_secs());

        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut batch = self.db.batch();
        batch.insert(&self.pastes, key.as_bytes(), encode_record(expires_at, payload));
        batch.insert(&self.expiry, index_key(expires_at, key.as_bytes()), Vec::new());
        batch.commit()?;
        self.db.persist(PersistMode::SyncAll)?;

        debug!(key = %key, bytes = payload.len(), expires_at, "paste stored");
        Ok(())
    }

    /// Load a record, `None` if absent or past its horizon.
    fn load_live(&self, key: &[u8], now: u64) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(raw) = self.pastes.get(key)? else {
            return Ok(None);
        };

        let (expires_at, payload) = decode_record(&raw)?;
        if expires_at <= now {
            trace!(key = %String::from_utf8_lossy(key), expires_at, now, "record expired");
            return Ok(None);
        }

        Ok(Some(payload.to_vec()))
    }

    fn is_live(&self, key: &[u8], now: u64) -> Result<bool, StoreError> {
        let Some(raw) = self.pastes.get(key)? else {
            return Ok(false);
        };
        let (expires_at, _) = decode_record(&raw)?;
        Ok(expires_at > now)
    }

    /// Turn a stored key back into a [`PasteKey`], skipping anything that
    /// does not match the scheme.
    fn stored_key(&self, raw: &[u8]) -> Option<PasteKey> {
        let text = std::str::from_utf8(raw).ok()?;
        match self.scheme.parse_key(text) {
            Ok(key) => Some(key),
            Err(_e) => {
                warn!(key = %text, error = %_e, "skipping malformed stored key");
                None
            }
        }
    }
}

impl RecordStore for ExpiringStore {
    fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    fn submit(&self, payload: &[u8]) -> Result<PasteKey, StoreError> {
        let key = self
            .scheme
            .derive(payload)
            .ok_or(StoreError::UnsupportedScheme(self.scheme))?;
        self.put(&key, payload, None)?;
        Ok(key)
    }

    fn get(&self, key: &PasteKey) -> Result<Option<Vec<u8>>, StoreError> {
        self.load_live(key.as_bytes(), self.clock.now())
    }

    /// Pick a random live record: seek to a random hex position and take the
    /// next live key, wrapping around to the start of the keyspace.
    fn latest(&self) -> Result<Option<PasteKey>, StoreError> {
        let now = self.clock.now();
        let mut start = hex::encode(rand::random::<u128>().to_be_bytes());
        start.truncate(self.scheme.digest_len().unwrap_or(start.len()));

        let after = self.pastes.range(start.as_bytes()..);
        let before = self.pastes.range(..start.as_bytes());

        for kv in after.chain(before) {
            let key_bytes = kv.key()?;
            if !self.is_live(&key_bytes, now)? {
                continue;
            }
            if let Some(key) = self.stored_key(&key_bytes) {
                return Ok(Some(key));
            }
        }

        Ok(None)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut count = 0;
        for kv in self.pastes.iter() {
            let key_bytes = kv.key()?;
            if self.is_live(&key_bytes, now)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Remove every record whose horizon has passed.
    ///
    /// Walks the expiry index up to now. Index entries left behind by a
    /// rewrite of the same key are dropped without touching the fresher
    /// record.
    fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let bound = now.saturating_add(1).to_be_bytes();
        let mut due = Vec::new();
        for kv in self.expiry.range(..bound.as_slice()) {
            due.push(kv.key()?.to_vec());
        }

        if due.is_empty() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut batch = self.db.batch();
        for entry in &due {
            batch.remove(&self.expiry, entry.as_slice());

            let Some((_, key)) = entry.split_first_chunk::<8>() else {
                warn!("skipping malformed expiry index entry");
                continue;
            };
            if let Some(raw) = self.pastes.get(key)? {
                let (expires_at, _) = decode_record(&raw)?;
                if expires_at <= now {
                    batch.remove(&self.pastes, key);
                    removed += 1;
                }
            }
        }
        batch.commit()?;
        self.db.persist(PersistMode::SyncAll)?;

        info!(removed, index_entries = due.len(), "purged expired pastes");
        Ok(removed)
    }
}

fn encode_record(expires_at: u64, payload: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(8 + payload.len());
    record.extend_from_slice(&expires_at.to_be_bytes());
    record.extend_from_slice(payload);
    record
}

fn decode_record(raw: &[u8]) -> Result<(u64, &[u8]), StoreError> {
    let (head, payload) = raw
        .split_first_chunk::<8>()
        .ok_or_else(|| StoreError::InvalidFormat("record shorter than its header".to_string()))?;
    Ok((u64::from_be_bytes(*head), payload))
}

fn index_key(expires_at: u64, key: &[u8]) -> Vec<u8> {
    let mut entry = Vec::with_capacity(8 + key.len());
    entry.extend_from_slice(&expires_at.to_be_bytes());
    entry.extend_from_slice(key);
    entry
}
