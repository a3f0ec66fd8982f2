//! Counter-keyed store with unbounded retention.

use std::path::Path;
use std::sync::Mutex;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::key::{KeyScheme, PasteKey};
use crate::logging::{debug, info};

use super::error::StoreError;
use super::meta::open_meta;
use super::RecordStore;

const PASTES_KEYSPACE: &str = "pastes";

/// First id handed out by an empty store.
const FIRST_ID: u64 = 1;

/// Paste store that assigns sequential integer keys at insert time.
///
/// Ids are stored as big-endian `u64` so the keyspace iterates in numeric
/// order and the highest id is the last entry. Records never expire.
pub struct CounterStore {
    db: fjall::Database,
    pastes: Keyspace,
    next_id: Mutex<u64>,
}

impl CounterStore {
    /// Open the store at `path`, creating the keyspaces if they do not exist.
    ///
    /// Safe to call on every start; the counter resumes after the highest
    /// id already stored.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = fjall::Database::builder(path).open()?;
        open_meta(&db, path, KeyScheme::Counter)?;
        let pastes = db.keyspace(PASTES_KEYSPACE, KeyspaceCreateOptions::default)?;

        let next_id = match last_id(&pastes)? {
            Some(id) => id.checked_add(1).ok_or(StoreError::CounterExhausted)?,
            None => FIRST_ID,
        };
        info!(path = %path.display(), next_id, "counter store ready");

        Ok(Self {
            db,
            pastes,
            next_id: Mutex::new(next_id),
        })
    }

    /// Insert `payload` under the next id and return that id.
    ///
    /// Assignment and insert happen under one lock, so concurrent callers
    /// always receive distinct, increasing ids, and the id returned is the
    /// one the payload was persisted under. A failed insert does not consume
    /// the id.
    pub fn next_key(&self, payload: &[u8]) -> Result<PasteKey, StoreError> {
        let mut next = self.next_id.lock().map_err(|_| StoreError::LockPoisoned)?;
        let id = *next;
        let following = id.checked_add(1).ok_or(StoreError::CounterExhausted)?;

        self.pastes.insert(id.to_be_bytes().as_slice(), payload)?;
        self.db.persist(PersistMode::SyncAll)?;
        *next = following;

        debug!(id, bytes = payload.len(), "paste stored");
        Ok(PasteKey::from_counter(id))
    }
}

impl RecordStore for CounterStore {
    fn scheme(&self) -> KeyScheme {
        KeyScheme::Counter
    }

    fn submit(&self, payload: &[u8]) -> Result<PasteKey, StoreError> {
        self.next_key(payload)
    }

    fn get(&self, key: &PasteKey) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(id) = key.counter_value() else {
            return Ok(None);
        };
        Ok(self
            .pastes
            .get(id.to_be_bytes().as_slice())?
            .map(|v| v.to_vec()))
    }

    /// The highest id stored, `None` when the table is empty.
    fn latest(&self) -> Result<Option<PasteKey>, StoreError> {
        Ok(last_id(&self.pastes)?.map(PasteKey::from_counter))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.pastes.iter().count())
    }
}

fn last_id(pastes: &Keyspace) -> Result<Option<u64>, StoreError> {
    let Some(kv) = pastes.iter().next_back() else {
        return Ok(None);
    };
    let key = kv.key()?;
    let bytes: [u8; 8] = key
        .as_ref()
        .try_into()
        .map_err(|_| StoreError::InvalidFormat(format!("counter key of {} bytes", key.len())))?;
    Ok(Some(u64::from_be_bytes(bytes)))
}
