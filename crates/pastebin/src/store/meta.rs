//! The `_meta` keyspace shared by both store layouts.

use std::path::Path;

use fjall::{Database, Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::key::KeyScheme;
use crate::logging::info;

use super::error::StoreError;

const META_KEYSPACE: &str = "_meta";
const META_CONFIG_KEY: &str = "config";
const META_SCHEME_KEY: &str = "scheme";

/// Current on-disk format version.
/// Opening a directory written with a different version is refused.
const STORE_VERSION: u32 = 1;

/// Open the metadata keyspace, stamping a fresh directory with the format
/// version and key scheme, or verifying an existing one against them.
pub(crate) fn open_meta(
    db: &Database,
    path: &Path,
    scheme: KeyScheme,
) -> Result<Keyspace, StoreError> {
    let meta = db.keyspace(META_KEYSPACE, KeyspaceCreateOptions::default)?;

    let Some(config) = meta.get(META_CONFIG_KEY)? else {
        let mut batch = db.batch();
        batch.insert(&meta, META_CONFIG_KEY, STORE_VERSION.to_le_bytes().as_slice());
        batch.insert(&meta, META_SCHEME_KEY, scheme.name().as_bytes());
        batch.commit()?;
        db.persist(PersistMode::SyncAll)?;
        info!(path = %path.display(), scheme = %scheme, "initialized store");
        return Ok(meta);
    };

    let version = u32::from_le_bytes(
        config
            .as_ref()
            .try_into()
            .map_err(|_| StoreError::InvalidFormat("Invalid config format".to_string()))?,
    );
    if version != STORE_VERSION {
        return Err(StoreError::InvalidFormat(format!(
            "Store version mismatch: expected {}, got {}",
            STORE_VERSION, version
        )));
    }

    // A version without a scheme is a stamp that never finished; claim it.
    let Some(found) = meta.get(META_SCHEME_KEY)? else {
        meta.insert(META_SCHEME_KEY, scheme.name().as_bytes())?;
        db.persist(PersistMode::SyncAll)?;
        info!(path = %path.display(), scheme = %scheme, "completed store stamp");
        return Ok(meta);
    };
    let found = String::from_utf8_lossy(&found).into_owned();
    if found != scheme.name() {
        return Err(StoreError::SchemeMismatch {
            path: path.display().to_string(),
            expected: scheme,
            found,
        });
    }

    info!(path = %path.display(), scheme = %scheme, "opened store");
    Ok(meta)
}
