//! Resolving public identifiers and choosing the landing target.

use thiserror::Error;

use crate::key::{KeyError, PasteKey};
use crate::logging::trace;
use crate::store::{RecordStore, StoreError};

/// Why an identifier could not be resolved to a payload.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The identifier does not match the store's key pattern. The store was
    /// not consulted.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] KeyError),

    /// Well-formed identifier with no live record behind it.
    #[error("No paste stored under '{0}'")]
    NotFound(PasteKey),

    /// The backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve a public identifier to the payload stored under it.
pub fn resolve(store: &dyn RecordStore, identifier: &str) -> Result<Vec<u8>, LookupError> {
    let key = store.scheme().parse_key(identifier)?;
    match store.get(&key)? {
        Some(payload) => Ok(payload),
        None => {
            trace!(key = %key, "no record");
            Err(LookupError::NotFound(key))
        }
    }
}

/// What the root path should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    /// Redirect to this paste.
    Redirect(PasteKey),
    /// Nothing stored yet: show the welcome page.
    Welcome,
}

/// Pick the landing target: the store's latest record, or the welcome page
/// when the store is empty.
pub fn landing(store: &dyn RecordStore) -> Result<Landing, StoreError> {
    Ok(match store.latest()? {
        Some(key) => Landing::Redirect(key),
        None => Landing::Welcome,
    })
}
