//! Paste storage with content-derived or counter-assigned keys.
//!
//! A paste is an arbitrary byte payload stored under a short public key.
//! Keys come from one of three [`KeyScheme`]s:
//!
//! - `ShortDigest`: the first 7 hex characters of the payload's MD5
//! - `FullDigest`: the full 32 hex character MD5
//! - `Counter`: a sequential integer assigned by the store
//!
//! Digest-keyed pastes live in an [`ExpiringStore`] and disappear after a
//! fixed horizon; counter-keyed pastes live in a [`CounterStore`] forever.
//! Both sit behind the [`RecordStore`] trait.
//!
//! # Module Organization
//!
//! - [`key`]: key derivation and identifier validation
//! - [`store`]: the record store trait and its fjall backends
//! - [`lookup`]: identifier resolution and landing selection
//! - [`error`]: unified error types
//! - [`prelude`]: convenient re-exports
//!
//! # Features
//!
//! - `logging`: Enable tracing-based logging
//!
//! # Example
//!
//! ```ignore
//! use pastebin::prelude::*;
//!
//! let url: StoreUrl = "hash://./data/pastes".parse()?;
//! let store = open_store(&url, DEFAULT_TTL)?;
//!
//! let key = store.submit(b"hello")?;          // "5d41402"
//! let text = resolve(store.as_ref(), key.as_str())?;
//! ```

pub mod error;
pub mod key;
pub(crate) mod logging;
pub mod lookup;
pub mod prelude;
pub mod store;

pub use error::{Error, Result};
pub use key::{FULL_DIGEST_LEN, KeyError, KeyScheme, PasteKey, SHORT_DIGEST_LEN};
pub use lookup::{Landing, LookupError, landing, resolve};
pub use store::{
    Clock, CounterStore, DEFAULT_TTL, ExpiringOptions, ExpiringStore, ManualClock, RecordStore,
    StoreError, StoreUrl, StoreUrlError, SystemClock, open_existing_store, open_store,
};
