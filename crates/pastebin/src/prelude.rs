//! Convenient re-exports for common pastebin types.
//!
//! ```ignore
//! use pastebin::prelude::*;
//! ```

pub use crate::error::{Error, Result};
pub use crate::key::{KeyScheme, PasteKey};
pub use crate::lookup::{Landing, LookupError, landing, resolve};
pub use crate::store::{
    CounterStore, DEFAULT_TTL, ExpiringOptions, ExpiringStore, RecordStore, StoreError, StoreUrl,
    open_store,
};
