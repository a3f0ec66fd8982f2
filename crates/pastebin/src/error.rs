//! Unified error type for the pastebin library.
//!
//! Each module has its own error enum; [`Error`] wraps them all so
//! applications can use a single error type with `?`.

use thiserror::Error;

use crate::key::KeyError;
use crate::lookup::LookupError;
use crate::store::{StoreError, StoreUrlError};

/// Unified error type for all pastebin operations.
///
/// # Example
///
/// ```ignore
/// use pastebin::{Result, StoreUrl, open_store, DEFAULT_TTL};
///
/// fn paste(text: &str) -> Result<String> {
///     let url: StoreUrl = "hash://./data".parse()?;
///     let store = open_store(&url, DEFAULT_TTL)?;
///     Ok(store.submit(text.as_bytes())?.into_inner())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed identifier or unknown key scheme.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Backend failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed store connection string.
    #[error(transparent)]
    StoreUrl(#[from] StoreUrlError),

    /// Failed identifier resolution.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
