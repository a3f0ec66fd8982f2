//! Error types for the record stores.

use thiserror::Error;

use crate::key::KeyScheme;

/// Errors that can occur during record store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Store not initialized at {0}")]
    NotInitialized(String),

    #[error("Store at '{path}' uses key scheme '{found}', expected '{expected}'")]
    SchemeMismatch {
        path: String,
        expected: KeyScheme,
        found: String,
    },

    #[error("Key scheme '{0}' cannot be used with this store")]
    UnsupportedScheme(KeyScheme),

    #[error("Counter exhausted: no further ids can be assigned")]
    CounterExhausted,

    #[error("Counter lock poisoned")]
    LockPoisoned,
}
