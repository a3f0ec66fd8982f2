//! HTTP front end for the pastebin store.
//!
//! The binary in `main.rs` wires configuration, logging and the listener
//! around the [`server::router`]; everything else lives in [`server`] so it
//! can be driven from integration tests.

pub mod server;
