//! Store logging, forwarded to `tracing` when the `logging` feature is on.
//!
//! Without the feature every macro expands to nothing.
//!
//! Levels used by the stores: `trace` for per-record reads and skips,
//! `debug` for writes, `info` for open and purge totals, `warn` for data
//! that could not be decoded.

#[cfg(feature = "logging")]
mod enabled {
    macro_rules! log_trace {
        ($($arg:tt)*) => { tracing::trace!($($arg)*) }
    }
    macro_rules! log_debug {
        ($($arg:tt)*) => { tracing::debug!($($arg)*) }
    }
    macro_rules! log_info {
        ($($arg:tt)*) => { tracing::info!($($arg)*) }
    }
    macro_rules! log_warn {
        ($($arg:tt)*) => { tracing::warn!($($arg)*) }
    }

    pub(crate) use {log_debug, log_info, log_trace, log_warn};
}

#[cfg(not(feature = "logging"))]
mod enabled {
    macro_rules! log_trace {
        ($($arg:tt)*) => {};
    }
    macro_rules! log_debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! log_info {
        ($($arg:tt)*) => {};
    }
    macro_rules! log_warn {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {log_debug, log_info, log_trace, log_warn};
}

pub(crate) use enabled::{
    log_debug as debug, log_info as info, log_trace as trace, log_warn as warn,
};
