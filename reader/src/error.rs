//! Error types for the reader core.
//!
//! None of these reach the debouncer: observation and conversion errors are
//! resolved at the adapter boundary, host errors are logged by the loop.

use thiserror::Error;

/// Building a [`RawObservation`](crate::RawObservation) from driver output failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("identifier of {bits} bits exceeds the {max_bytes} byte buffer")]
    TooManyBits { bits: u16, max_bytes: usize },
    #[error("bit count {bits} needs more than the {available} bytes supplied")]
    MissingBits { bits: u16, available: usize },
}

/// Rendering a raw identifier as text failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("identifier needs {len} characters, limit is {max}")]
    IdentifierTooLong { len: usize, max: usize },
}

/// Startup configuration rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("card timeout must be greater than zero")]
    ZeroTimeout,
    #[error("maximum id length {0} is outside 1..={max}", max = crate::MAX_CARD_ID_LEN)]
    IdLength(usize),
    #[error("no tag family selected for reporting")]
    NoReportFamilies,
}

/// Writing to the host failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host write failed")]
    Write,
    #[error("host not connected")]
    Disconnected,
}
