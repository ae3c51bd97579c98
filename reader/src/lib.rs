//! TapLink reader core.
//!
//! Turns the repeatedly polled "is a tag in the field, and what is its raw
//! identifier" signal of an RFID/NFC reader into one host report per physical
//! tap. Shared between the desktop simulator and the ESP32 firmware.
//!
//! - [`family`]: tag families and family sets (search mask, report filter)
//! - [`observation`]: raw poll results
//! - [`convert`]: canonical identifier rendering
//! - [`debounce`]: presence debouncer (arrival / departure edges)
//! - [`feedback`]: LED and beeper sequences
//! - [`reader`]: the polling loop tying the collaborators together

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod config;
pub mod convert;
pub mod debounce;
pub mod error;
pub mod family;
pub mod feedback;
pub mod observation;
pub mod ports;
pub mod reader;

pub use clock::{Clock, Instant};
pub use config::{ReaderConfig, SearchSetup};
pub use convert::{CanonicalId, IdConverter, NumericConverter, OverlongPolicy, Radix};
pub use debounce::{DebounceState, Debouncer, Event};
pub use error::{ConfigError, ConvertError, HostError, ObservationError};
pub use family::{TagFamily, TagFamilySet, UnknownFamily};
pub use feedback::{Indicators, Led, StandardFeedback, Tone};
pub use observation::RawObservation;
pub use ports::{Feedback, HostLink, TagReader};
pub use reader::Reader;

/// Default presence timeout in milliseconds
pub const CARD_TIMEOUT_MS: u64 = 2000;

/// Maximum length of a canonical identifier, in characters
pub const MAX_CARD_ID_LEN: usize = 128;

/// Maximum raw identifier size, in bytes
pub const MAX_ID_BYTES: usize = 32;
