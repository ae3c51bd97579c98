//! PN5180 NFC controller as a TapLink tag reader.
//!
//! The PN5180 communicates via SPI with the following pins:
//! - MOSI, MISO, SCLK - Standard SPI
//! - NSS - Chip select (active low)
//! - BUSY - Indicates when chip is processing (active high)
//! - RST - Hardware reset (active low)
//!
//! Only ISO 14443A activation is wired up, so the reader reports every card
//! as [`TagFamily::Iso14443a`] with its 4, 7 or 10 byte UID.

use heapless::Vec;
use log::{debug, info, warn};
use taplink_reader::{RawObservation, SearchSetup, TagFamily, TagReader};

/// PN5180 driver state (without hardware)
#[derive(Default)]
pub struct Pn5180State {
    /// RF field is on
    pub rf_on: bool,
}

// =============================================================================
// STUB IMPLEMENTATION - Hardware not connected yet
// =============================================================================
// GPIO assignments (DIP switch S0=1, S1=0 for Wireless Module mode):
// - CLK (Pin 3)  -> SPI Clock
// - MISO (Pin 5) -> SPI MISO
// - MOSI (Pin 7) -> SPI MOSI
// - CS (Pin 8)   -> NSS chip select
// - TX (Pin 1)   -> BUSY signal
// - RX (Pin 2)   -> RST reset
// =============================================================================

/// ISO 14443A UID: 4, 7 or 10 bytes
pub type Uid = Vec<u8, 10>;

/// Check if a tag is present and read its UID (STUB)
pub fn detect_tag_stub(_state: &Pn5180State) -> Option<Uid> {
    None
}

/// Turn RF field on (STUB)
pub fn rf_field_on_stub(state: &mut Pn5180State) {
    info!("RF field on (STUB)");
    state.rf_on = true;
}

/// Acquisition adapter: one ISO 14443A activation per poll.
pub struct Pn5180Reader {
    state: Pn5180State,
    enabled: bool,
}

impl Pn5180Reader {
    pub fn new() -> Self {
        info!("PN5180 NFC reader init (STUB - hardware not connected)");
        Self {
            state: Pn5180State::default(),
            enabled: false,
        }
    }
}

impl Default for Pn5180Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl TagReader for Pn5180Reader {
    fn configure(&mut self, setup: &SearchSetup) {
        self.enabled = setup.families.contains(TagFamily::Iso14443a);
        if !self.enabled {
            warn!("PN5180 only reads ISO 14443A, search set is {}", setup.families);
            return;
        }
        if setup.config_card {
            info!("Configuration cards are not supported by the PN5180 adapter");
        }
        rf_field_on_stub(&mut self.state);
    }

    fn poll(&mut self) -> Option<RawObservation> {
        if !self.enabled || !self.state.rf_on {
            return None;
        }
        let uid = detect_tag_stub(&self.state)?;
        match RawObservation::from_bytes(TagFamily::Iso14443a, &uid) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("Discarding {} byte UID: {}", uid.len(), e);
                None
            }
        }
    }
}
