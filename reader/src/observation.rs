use heapless::Vec;

use crate::error::ObservationError;
use crate::family::TagFamily;
use crate::MAX_ID_BYTES;

/// One successful poll: the family of the tag in the field and its raw
/// identifier bits, MSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    family: TagFamily,
    bits: Vec<u8, MAX_ID_BYTES>,
    bit_count: u16,
}

impl RawObservation {
    /// Copies the first `bit_count` bits of `id`. Bits beyond `bit_count` in
    /// the last byte are kept but never read.
    pub fn new(family: TagFamily, id: &[u8], bit_count: u16) -> Result<Self, ObservationError> {
        let needed = usize::from(bit_count).div_ceil(8);
        if needed > MAX_ID_BYTES {
            return Err(ObservationError::TooManyBits {
                bits: bit_count,
                max_bytes: MAX_ID_BYTES,
            });
        }
        if needed > id.len() {
            return Err(ObservationError::MissingBits {
                bits: bit_count,
                available: id.len(),
            });
        }
        let bits = Vec::from_slice(&id[..needed]).map_err(|()| ObservationError::TooManyBits {
            bits: bit_count,
            max_bytes: MAX_ID_BYTES,
        })?;
        Ok(Self {
            family,
            bits,
            bit_count,
        })
    }

    /// Whole-byte identifier, e.g. an ISO 14443A UID.
    pub fn from_bytes(family: TagFamily, id: &[u8]) -> Result<Self, ObservationError> {
        let bit_count = u16::try_from(id.len() * 8).map_err(|_| ObservationError::TooManyBits {
            bits: u16::MAX,
            max_bytes: MAX_ID_BYTES,
        })?;
        Self::new(family, id, bit_count)
    }

    pub fn family(&self) -> TagFamily {
        self.family
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn bit_count(&self) -> u16 {
        self.bit_count
    }
}
