//! Canonical identifier rendering.
//!
//! A raw identifier is read as one unsigned big-endian number and printed in
//! the configured radix. Hex output is zero padded to two digits per started
//! byte, so whole-byte UIDs come out as their bytes in order:
//!
//! ```
//! use taplink_reader::{IdConverter, NumericConverter, RawObservation, TagFamily, TagFamilySet};
//!
//! let converter = NumericConverter::new(TagFamilySet::empty().with(TagFamily::Felica));
//! let obs = RawObservation::from_bytes(TagFamily::Felica, &[0x01, 0x2E, 0xAB]).unwrap();
//! assert_eq!(converter.convert(&obs).unwrap().as_str(), "012EAB");
//!
//! // Families outside the report set are dropped
//! let other = RawObservation::from_bytes(TagFamily::Em4102, &[0x01]).unwrap();
//! assert!(converter.convert(&other).is_none());
//! ```

use core::fmt;

use heapless::{String, Vec};
use log::debug;

use crate::error::ConvertError;
use crate::family::TagFamilySet;
use crate::observation::RawObservation;
use crate::{MAX_CARD_ID_LEN, MAX_ID_BYTES};

// 256 bits need 64 hex or 78 decimal digits
const DIGIT_CAPACITY: usize = 80;

/// Textual identifier of a credential, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalId(String<MAX_CARD_ID_LEN>);

impl CanonicalId {
    /// `None` if `s` is longer than [`MAX_CARD_ID_LEN`].
    pub fn new(s: &str) -> Option<Self> {
        String::try_from(s).ok().map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CanonicalId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for CanonicalId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

/// Family filter plus conversion. Must be a pure function of the observation.
pub trait IdConverter {
    /// `None` when the family is not reported or the identifier cannot be
    /// rendered.
    fn convert(&self, raw: &RawObservation) -> Option<CanonicalId>;
}

impl<C: IdConverter + ?Sized> IdConverter for &C {
    fn convert(&self, raw: &RawObservation) -> Option<CanonicalId> {
        (**self).convert(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    #[default]
    Hex,
    Decimal,
}

impl Radix {
    const fn base(self) -> u16 {
        match self {
            Radix::Hex => 16,
            Radix::Decimal => 10,
        }
    }

    /// Minimum number of digits for an identifier of `bit_count` bits.
    fn min_digits(self, bit_count: u16) -> usize {
        match self {
            Radix::Hex => usize::from(bit_count).div_ceil(8) * 2,
            Radix::Decimal => 1,
        }
    }
}

/// What to do with identifiers longer than the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlongPolicy {
    /// Drop the observation, as if no tag was seen
    #[default]
    Reject,
    /// Keep the leading characters
    Truncate,
}

/// Renders the first `bit_count` bits of `bits` (MSB first) as ASCII digits,
/// most significant digit first.
pub fn render_digits(bits: &[u8], bit_count: u16, radix: Radix) -> Vec<u8, DIGIT_CAPACITY> {
    let nbytes = usize::from(bit_count).div_ceil(8).min(bits.len()).min(MAX_ID_BYTES);
    let mut number = [0u8; MAX_ID_BYTES];
    let number = &mut number[..nbytes];
    number.copy_from_slice(&bits[..nbytes]);

    // Right-align the bit string so the last identifier bit is the LSB
    let shift = (nbytes * 8).saturating_sub(usize::from(bit_count)) as u32;
    if shift > 0 {
        for i in (0..nbytes).rev() {
            let carry = if i > 0 { number[i - 1] << (8 - shift) } else { 0 };
            number[i] = (number[i] >> shift) | carry;
        }
    }

    let base = radix.base();
    let mut digits: Vec<u8, DIGIT_CAPACITY> = Vec::new();
    while number.iter().any(|b| *b != 0) {
        let mut rem: u16 = 0;
        for byte in number.iter_mut() {
            let acc = (rem << 8) | u16::from(*byte);
            *byte = (acc / base) as u8;
            rem = acc % base;
        }
        if digits.push(digit_char(rem as u8)).is_err() {
            break;
        }
    }
    while digits.len() < radix.min_digits(bit_count).max(1) {
        if digits.push(b'0').is_err() {
            break;
        }
    }
    digits.reverse();
    digits
}

fn digit_char(d: u8) -> u8 {
    match d {
        0..=9 => b'0' + d,
        _ => b'A' + (d - 10),
    }
}

/// Default converter: family filter plus numeric rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericConverter {
    report: TagFamilySet,
    radix: Radix,
    max_len: usize,
    overlong: OverlongPolicy,
}

impl NumericConverter {
    /// Hex rendering, [`MAX_CARD_ID_LEN`] limit, overlong ids rejected.
    pub fn new(report: TagFamilySet) -> Self {
        Self {
            report,
            radix: Radix::Hex,
            max_len: MAX_CARD_ID_LEN,
            overlong: OverlongPolicy::Reject,
        }
    }

    pub fn with_radix(mut self, radix: Radix) -> Self {
        self.radix = radix;
        self
    }

    /// Clamped to [`MAX_CARD_ID_LEN`].
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.min(MAX_CARD_ID_LEN);
        self
    }

    pub fn with_overlong(mut self, overlong: OverlongPolicy) -> Self {
        self.overlong = overlong;
        self
    }

    pub fn report(&self) -> TagFamilySet {
        self.report
    }

    /// Renders an observation regardless of its family.
    pub fn render(&self, raw: &RawObservation) -> Result<CanonicalId, ConvertError> {
        let digits = render_digits(raw.bits(), raw.bit_count(), self.radix);
        let keep = if digits.len() > self.max_len {
            match self.overlong {
                OverlongPolicy::Reject => {
                    return Err(ConvertError::IdentifierTooLong {
                        len: digits.len(),
                        max: self.max_len,
                    })
                }
                OverlongPolicy::Truncate => self.max_len,
            }
        } else {
            digits.len()
        };

        let mut id = String::new();
        for &c in &digits[..keep] {
            // keep <= max_len <= capacity
            if id.push(char::from(c)).is_err() {
                break;
            }
        }
        Ok(CanonicalId(id))
    }
}

impl IdConverter for NumericConverter {
    fn convert(&self, raw: &RawObservation) -> Option<CanonicalId> {
        if !self.report.contains(raw.family()) {
            return None;
        }
        match self.render(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!("Dropping {} tag: {}", raw.family(), e);
                None
            }
        }
    }
}
