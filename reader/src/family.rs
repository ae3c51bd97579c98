//! Tag families known to the reader and bitmask sets of them.
//!
//! Low-frequency (125 kHz class) families occupy bits 0..32 of a
//! [`TagFamilySet`], high-frequency (13.56 MHz class) families bits 32..64.

use core::fmt;
use core::ops::{BitAnd, BitOr, Sub};
use core::str::FromStr;

use thiserror::Error;

/// Contactless technology of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagFamily {
    // LF
    Em4102 = 0,
    Hitag1s = 1,
    Hitag2 = 2,
    Em4150 = 3,
    At5555 = 4,
    IsoFdx = 5,
    Em4026 = 6,
    HitagU = 7,
    Em4305 = 8,
    HidProx = 9,
    Tiris = 10,
    Cotag = 11,
    IoProx = 12,
    Indala = 13,
    Awid = 14,
    GProx = 15,
    Pyramid = 16,
    Keri = 17,
    Deister = 18,
    Cardax = 19,
    Nedap = 20,
    Pac = 21,

    // HF
    Iso14443a = 32,
    Iso14443b = 33,
    Iso15693 = 34,
    Legic = 35,
    HidIclass = 36,
    Felica = 37,
    Srx = 38,
    NfcP2p = 39,
    Ble = 40,
    Topaz = 41,
}

impl TagFamily {
    pub const ALL: [TagFamily; 32] = [
        TagFamily::Em4102,
        TagFamily::Hitag1s,
        TagFamily::Hitag2,
        TagFamily::Em4150,
        TagFamily::At5555,
        TagFamily::IsoFdx,
        TagFamily::Em4026,
        TagFamily::HitagU,
        TagFamily::Em4305,
        TagFamily::HidProx,
        TagFamily::Tiris,
        TagFamily::Cotag,
        TagFamily::IoProx,
        TagFamily::Indala,
        TagFamily::Awid,
        TagFamily::GProx,
        TagFamily::Pyramid,
        TagFamily::Keri,
        TagFamily::Deister,
        TagFamily::Cardax,
        TagFamily::Nedap,
        TagFamily::Pac,
        TagFamily::Iso14443a,
        TagFamily::Iso14443b,
        TagFamily::Iso15693,
        TagFamily::Legic,
        TagFamily::HidIclass,
        TagFamily::Felica,
        TagFamily::Srx,
        TagFamily::NfcP2p,
        TagFamily::Ble,
        TagFamily::Topaz,
    ];

    /// Bit of this family in a [`TagFamilySet`].
    pub const fn mask(self) -> u64 {
        1u64 << (self as u8)
    }

    pub const fn is_lf(self) -> bool {
        (self as u8) < 32
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            TagFamily::Em4102 => "em4102",
            TagFamily::Hitag1s => "hitag1s",
            TagFamily::Hitag2 => "hitag2",
            TagFamily::Em4150 => "em4150",
            TagFamily::At5555 => "at5555",
            TagFamily::IsoFdx => "isofdx",
            TagFamily::Em4026 => "em4026",
            TagFamily::HitagU => "hitagu",
            TagFamily::Em4305 => "em4305",
            TagFamily::HidProx => "hidprox",
            TagFamily::Tiris => "tiris",
            TagFamily::Cotag => "cotag",
            TagFamily::IoProx => "ioprox",
            TagFamily::Indala => "indala",
            TagFamily::Awid => "awid",
            TagFamily::GProx => "gprox",
            TagFamily::Pyramid => "pyramid",
            TagFamily::Keri => "keri",
            TagFamily::Deister => "deister",
            TagFamily::Cardax => "cardax",
            TagFamily::Nedap => "nedap",
            TagFamily::Pac => "pac",
            TagFamily::Iso14443a => "iso14443a",
            TagFamily::Iso14443b => "iso14443b",
            TagFamily::Iso15693 => "iso15693",
            TagFamily::Legic => "legic",
            TagFamily::HidIclass => "iclass",
            TagFamily::Felica => "felica",
            TagFamily::Srx => "srx",
            TagFamily::NfcP2p => "nfcp2p",
            TagFamily::Ble => "ble",
            TagFamily::Topaz => "topaz",
        }
    }
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown tag family name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown tag family")]
pub struct UnknownFamily;

impl FromStr for TagFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // MIFARE cards are reported as ISO 14443A
        if s.eq_ignore_ascii_case("mifare") {
            return Ok(TagFamily::Iso14443a);
        }
        TagFamily::ALL
            .iter()
            .copied()
            .find(|family| family.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownFamily)
    }
}

/// Set of tag families, one bit per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TagFamilySet(u64);

impl TagFamilySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub fn all_lf() -> Self {
        Self::from_iter(TagFamily::ALL.iter().copied().filter(|f| f.is_lf()))
    }

    pub fn all_hf() -> Self {
        Self::from_iter(TagFamily::ALL.iter().copied().filter(|f| !f.is_lf()))
    }

    pub const fn with(self, family: TagFamily) -> Self {
        Self(self.0 | family.mask())
    }

    pub const fn without(self, family: TagFamily) -> Self {
        Self(self.0 & !family.mask())
    }

    pub const fn contains(&self, family: TagFamily) -> bool {
        self.0 & family.mask() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// LF half of the mask, as passed to readers that configure LF and HF separately.
    pub const fn lf_bits(&self) -> u32 {
        self.0 as u32
    }

    pub const fn hf_bits(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = TagFamily> + '_ {
        TagFamily::ALL.iter().copied().filter(|f| self.contains(*f))
    }
}

impl FromIterator<TagFamily> for TagFamilySet {
    fn from_iter<I: IntoIterator<Item = TagFamily>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl BitOr for TagFamilySet {
    type Output = TagFamilySet;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for TagFamilySet {
    type Output = TagFamilySet;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Sub for TagFamilySet {
    type Output = TagFamilySet;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 & !rhs.0)
    }
}

impl fmt::Display for TagFamilySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, family) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(family.name())?;
        }
        Ok(())
    }
}

/// Parses a comma separated list of family names. `all-lf` and `all-hf`
/// select a whole band, a leading `-` removes a family again.
impl FromStr for TagFamilySet {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = Self::empty();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            if item.eq_ignore_ascii_case("all-lf") {
                set = set | Self::all_lf();
            } else if item.eq_ignore_ascii_case("all-hf") {
                set = set | Self::all_hf();
            } else if let Some(removed) = item.strip_prefix('-') {
                set = set.without(removed.parse()?);
            } else {
                set = set.with(item.parse()?);
            }
        }
        Ok(set)
    }
}
