//! Simulated antenna field and the console commands that drive it.

use std::str::FromStr;

use log::{debug, info};
use taplink_reader::{RawObservation, SearchSetup, TagFamily, TagFamilySet, TagReader};
use thiserror::Error;

/// A tag stays in the field, and is reported on every poll, until lifted.
#[derive(Default)]
pub struct SimulatedField {
    present: Option<RawObservation>,
    search: TagFamilySet,
    /// Every n-th poll misses the tag, like a weak coupling would
    miss_every: Option<u64>,
    polls: u64,
}

impl SimulatedField {
    pub fn new(miss_every: Option<u64>) -> Self {
        Self {
            miss_every: miss_every.filter(|n| *n > 0),
            ..Self::default()
        }
    }

    pub fn place(&mut self, tag: RawObservation) {
        info!("Tag placed: {} ({} bits)", tag.family(), tag.bit_count());
        self.present = Some(tag);
    }

    pub fn lift(&mut self) {
        if self.present.take().is_some() {
            info!("Tag lifted");
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.present.is_some()
    }
}

impl TagReader for SimulatedField {
    fn configure(&mut self, setup: &SearchSetup) {
        self.search = setup.families;
        if setup.config_card {
            info!("Configuration cards enabled (simulated reader ignores them)");
        }
    }

    fn poll(&mut self) -> Option<RawObservation> {
        self.polls += 1;
        let tag = self.present.as_ref()?;
        if !self.search.contains(tag.family()) {
            return None;
        }
        if self.miss_every.is_some_and(|n| self.polls % n == 0) {
            debug!("Poll {} missed the tag", self.polls);
            return None;
        }
        Some(tag.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Put a tag into the field
    Tap(RawObservation),
    /// Remove the tag from the field
    Lift,
    /// Stop reading commands for this many milliseconds
    Wait(u64),
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown tag family `{0}`")]
    Family(String),
    #[error("invalid hex id: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Observation(#[from] taplink_reader::ObservationError),
}

const TAP_USAGE: &str = "tap <family> <hex-id> [bits]";
const WAIT_USAGE: &str = "wait <ms>";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };

        match verb.to_ascii_lowercase().as_str() {
            "tap" => {
                let (Some(family), Some(id)) = (words.next(), words.next()) else {
                    return Err(CommandError::Usage(TAP_USAGE));
                };
                let family: TagFamily = family
                    .parse()
                    .map_err(|_| CommandError::Family(family.to_string()))?;
                let bytes = hex::decode(id)?;
                let tag = match words.next() {
                    Some(bits) => {
                        let bits = bits.parse().map_err(|_| CommandError::Usage(TAP_USAGE))?;
                        RawObservation::new(family, &bytes, bits)?
                    }
                    None => RawObservation::from_bytes(family, &bytes)?,
                };
                Ok(Command::Tap(tag))
            }
            "lift" => Ok(Command::Lift),
            "wait" => words
                .next()
                .and_then(|ms| ms.parse().ok())
                .map(Command::Wait)
                .ok_or(CommandError::Usage(WAIT_USAGE)),
            "status" => Ok(Command::Status),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felica_setup() -> SearchSetup {
        SearchSetup {
            families: TagFamilySet::empty().with(TagFamily::Felica),
            config_card: false,
        }
    }

    #[test]
    fn parse_tap() {
        let cmd: Command = "tap felica AABBCC".parse().unwrap();
        let expected = RawObservation::from_bytes(TagFamily::Felica, &[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(cmd, Command::Tap(expected));

        let cmd: Command = "TAP em4102 0a1b 12".parse().unwrap();
        let expected = RawObservation::new(TagFamily::Em4102, &[0x0A, 0x1B], 12).unwrap();
        assert_eq!(cmd, Command::Tap(expected));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!("tap felica".parse::<Command>(), Err(CommandError::Usage(TAP_USAGE)));
        assert_eq!(
            "tap nope AA".parse::<Command>(),
            Err(CommandError::Family("nope".into()))
        );
        assert!(matches!("tap felica ABC".parse::<Command>(), Err(CommandError::Hex(_))));
        assert!(matches!(
            "tap felica AA 16".parse::<Command>(),
            Err(CommandError::Observation(_))
        ));
        assert_eq!("wait soon".parse::<Command>(), Err(CommandError::Usage(WAIT_USAGE)));
        assert_eq!("dance".parse::<Command>(), Err(CommandError::Unknown("dance".into())));
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!("lift".parse::<Command>(), Ok(Command::Lift));
        assert_eq!("wait 2500".parse::<Command>(), Ok(Command::Wait(2500)));
        assert_eq!(" status ".parse::<Command>(), Ok(Command::Status));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn field_reports_tag_until_lifted() {
        let mut field = SimulatedField::new(None);
        field.configure(&felica_setup());
        assert_eq!(field.poll(), None);

        let tag = RawObservation::from_bytes(TagFamily::Felica, &[0x01]).unwrap();
        field.place(tag.clone());
        assert_eq!(field.poll(), Some(tag.clone()));
        assert_eq!(field.poll(), Some(tag));

        field.lift();
        assert!(!field.is_occupied());
        assert_eq!(field.poll(), None);
    }

    #[test]
    fn field_only_finds_searched_families() {
        let mut field = SimulatedField::new(None);
        field.configure(&felica_setup());
        field.place(RawObservation::from_bytes(TagFamily::Legic, &[0x01]).unwrap());
        assert_eq!(field.poll(), None);
    }

    #[test]
    fn field_misses_every_nth_poll() {
        let mut field = SimulatedField::new(Some(3));
        field.configure(&felica_setup());
        field.place(RawObservation::from_bytes(TagFamily::Felica, &[0x01]).unwrap());
        let seen: Vec<bool> = (0..6).map(|_| field.poll().is_some()).collect();
        assert_eq!(seen, [true, true, false, true, true, false]);
    }
}
