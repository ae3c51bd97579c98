//! Presence debouncer.
//!
//! A tag in the field is reported on every poll. The debouncer keeps the id
//! of the credential currently considered present together with a sliding
//! deadline, and only reports the edges:
//!
//! ```text
//!  Idle ──arrival──▶ Tracking(id) ──timeout──▶ Idle
//!                      │    ▲
//!                      └────┘ refresh (same id, no event)
//!                             different id: Arrived(new), no Departed(old)
//! ```

use core::time::Duration;

use log::{debug, info};

use crate::clock::Instant;
use crate::convert::{CanonicalId, IdConverter};
use crate::observation::RawObservation;

/// Edge reported by the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A credential not tracked until now entered the field
    Arrived(CanonicalId),
    /// The tracked credential was not refreshed before its deadline
    Departed(CanonicalId),
}

/// The tracked id and its deadline are only ever present together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DebounceState {
    #[default]
    Idle,
    Tracking { id: CanonicalId, deadline: Instant },
}

pub struct Debouncer<C> {
    converter: C,
    card_timeout: Duration,
    state: DebounceState,
}

impl<C: IdConverter> Debouncer<C> {
    pub fn new(converter: C, card_timeout: Duration) -> Self {
        Self {
            converter,
            card_timeout,
            state: DebounceState::Idle,
        }
    }

    /// Feeds one poll result. Observations the converter drops leave the
    /// state untouched: they neither refresh nor clear the deadline.
    pub fn on_observation(&mut self, raw: &RawObservation, now: Instant) -> Option<Event> {
        let id = self.converter.convert(raw)?;
        let deadline = now + self.card_timeout;

        if let DebounceState::Tracking {
            id: current,
            deadline: current_deadline,
        } = &mut self.state
        {
            if *current == id {
                debug!("Card {} still present, deadline {}", id, deadline);
                *current_deadline = deadline;
                return None;
            }
        }

        info!("New card: {} ({})", id, raw.family());
        self.state = DebounceState::Tracking {
            id: id.clone(),
            deadline,
        };
        Some(Event::Arrived(id))
    }

    /// Reports a departure once `now` reaches the deadline.
    pub fn on_timer_check(&mut self, now: Instant) -> Option<Event> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            if let DebounceState::Tracking { id, .. } = core::mem::take(&mut self.state) {
                info!("Card timeout: {}", id);
                return Some(Event::Departed(id));
            }
        }
        None
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn last_id(&self) -> Option<&CanonicalId> {
        match &self.state {
            DebounceState::Tracking { id, .. } => Some(id),
            DebounceState::Idle => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Tracking { deadline, .. } => Some(*deadline),
            DebounceState::Idle => None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, DebounceState::Tracking { .. })
    }

    pub fn card_timeout(&self) -> Duration {
        self.card_timeout
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::NumericConverter;
    use crate::family::{TagFamily, TagFamilySet};

    const TIMEOUT: Duration = Duration::from_millis(2000);

    fn debouncer() -> Debouncer<NumericConverter> {
        Debouncer::new(
            NumericConverter::new(TagFamilySet::empty().with(TagFamily::Felica)),
            TIMEOUT,
        )
    }

    fn felica(id: &[u8]) -> RawObservation {
        RawObservation::from_bytes(TagFamily::Felica, id).unwrap()
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn arrived(s: &str) -> Option<Event> {
        Some(Event::Arrived(CanonicalId::new(s).unwrap()))
    }

    fn departed(s: &str) -> Option<Event> {
        Some(Event::Departed(CanonicalId::new(s).unwrap()))
    }

    #[test]
    fn starts_idle() {
        let d = debouncer();
        assert_eq!(d.state(), &DebounceState::Idle);
        assert_eq!(d.last_id(), None);
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn arrival_arms_deadline() {
        let mut d = debouncer();
        assert_eq!(d.on_observation(&felica(&[0xAA, 0xBB, 0xCC]), at(100)), arrived("AABBCC"));
        assert_eq!(d.last_id().unwrap(), "AABBCC");
        assert_eq!(d.deadline(), Some(at(2100)));
    }

    #[test]
    fn refresh_is_silent_and_slides_deadline() {
        let mut d = debouncer();
        let obs = felica(&[0x12, 0x34]);
        d.on_observation(&obs, at(0));
        assert_eq!(d.on_observation(&obs, at(700)), None);
        assert_eq!(d.last_id().unwrap(), "1234");
        assert_eq!(d.deadline(), Some(at(2700)));
    }

    #[test]
    fn single_arrival_per_tap() {
        for n in [1u64, 2, 10, 250] {
            let mut d = debouncer();
            let obs = felica(&[0x01, 0x02]);
            let mut events = std::vec::Vec::new();
            for i in 0..n {
                let now = at(i * 10);
                events.extend(d.on_observation(&obs, now));
                events.extend(d.on_timer_check(now));
            }
            let last = (n - 1) * 10;
            events.extend(d.on_timer_check(at(last + 2000)));
            assert_eq!(
                events,
                [arrived("0102").unwrap(), departed("0102").unwrap()],
                "n = {n}"
            );
        }
    }

    #[test]
    fn swap_arrives_without_departure() {
        let mut d = debouncer();
        assert_eq!(d.on_observation(&felica(&[0x0A]), at(0)), arrived("0A"));
        assert_eq!(d.on_timer_check(at(10)), None);
        assert_eq!(d.on_observation(&felica(&[0x0B]), at(20)), arrived("0B"));
        assert_eq!(d.last_id().unwrap(), "0B");
        assert_eq!(d.deadline(), Some(at(2020)));
        assert_eq!(d.on_timer_check(at(2020)), departed("0B"));
    }

    #[test]
    fn timeout_boundary() {
        let mut d = debouncer();
        d.on_observation(&felica(&[0x0A]), at(300));
        assert_eq!(d.on_timer_check(at(300)), None);
        assert_eq!(d.on_timer_check(at(2299)), None);
        assert!(d.is_tracking());
        assert_eq!(d.on_timer_check(at(2300)), departed("0A"));
        assert_eq!(d.state(), &DebounceState::Idle);
        // Only once
        assert_eq!(d.on_timer_check(at(5000)), None);
    }

    #[test]
    fn unsupported_family_changes_nothing() {
        let mut d = debouncer();
        let other = RawObservation::from_bytes(TagFamily::Em4102, &[0x99]).unwrap();

        assert_eq!(d.on_observation(&other, at(0)), None);
        assert_eq!(d.state(), &DebounceState::Idle);

        d.on_observation(&felica(&[0x01]), at(0));
        let before = d.state().clone();
        assert_eq!(d.on_observation(&other, at(1500)), None);
        assert_eq!(d.state(), &before);
        // Did not refresh: still expires at the original deadline
        assert_eq!(d.on_timer_check(at(2000)), departed("01"));
    }

    #[test]
    fn rejected_overlong_id_changes_nothing() {
        let mut d = Debouncer::new(
            NumericConverter::new(TagFamilySet::empty().with(TagFamily::Felica)).with_max_len(4),
            TIMEOUT,
        );
        assert_eq!(d.on_observation(&felica(&[0x01, 0x02]), at(0)), arrived("0102"));
        let before = d.state().clone();

        // Six hex digits, over the limit of four
        assert_eq!(d.on_observation(&felica(&[0xAA, 0xBB, 0xCC]), at(1500)), None);
        assert_eq!(d.state(), &before);
        assert_eq!(d.last_id().unwrap(), "0102");
        assert_eq!(d.deadline(), Some(at(2000)));
        assert_eq!(d.on_timer_check(at(2000)), departed("0102"));
    }

    #[test]
    fn same_tag_after_departure_arrives_again() {
        let mut d = debouncer();
        let obs = felica(&[0x42]);
        d.on_observation(&obs, at(0));
        assert_eq!(d.on_timer_check(at(2000)), departed("42"));
        assert_eq!(d.on_observation(&obs, at(2001)), arrived("42"));
    }

    #[test]
    fn end_to_end_scenario() {
        let mut d = debouncer();
        let obs = felica(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(d.on_observation(&obs, at(0)), arrived("AABBCC"));
        assert_eq!(d.on_observation(&obs, at(500)), None);
        assert_eq!(d.deadline(), Some(at(2500)));
        assert_eq!(d.on_timer_check(at(2499)), None);
        assert_eq!(d.on_timer_check(at(2501)), departed("AABBCC"));
    }
}
