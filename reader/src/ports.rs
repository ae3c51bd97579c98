//! Collaborators of the polling loop: tag acquisition, host link and user
//! feedback.

use crate::config::SearchSetup;
use crate::convert::CanonicalId;
use crate::error::HostError;
use crate::observation::RawObservation;

/// Tag acquisition (the reader frontend and its driver).
pub trait TagReader {
    /// Applies the startup search setup. Called once before the first poll.
    fn configure(&mut self, _setup: &SearchSetup) {}

    /// Searches the field once and returns immediately. Driver errors must be
    /// absorbed here and reported as `None`.
    fn poll(&mut self) -> Option<RawObservation>;
}

/// Line-oriented connection to the attached host.
pub trait HostLink {
    fn write_str(&mut self, s: &str) -> Result<(), HostError>;

    /// Reports a card: the id followed by a carriage return.
    fn send_card(&mut self, id: &CanonicalId) -> Result<(), HostError> {
        self.write_str(id.as_str())?;
        self.write_str("\r")
    }
}

/// Best-effort user feedback. Nothing here can influence the debouncer.
pub trait Feedback {
    fn on_startup(&mut self) {}

    fn on_new_card(&mut self, _id: &CanonicalId) {}

    fn on_card_timeout(&mut self, _id: &CanonicalId) {}

    /// Fired after every poll that returned an observation, reported or not.
    fn on_card_done(&mut self) {}
}

/// No feedback.
impl Feedback for () {}

impl<T: TagReader + ?Sized> TagReader for &mut T {
    fn configure(&mut self, setup: &SearchSetup) {
        (**self).configure(setup)
    }

    fn poll(&mut self) -> Option<RawObservation> {
        (**self).poll()
    }
}

impl<T: HostLink + ?Sized> HostLink for &mut T {
    fn write_str(&mut self, s: &str) -> Result<(), HostError> {
        (**self).write_str(s)
    }

    fn send_card(&mut self, id: &CanonicalId) -> Result<(), HostError> {
        (**self).send_card(id)
    }
}

impl<T: Feedback + ?Sized> Feedback for &mut T {
    fn on_startup(&mut self) {
        (**self).on_startup()
    }

    fn on_new_card(&mut self, id: &CanonicalId) {
        (**self).on_new_card(id)
    }

    fn on_card_timeout(&mut self, id: &CanonicalId) {
        (**self).on_card_timeout(id)
    }

    fn on_card_done(&mut self) {
        (**self).on_card_done()
    }
}
