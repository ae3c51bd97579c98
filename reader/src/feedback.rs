//! LED and beeper sequences of the standard reader application.

use crate::convert::CanonicalId;
use crate::ports::Feedback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Red,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Low,
    High,
}

/// Actuator primitives of a reader board. Calls are fire-and-forget.
pub trait Indicators {
    fn led_on(&mut self, led: Led);
    fn led_off(&mut self, led: Led);
    fn led_blink(&mut self, led: Led, on_ms: u16, off_ms: u16);
    /// Beeper volume, 0..=100 percent
    fn set_volume(&mut self, percent: u8);
    fn beep(&mut self, tone: Tone);
}

const STARTUP_VOLUME: u8 = 30;
const CARD_VOLUME: u8 = 100;
const CARD_BLINK_MS: u16 = 500;

/// Idle: green LED. Card reported: red LED blinking and a high beep.
pub struct StandardFeedback<I> {
    indicators: I,
}

impl<I: Indicators> StandardFeedback<I> {
    pub fn new(indicators: I) -> Self {
        Self { indicators }
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    pub fn indicators_mut(&mut self) -> &mut I {
        &mut self.indicators
    }

    pub fn into_inner(self) -> I {
        self.indicators
    }
}

impl<I: Indicators> Feedback for StandardFeedback<I> {
    fn on_startup(&mut self) {
        self.indicators.led_on(Led::Green);
        self.indicators.led_off(Led::Red);
        self.indicators.set_volume(STARTUP_VOLUME);
        self.indicators.beep(Tone::Low);
        self.indicators.beep(Tone::High);
    }

    fn on_new_card(&mut self, _id: &CanonicalId) {
        self.indicators.led_off(Led::Green);
        self.indicators.led_on(Led::Red);
        self.indicators.led_blink(Led::Red, CARD_BLINK_MS, CARD_BLINK_MS);
        self.indicators.set_volume(CARD_VOLUME);
        self.indicators.beep(Tone::High);
    }

    fn on_card_timeout(&mut self, _id: &CanonicalId) {
        self.indicators.led_on(Led::Green);
        self.indicators.led_off(Led::Red);
    }
}
