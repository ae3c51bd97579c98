//! Reader board LEDs and buzzer on plain GPIOs.
//!
//! Indicator calls only record the wanted state. [`BoardIndicators::service`]
//! drives the pins and must be called from the main loop, it runs the LED
//! blink phases and plays queued beeps one after another.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use heapless::Deque;
use log::debug;
use taplink_reader::{Indicators, Instant, Led, Tone};

// An active buzzer has one pitch, tones differ in length
const LOW_BEEP: Duration = Duration::from_millis(200);
const HIGH_BEEP: Duration = Duration::from_millis(80);
const BEEP_GAP: Duration = Duration::from_millis(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedMode {
    Off,
    On,
    Blink { on_ms: u16, off_ms: u16, since: Instant },
}

struct LedPin<P> {
    pin: P,
    mode: LedMode,
}

impl<P: OutputPin> LedPin<P> {
    fn new(pin: P) -> Self {
        Self { pin, mode: LedMode::Off }
    }

    fn lit_at(&self, now: Instant) -> bool {
        match self.mode {
            LedMode::Off => false,
            LedMode::On => true,
            LedMode::Blink { on_ms, off_ms, since } => {
                let period = u64::from(on_ms) + u64::from(off_ms);
                let elapsed = u64::try_from(now.saturating_since(since).as_millis()).unwrap_or(0);
                period == 0 || elapsed % period < u64::from(on_ms)
            }
        }
    }

    fn apply(&mut self, now: Instant) {
        let result = if self.lit_at(now) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            debug!("LED pin write failed: {:?}", e);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Buzzer {
    Idle,
    Sounding { until: Instant },
    Gap { until: Instant },
}

pub struct BoardIndicators<R, G, Z> {
    red: LedPin<R>,
    green: LedPin<G>,
    buzzer_pin: Z,
    buzzer: Buzzer,
    beeps: Deque<Tone, 4>,
    volume: u8,
    now: Instant,
}

impl<R, G, Z> BoardIndicators<R, G, Z>
where
    R: OutputPin,
    G: OutputPin,
    Z: OutputPin,
{
    pub fn new(red: R, green: G, buzzer: Z) -> Self {
        Self {
            red: LedPin::new(red),
            green: LedPin::new(green),
            buzzer_pin: buzzer,
            buzzer: Buzzer::Idle,
            beeps: Deque::new(),
            volume: 0,
            now: Instant::ZERO,
        }
    }

    /// Updates all pins for time `now`.
    pub fn service(&mut self, now: Instant) {
        self.now = now;
        self.red.apply(now);
        self.green.apply(now);

        loop {
            match self.buzzer {
                Buzzer::Sounding { until } if now >= until => {
                    self.set_buzzer(false);
                    self.buzzer = Buzzer::Gap { until: now + BEEP_GAP };
                }
                Buzzer::Gap { until } if now >= until => self.buzzer = Buzzer::Idle,
                Buzzer::Idle => {
                    let Some(tone) = self.beeps.pop_front() else { break };
                    let length = match tone {
                        Tone::Low => LOW_BEEP,
                        Tone::High => HIGH_BEEP,
                    };
                    // No PWM on the buzzer, any volume above zero is full volume
                    self.set_buzzer(self.volume > 0);
                    self.buzzer = Buzzer::Sounding { until: now + length };
                }
                _ => break,
            }
        }
    }

    fn led(&mut self, led: Led, mode: LedMode) {
        let now = self.now;
        match led {
            Led::Red => {
                self.red.mode = mode;
                self.red.apply(now);
            }
            Led::Green => {
                self.green.mode = mode;
                self.green.apply(now);
            }
        }
    }

    fn set_buzzer(&mut self, on: bool) {
        let result = if on {
            self.buzzer_pin.set_high()
        } else {
            self.buzzer_pin.set_low()
        };
        if let Err(e) = result {
            debug!("Buzzer pin write failed: {:?}", e);
        }
    }
}

impl<R, G, Z> Indicators for BoardIndicators<R, G, Z>
where
    R: OutputPin,
    G: OutputPin,
    Z: OutputPin,
{
    fn led_on(&mut self, led: Led) {
        self.led(led, LedMode::On);
    }

    fn led_off(&mut self, led: Led) {
        self.led(led, LedMode::Off);
    }

    fn led_blink(&mut self, led: Led, on_ms: u16, off_ms: u16) {
        let since = self.now;
        self.led(led, LedMode::Blink { on_ms, off_ms, since });
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
    }

    fn beep(&mut self, tone: Tone) {
        if self.beeps.push_back(tone).is_err() {
            debug!("Beep queue full, dropping {:?}", tone);
        }
    }
}
