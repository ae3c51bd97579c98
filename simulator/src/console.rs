//! Host link on stdout and reader board feedback as log lines.

use std::io::{self, Write};
use std::time::Instant as StdInstant;

use log::info;
use taplink_reader::{Clock, HostError, HostLink, Indicators, Instant, Led, Tone};

/// Host protocol on stdout. Logs go to stderr, so stdout carries only the
/// reported ids.
pub struct StdoutHost {
    out: io::Stdout,
}

impl StdoutHost {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostLink for StdoutHost {
    fn write_str(&mut self, s: &str) -> Result<(), HostError> {
        let mut out = self.out.lock();
        out.write_all(s.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|_| HostError::Write)
    }
}

/// Prints what the LEDs and the beeper of a reader board would do.
#[derive(Default)]
pub struct LogIndicators {
    volume: u8,
}

impl Indicators for LogIndicators {
    fn led_on(&mut self, led: Led) {
        info!("LED {:?} on", led);
    }

    fn led_off(&mut self, led: Led) {
        info!("LED {:?} off", led);
    }

    fn led_blink(&mut self, led: Led, on_ms: u16, off_ms: u16) {
        info!("LED {:?} blinking {}/{} ms", led, on_ms, off_ms);
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
    }

    fn beep(&mut self, tone: Tone) {
        info!("Beep {:?} at {}%", tone, self.volume);
    }
}

/// Wall clock, milliseconds since the simulator started.
pub struct SystemClock {
    origin: StdInstant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: StdInstant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        let ms = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        Instant::from_millis(ms)
    }
}
