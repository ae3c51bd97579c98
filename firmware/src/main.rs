//! TapLink Firmware
//! ESP32-S3 reader board with a PN5180 NFC frontend.
//! Reports every new card to the host on UART1 as `<id>\r`.

use anyhow::Context;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_sys as sys;
use log::{info, warn};
use taplink_reader::{
    Clock, HostError, HostLink, Instant, Reader, ReaderConfig, StandardFeedback, TagFamily,
    TagFamilySet,
};

mod board;

// NFC module for PN5180 (SPI)
mod nfc;

use board::BoardIndicators;
use nfc::Pn5180Reader;

const HOST_BAUD: u32 = 115_200;
const POLL_INTERVAL_MS: u32 = 10;

/// Milliseconds since boot from the high resolution ESP timer.
struct EspClock;

impl Clock for EspClock {
    fn now(&self) -> Instant {
        let us = unsafe { sys::esp_timer_get_time() };
        Instant::from_millis(u64::try_from(us / 1000).unwrap_or(0))
    }
}

/// Host link on UART1
struct UartHost<'d> {
    uart: UartDriver<'d>,
}

impl HostLink for UartHost<'_> {
    fn write_str(&mut self, s: &str) -> Result<(), HostError> {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            match self.uart.write(bytes) {
                Ok(0) => return Err(HostError::Disconnected),
                Ok(n) => bytes = &bytes[n..],
                Err(e) => {
                    warn!("UART write failed: {}", e);
                    return Err(HostError::Write);
                }
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("========================================");
    info!("TapLink Firmware v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");

    let peripherals = Peripherals::take().context("taking peripherals")?;

    // The PN5180 reads ISO 14443A cards only
    let config = ReaderConfig {
        search: TagFamilySet::empty().with(TagFamily::Iso14443a),
        report: TagFamilySet::empty().with(TagFamily::Iso14443a),
        ..ReaderConfig::default()
    };
    config.validate().context("invalid reader configuration")?;

    info!("[1/3] Setting up LEDs and buzzer...");
    let red = PinDriver::output(peripherals.pins.gpio38)?;
    let green = PinDriver::output(peripherals.pins.gpio39)?;
    let buzzer = PinDriver::output(peripherals.pins.gpio40)?;
    info!("  GPIO38 -> red LED, GPIO39 -> green LED, GPIO40 -> buzzer");

    info!("[2/3] Opening host UART...");
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17, // TX
        peripherals.pins.gpio18, // RX
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(HOST_BAUD)),
    )
    .context("opening UART1")?;
    info!("  UART1 on GPIO17(TX)/GPIO18(RX) at {} baud", HOST_BAUD);

    info!("[3/3] Initializing NFC reader...");
    let nfc = Pn5180Reader::new();

    let clock = EspClock;
    let mut reader = Reader::new(
        nfc,
        config.converter(),
        UartHost { uart },
        StandardFeedback::new(BoardIndicators::new(red, green, buzzer)),
        &config,
    );
    reader.feedback_mut().indicators_mut().service(clock.now());
    reader.start();

    info!("Ready, timeout {} ms", config.card_timeout.as_millis());

    loop {
        let now = clock.now();
        reader.tick(now);
        reader.feedback_mut().indicators_mut().service(now);
        FreeRtos::delay_ms(POLL_INTERVAL_MS);
    }
}
