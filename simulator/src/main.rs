//! TapLink PC Simulator
//!
//! Runs the reader loop natively against a simulated antenna field.
//!
//! # Usage
//! ```bash
//! # Interactive mode: commands on stdin, host protocol on stdout
//! cargo run -p taplink-simulator
//!
//! # Headless mode: replays a single tap on a synthetic clock and checks the events
//! cargo run -p taplink-simulator -- --headless
//! ```
//!
//! # Commands (interactive mode)
//! - `tap <family> <hex-id> [bits]`: put a tag into the field
//! - `lift`: remove it
//! - `wait <ms>`: pause command input (for piped scripts)
//! - `status`: show the tracked card
//! - `quit`

mod console;
mod field;

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use taplink_reader::{
    Clock, Event, IdConverter, Instant, OverlongPolicy, Radix, RawObservation, Reader,
    ReaderConfig, StandardFeedback, TagFamilySet,
};

use crate::console::{LogIndicators, StdoutHost, SystemClock};
use crate::field::{Command, SimulatedField};

#[derive(Parser)]
#[command(version, about = "TapLink reader simulator")]
struct Cli {
    /// Card presence timeout in milliseconds
    #[arg(long, env = "TAPLINK_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Maximum canonical id length
    #[arg(long, env = "TAPLINK_MAX_ID_LEN")]
    max_id_len: Option<usize>,

    /// Families to search for, e.g. `all-lf,-tiris,felica`
    #[arg(long, env = "TAPLINK_SEARCH")]
    search: Option<TagFamilySet>,

    /// Families to report to the host
    #[arg(long, env = "TAPLINK_REPORT")]
    report: Option<TagFamilySet>,

    #[arg(long, value_enum, env = "TAPLINK_RADIX")]
    radix: Option<RadixArg>,

    /// What to do with ids longer than the maximum
    #[arg(long, value_enum, env = "TAPLINK_OVERLONG")]
    overlong: Option<OverlongArg>,

    /// Enable configuration card support
    #[arg(long, env = "TAPLINK_CONFIG_CARD")]
    config_card: bool,

    /// Delay between polls in milliseconds
    #[arg(long, default_value_t = 10, env = "TAPLINK_POLL_INTERVAL_MS")]
    poll_interval_ms: u64,

    /// Miss the tag on every n-th poll
    #[arg(long, env = "TAPLINK_MISS_EVERY")]
    miss_every: Option<u64>,

    /// Replay a scripted tap and exit
    #[arg(long)]
    headless: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RadixArg {
    Hex,
    Dec,
}

#[derive(Clone, Copy, ValueEnum)]
enum OverlongArg {
    Reject,
    Truncate,
}

impl Cli {
    fn reader_config(&self) -> ReaderConfig {
        let defaults = ReaderConfig::default();
        ReaderConfig {
            card_timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.card_timeout),
            max_id_len: self.max_id_len.unwrap_or(defaults.max_id_len),
            search: self.search.unwrap_or(defaults.search),
            report: self.report.unwrap_or(defaults.report),
            radix: match self.radix {
                Some(RadixArg::Hex) => Radix::Hex,
                Some(RadixArg::Dec) => Radix::Decimal,
                None => defaults.radix,
            },
            overlong: match self.overlong {
                Some(OverlongArg::Reject) => OverlongPolicy::Reject,
                Some(OverlongArg::Truncate) => OverlongPolicy::Truncate,
                None => defaults.overlong,
            },
            config_card: self.config_card || defaults.config_card,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.reader_config();
    config.validate().context("invalid reader configuration")?;

    info!(
        "Timeout: {} ms, report: {}, max id length: {}",
        config.card_timeout.as_millis(),
        config.report,
        config.max_id_len
    );

    if cli.headless {
        run_headless(&config)
    } else {
        run_interactive(
            &config,
            Duration::from_millis(cli.poll_interval_ms),
            cli.miss_every,
        )
    }
}

/// Single tap on a synthetic clock: seen at 0 and 500 ms, then lifted. Must
/// produce exactly one arrival and one departure at `500 + timeout`.
fn run_headless(config: &ReaderConfig) -> anyhow::Result<()> {
    info!("TapLink Simulator - HEADLESS MODE");

    let Some(family) = (config.report & config.search).iter().next() else {
        bail!("no reported family is searched for, nothing could be read");
    };
    let tag = RawObservation::from_bytes(family, &[0xAA, 0xBB, 0xCC])
        .context("building the demo tag")?;
    let converter = config.converter();
    let Some(expected_id) = converter.convert(&tag) else {
        bail!("demo tag cannot be rendered with max id length {}", config.max_id_len);
    };

    let mut reader = Reader::new(
        SimulatedField::new(None),
        converter,
        StdoutHost::new(),
        StandardFeedback::new(LogIndicators::default()),
        config,
    );
    reader.start();

    let timeout_ms = u64::try_from(config.card_timeout.as_millis()).unwrap_or(u64::MAX);
    let refresh_ms = 500;
    let mut events = Vec::new();

    reader.tag_reader_mut().place(tag);
    events.extend(reader.tick(Instant::from_millis(0)));
    events.extend(reader.tick(Instant::from_millis(refresh_ms)));
    reader.tag_reader_mut().lift();
    events.extend(reader.tick(Instant::from_millis(refresh_ms.saturating_add(timeout_ms) - 1)));
    if !events.iter().all(|e| matches!(e, Event::Arrived(_))) {
        bail!("card departed before its deadline: {:?}", events);
    }
    events.extend(reader.tick(Instant::from_millis(refresh_ms.saturating_add(timeout_ms).saturating_add(1))));

    let expected = [
        Event::Arrived(expected_id.clone()),
        Event::Departed(expected_id),
    ];
    if events != expected {
        bail!("unexpected events {:?}, wanted {:?}", events, expected);
    }

    info!("Headless run OK: {} event(s)", events.len());
    Ok(())
}

fn run_interactive(
    config: &ReaderConfig,
    poll_interval: Duration,
    miss_every: Option<u64>,
) -> anyhow::Result<()> {
    info!("TapLink Simulator starting...");
    info!("Commands:");
    info!("  tap <family> <hex-id> [bits]");
    info!("  lift | wait <ms> | status | quit");

    let commands = spawn_command_reader().context("starting the stdin reader")?;
    let clock = SystemClock::new();

    let mut reader = Reader::new(
        SimulatedField::new(miss_every),
        config.converter(),
        StdoutHost::new(),
        StandardFeedback::new(LogIndicators::default()),
        config,
    );
    reader.start();

    let mut paused_until: Option<Instant> = None;
    let mut input_closed = false;

    // Main loop
    'running: loop {
        let now = clock.now();

        if paused_until.is_some_and(|until| now >= until) {
            paused_until = None;
        }

        if paused_until.is_none() && !input_closed {
            match commands.try_recv() {
                Ok(Command::Tap(tag)) => reader.tag_reader_mut().place(tag),
                Ok(Command::Lift) => reader.tag_reader_mut().lift(),
                Ok(Command::Wait(ms)) => {
                    paused_until = Some(now + Duration::from_millis(ms));
                }
                Ok(Command::Status) => {
                    let occupied = reader.tag_reader_mut().is_occupied();
                    match reader.debouncer().last_id() {
                        Some(id) => info!(
                            "Tracking {} until {}",
                            id,
                            reader.debouncer().deadline().unwrap_or(now)
                        ),
                        None => info!("Idle, field {}", if occupied { "occupied" } else { "empty" }),
                    }
                }
                Ok(Command::Quit) => break 'running,
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    info!("Input closed, waiting for the card to time out");
                    reader.tag_reader_mut().lift();
                    input_closed = true;
                }
            }
        }

        reader.tick(now);

        if input_closed && !reader.debouncer().is_tracking() {
            break 'running;
        }

        // Small delay to prevent CPU spinning
        thread::sleep(poll_interval);
    }

    info!("Simulator closed.");
    Ok(())
}

/// Parses stdin lines on a separate thread so the polling loop never blocks
/// on input.
fn spawn_command_reader() -> std::io::Result<Receiver<Command>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{}: {}", line.trim(), e),
                }
            }
        })?;
    Ok(rx)
}
