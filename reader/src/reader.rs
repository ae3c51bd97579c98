//! The polling loop.
//!
//! Every iteration polls the acquisition adapter once, feeds a result into
//! the debouncer, and then checks the deadline, so a departure is noticed
//! whether or not a tag is currently seen. All side effects of the events
//! (host line, feedback) happen here.

use heapless::Vec;
use log::{info, warn};

use crate::clock::{Clock, Instant};
use crate::config::{ReaderConfig, SearchSetup};
use crate::convert::IdConverter;
use crate::debounce::{Debouncer, Event};
use crate::ports::{Feedback, HostLink, TagReader};

pub struct Reader<R, C, H, F> {
    tag_reader: R,
    debouncer: Debouncer<C>,
    host: H,
    feedback: F,
    setup: SearchSetup,
}

impl<R, C, H, F> Reader<R, C, H, F>
where
    R: TagReader,
    C: IdConverter,
    H: HostLink,
    F: Feedback,
{
    /// `config` is expected to be validated.
    pub fn new(tag_reader: R, converter: C, host: H, feedback: F, config: &ReaderConfig) -> Self {
        Self {
            tag_reader,
            debouncer: Debouncer::new(converter, config.card_timeout),
            host,
            feedback,
            setup: config.search_setup(),
        }
    }

    /// Configures the adapter and plays the startup feedback.
    pub fn start(&mut self) {
        info!(
            "Reader starting: search {}, config card {}",
            self.setup.families,
            if self.setup.config_card { "on" } else { "off" }
        );
        self.tag_reader.configure(&self.setup);
        self.feedback.on_startup();
    }

    /// One loop iteration at time `now`. Returns the events it produced: at
    /// most one from the observation and one from the deadline check.
    pub fn tick(&mut self, now: Instant) -> Vec<Event, 2> {
        let mut events = Vec::new();

        if let Some(raw) = self.tag_reader.poll() {
            if let Some(event) = self.debouncer.on_observation(&raw, now) {
                if let Event::Arrived(id) = &event {
                    if let Err(e) = self.host.send_card(id) {
                        warn!("Failed to report card {} to host: {}", id, e);
                    }
                    self.feedback.on_new_card(id);
                }
                let pushed = events.push(event);
                debug_assert!(pushed.is_ok());
            }
            self.feedback.on_card_done();
        }

        if let Some(event) = self.debouncer.on_timer_check(now) {
            if let Event::Departed(id) = &event {
                self.feedback.on_card_timeout(id);
            }
            // Second and last event of this tick
            let pushed = events.push(event);
            debug_assert!(pushed.is_ok());
        }

        events
    }

    /// Runs [`tick`](Self::tick) until `keep_running` returns `false`. The
    /// predicate is called once per iteration and is the place to yield.
    pub fn run<K: Clock>(&mut self, clock: &K, mut keep_running: impl FnMut() -> bool) {
        while keep_running() {
            self.tick(clock.now());
        }
    }

    pub fn debouncer(&self) -> &Debouncer<C> {
        &self.debouncer
    }

    pub fn tag_reader_mut(&mut self) -> &mut R {
        &mut self.tag_reader
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }
}
