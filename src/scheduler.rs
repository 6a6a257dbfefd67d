//! Main scheduler: the timed anti-idle duty cycle.
//!
//! Polls every 200ms and fires the configured action once per interval.
//! Gated modes additionally require the measured user-idle time to reach the
//! configured threshold before the action executes; the random walk and the
//! scripted sequence bypass the gate entirely.
//!
//! The timing core is `tick()`, which takes "now" as an argument so tests
//! can drive it with a simulated clock; `run()` is the thin wall-clock loop
//! around it.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;

use crate::config::{Config, Mode};
use crate::displacement;
use crate::durationfmt::format_duration;
use crate::platform::{IdleProbe, InputEmitter, Key, PlatformError};
use crate::stop::StopFlag;

/// Fixed poll cadence, independent of the configured interval.
const POLL_TICK: Duration = Duration::from_millis(200);

/// Pacing delay between repeated actions within one firing.
const ACTION_PACING: Duration = Duration::from_millis(250);

/// Pause between the typing and deletion halves of the scripted sequence.
const SEQUENCE_PAUSE: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Tick outcome
// ---------------------------------------------------------------------------

/// What a single poll tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The interval has not elapsed yet.
    NotDue,
    /// The interval elapsed and the action ran.
    Fired,
    /// The interval elapsed but the idle gate blocked the action.
    Gated,
    /// The interval elapsed, the gate blocked the action, and the scheduler
    /// issued the lightweight awake-hold refresh instead (`es` mode only).
    GatedRefresh,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Owns the main duty cycle. One instance per process, run on the main
/// thread until the stop flag is raised.
pub struct Scheduler {
    config: Config,
    probe: Box<dyn IdleProbe>,
    emitter: Arc<dyn InputEmitter>,
    rng: StdRng,
    /// `None` until the first tick, which therefore always fires.
    next_fire: Option<Instant>,
    action_pacing: Duration,
    sequence_pause: Duration,
}

impl Scheduler {
    pub fn new(
        config: Config,
        probe: Box<dyn IdleProbe>,
        emitter: Arc<dyn InputEmitter>,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            probe,
            emitter,
            rng,
            next_fire: None,
            action_pacing: ACTION_PACING,
            sequence_pause: SEQUENCE_PAUSE,
        }
    }

    /// Polls until the stop flag is raised. The flag is observed at least
    /// once per poll tick.
    pub fn run(&mut self, stop: &StopFlag) {
        log::info!(
            "scheduler: mode={} every {}",
            self.config.mode.as_str(),
            format_duration(self.config.interval)
        );
        while !stop.is_stopped() {
            self.tick(Instant::now(), stop);
            thread::sleep(POLL_TICK);
        }
        log::info!("scheduler: stopped");
    }

    /// One poll tick at clock value `now`.
    ///
    /// After any firing decision (fired or gated alike) the next fire time
    /// is `now + interval`: a stall past several intervals yields a single
    /// catch-up firing, never a queued burst.
    pub fn tick(&mut self, now: Instant, stop: &StopFlag) -> TickOutcome {
        if let Some(next) = self.next_fire {
            if now < next {
                return TickOutcome::NotDue;
            }
        }
        let outcome = self.fire(stop);
        self.next_fire = Some(now + self.config.interval);
        outcome
    }

    /// The firing decision: gate check, then `actions_per_interval`
    /// repetitions of the configured action.
    fn fire(&mut self, stop: &StopFlag) -> TickOutcome {
        if !self.gate_open() {
            // A gated `es` tick still refreshes the awake hold so the
            // no-sleep request stays alive. The refresh is not an action
            // and never counts against actions_per_interval.
            if self.config.mode == Mode::Es {
                if let Err(err) = self.emitter.hold_system_awake() {
                    log::debug!("scheduler: awake-hold refresh failed: {err}");
                }
                log::debug!("scheduler: gated, refreshed awake hold");
                return TickOutcome::GatedRefresh;
            }
            log::debug!("scheduler: gated, user not idle long enough");
            return TickOutcome::Gated;
        }

        for repetition in 0..self.config.actions_per_interval {
            if repetition > 0 {
                thread::sleep(self.action_pacing);
            }
            // Abort between repetitions once shutdown is requested; never
            // mid-call.
            if stop.is_stopped() {
                break;
            }
            self.perform_action();
        }
        TickOutcome::Fired
    }

    /// True when the configured action may execute on this firing.
    fn gate_open(&self) -> bool {
        self.config.mode.bypasses_idle_gate()
            || self.config.idle_threshold.is_zero()
            || self.probe.idle_duration() >= self.config.idle_threshold
    }

    /// Runs the configured action once. Failures are fire-and-forget: the
    /// next interval is the retry.
    fn perform_action(&mut self) {
        let result = match self.config.mode {
            Mode::Es => self.emitter.hold_system_awake(),
            Mode::Mouse => displacement::jiggle(&*self.emitter, self.config.jiggle_pixels),
            Mode::MouseRandom => {
                displacement::random_walk(&*self.emitter, &mut self.rng, self.config.jiggle_pixels)
            }
            Mode::Click => self.emitter.click_left_button(),
            Mode::Key => self.emitter.tap_key(Key::Shift),
            Mode::Sequence => self.run_sequence(),
        };
        match result {
            Ok(()) => log::debug!("scheduler: performed {} action", self.config.mode.as_str()),
            Err(err) => log::debug!("scheduler: action failed: {err}"),
        }
    }

    /// Type-then-delete macro: tap the typing key, pause, tap the deletion
    /// key. The pause is a plain sleep, so a stop request raised during it
    /// takes effect only after the deletion taps finish (known limitation).
    fn run_sequence(&self) -> Result<(), PlatformError> {
        self.emitter.press_key(Key::A)?;
        self.emitter.release_key(Key::A)?;
        thread::sleep(self.sequence_pause);
        self.emitter.press_key(Key::Backspace)?;
        self.emitter.release_key(Key::Backspace)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
