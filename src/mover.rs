//! Auxiliary mover: the independent background mouse duty cycle.
//!
//! Runs on its own thread, decoupled from the main scheduler's mode and
//! idle gating, for setups that want continuous subtle motion regardless of
//! the main mode. Strictly best-effort: a platform failure is logged and
//! swallowed, never propagated.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;

use crate::config::AuxMouseConfig;
use crate::displacement;
use crate::durationfmt::format_duration;
use crate::platform::InputEmitter;
use crate::stop::StopFlag;

/// Poll step bounds. The lower bound keeps very short intervals from busy
/// spinning; the upper bound keeps the stop flag observed at least every
/// 100ms.
const MIN_STEP: Duration = Duration::from_millis(50);
const MAX_STEP: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Mover
// ---------------------------------------------------------------------------

/// The auxiliary duty cycle. Constructed only when the feature is enabled
/// with a usable interval.
pub struct AuxMover {
    interval: Duration,
    pixels: i32,
    random: bool,
    emitter: Arc<dyn InputEmitter>,
    rng: StdRng,
}

impl AuxMover {
    /// Returns `None` when the mover is disabled or its interval is zero;
    /// in both cases the thread is never started.
    pub fn from_config(
        aux: &AuxMouseConfig,
        emitter: Arc<dyn InputEmitter>,
        rng: StdRng,
    ) -> Option<Self> {
        if !aux.enabled || aux.interval.is_zero() {
            return None;
        }
        Some(Self {
            interval: aux.interval,
            pixels: aux.pixels,
            random: aux.random,
            emitter,
            rng,
        })
    }

    /// Starts the duty cycle on a new thread. The thread exits once `stop`
    /// is raised and is joined by the caller during shutdown.
    pub fn spawn(mut self, stop: StopFlag) -> JoinHandle<()> {
        thread::spawn(move || self.run(&stop))
    }

    /// Accumulates elapsed time in poll steps and performs one displacement
    /// each time the interval is reached.
    pub fn run(&mut self, stop: &StopFlag) {
        let step = self.interval.clamp(MIN_STEP, MAX_STEP);
        log::info!(
            "mover: {} displacement of {}px every {}",
            if self.random { "random" } else { "fixed" },
            self.pixels,
            format_duration(self.interval)
        );

        let mut elapsed = Duration::ZERO;
        while !stop.is_stopped() {
            thread::sleep(step);
            elapsed += step;
            if elapsed >= self.interval {
                elapsed = Duration::ZERO;
                self.displace();
            }
        }
        log::info!("mover: stopped");
    }

    /// One displacement. Failures are swallowed: this loop must never take
    /// the process down.
    fn displace(&mut self) {
        let result = if self.random {
            displacement::random_walk(&*self.emitter, &mut self.rng, self.pixels)
        } else {
            displacement::jiggle(&*self.emitter, self.pixels)
        };
        if let Err(err) = result {
            log::debug!("mover: displacement failed: {err}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use std::time::Instant;

    use super::*;
    use crate::platform::fakes::RecordingEmitter;

    fn aux(enabled: bool, interval: Duration) -> AuxMouseConfig {
        AuxMouseConfig {
            enabled,
            interval,
            pixels: 2,
            random: false,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn disabled_config_produces_no_mover() {
        let emitter = Arc::new(RecordingEmitter::new());
        assert!(AuxMover::from_config(&aux(false, Duration::from_secs(30)), emitter, rng()).is_none());
    }

    #[test]
    fn zero_interval_produces_no_mover() {
        let emitter = Arc::new(RecordingEmitter::new());
        assert!(AuxMover::from_config(&aux(true, Duration::ZERO), emitter, rng()).is_none());
    }

    #[test]
    fn enabled_config_produces_a_mover() {
        let emitter = Arc::new(RecordingEmitter::new());
        assert!(AuxMover::from_config(&aux(true, Duration::from_secs(30)), emitter, rng()).is_some());
    }

    #[test]
    fn displacement_failures_are_swallowed() {
        let emitter = Arc::new(RecordingEmitter::failing());
        let mut mover =
            AuxMover::from_config(&aux(true, Duration::from_secs(1)), emitter.clone(), rng())
                .unwrap();
        mover.displace();
        assert_eq!(emitter.calls().len(), 1);
    }

    #[test]
    fn fixed_and_random_displacements_both_round_trip() {
        for random in [false, true] {
            let emitter = Arc::new(RecordingEmitter::new());
            let mut mover = AuxMover::from_config(
                &AuxMouseConfig {
                    random,
                    ..aux(true, Duration::from_secs(1))
                },
                emitter.clone(),
                rng(),
            )
            .unwrap();
            mover.displace();
            assert_eq!(emitter.move_sum(), (0, 0));
            assert_eq!(emitter.calls().len(), 2);
        }
    }

    #[test]
    fn loop_displaces_and_stops_promptly() {
        let stop = StopFlag::new();
        // One round trip is two moves; the second move raises the flag.
        let emitter = Arc::new(RecordingEmitter::stop_after(2, stop.clone()));
        let mover =
            AuxMover::from_config(&aux(true, MIN_STEP), emitter.clone(), rng()).unwrap();

        let started = Instant::now();
        let handle = mover.spawn(stop);
        handle.join().unwrap();

        assert_eq!(emitter.calls().len(), 2);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn pre_raised_stop_flag_exits_without_displacing() {
        let stop = StopFlag::new();
        stop.request_stop();
        let emitter = Arc::new(RecordingEmitter::new());
        let mut mover =
            AuxMover::from_config(&aux(true, Duration::from_secs(30)), emitter.clone(), rng())
                .unwrap();
        mover.run(&stop);
        assert!(emitter.calls().is_empty());
    }
}
