//! Platform abstraction layer.
//!
//! Defines the `IdleProbe` and `InputEmitter` capability traits consumed by
//! the scheduler and the auxiliary mover, plus the factory functions that
//! select a backend for the current OS at startup. Platform-specific
//! implementations live in child modules.
//!
//! Failure contract: the probe never fails (it reports zero idle time when
//! the underlying counter is unavailable); emitter operations return
//! `PlatformError` and callers decide whether a failure matters. The main
//! scheduler treats them as fire-and-forget; the auxiliary mover swallows
//! them entirely.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::{create_idle_probe, create_input_emitter};
#[cfg(target_os = "macos")]
pub use macos::{create_idle_probe, create_input_emitter};
#[cfg(target_os = "windows")]
pub use windows::{create_idle_probe, create_input_emitter};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Error produced by platform backends.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The capability does not exist in the current session (missing X11
    /// extension, no display server, unsupported OS feature).
    #[error("platform capability unavailable: {0}")]
    Unavailable(String),
    /// Any other backend failure, described as text.
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Key identifiers
// ---------------------------------------------------------------------------

/// The keys the synthesized keyboard actions use.
///
/// `Shift` is the tap target for the plain key mode (a modifier tap resets
/// the idle timer without typing anything). `A` and `Backspace` are the
/// type-then-delete pair used by the scripted sequence. Each backend maps
/// these to its native key code namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Shift,
    A,
    Backspace,
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Reads the platform-reported time since the last real user input.
pub trait IdleProbe {
    /// Duration since the last non-synthesized input event.
    ///
    /// Returns `Duration::ZERO` when the platform cannot report idle time,
    /// so gated modes degrade to "never fire" rather than misfiring.
    fn idle_duration(&self) -> Duration;
}

/// Issues the platform calls that reset idle state or synthesize input.
///
/// Implementations are shared between the scheduler thread and the mover
/// thread, hence `Send + Sync`; backends are stateless or internally
/// synchronized.
pub trait InputEmitter: Send + Sync {
    /// Asks the OS to suppress idle/sleep/display-off while this process
    /// runs. Idempotent: calling it again while held refreshes the request.
    fn hold_system_awake(&self) -> Result<(), PlatformError>;

    /// Undoes `hold_system_awake`. Idempotent: releasing an unheld state is
    /// a no-op.
    fn release_awake_hold(&self) -> Result<(), PlatformError>;

    /// Synthesizes a relative pointer-motion event.
    fn move_cursor_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError>;

    /// Synthesizes a press+release of the primary pointer button.
    fn click_left_button(&self) -> Result<(), PlatformError>;

    /// Synthesizes a press+release of `key`.
    fn tap_key(&self, key: Key) -> Result<(), PlatformError>;

    /// Synthesizes a key-down event only.
    fn press_key(&self, key: Key) -> Result<(), PlatformError>;

    /// Synthesizes a key-up event only.
    fn release_key(&self, key: Key) -> Result<(), PlatformError>;
}

// ---------------------------------------------------------------------------
// Awake-hold guard
// ---------------------------------------------------------------------------

/// RAII guard for the system awake hold.
///
/// Acquiring issues `hold_system_awake`; dropping issues
/// `release_awake_hold`. Because drop runs on every exit path out of the
/// owning scope, the release happens exactly once whether the process shuts
/// down cleanly, returns an error, or unwinds.
pub struct AwakeHold {
    emitter: Arc<dyn InputEmitter>,
}

impl AwakeHold {
    pub fn acquire(emitter: Arc<dyn InputEmitter>) -> Self {
        match emitter.hold_system_awake() {
            Ok(()) => log::info!("emitter: awake hold acquired"),
            Err(err) => log::warn!("emitter: could not acquire awake hold: {err}"),
        }
        Self { emitter }
    }
}

impl Drop for AwakeHold {
    fn drop(&mut self) {
        match self.emitter.release_awake_hold() {
            Ok(()) => log::info!("emitter: awake hold released"),
            Err(err) => log::warn!("emitter: could not release awake hold: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test fakes
// ---------------------------------------------------------------------------

#[cfg(test)]
pub mod fakes {
    //! In-memory backends for driving the scheduler and mover in tests.

    use std::sync::Mutex;
    use std::time::Duration;

    use super::{IdleProbe, InputEmitter, Key, PlatformError};
    use crate::stop::StopFlag;

    /// One recorded emitter operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum EmitterCall {
        Hold,
        Release,
        Move { dx: i32, dy: i32 },
        Click,
        Tap(Key),
        Press(Key),
        ReleaseKey(Key),
    }

    /// Records every operation; optionally raises a stop flag after a call
    /// count is reached, and optionally fails every operation.
    #[derive(Default)]
    pub struct RecordingEmitter {
        calls: Mutex<Vec<EmitterCall>>,
        stop_after: Option<(usize, StopFlag)>,
        fail_all: bool,
    }

    impl RecordingEmitter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every operation records, then returns an error.
        pub fn failing() -> Self {
            Self {
                fail_all: true,
                ..Self::default()
            }
        }

        /// Raises `flag` once the total recorded call count reaches `n`.
        pub fn stop_after(n: usize, flag: StopFlag) -> Self {
            Self {
                stop_after: Some((n, flag)),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<EmitterCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Vector sum of all recorded `Move` calls.
        pub fn move_sum(&self) -> (i64, i64) {
            self.calls().iter().fold((0, 0), |(x, y), call| match call {
                EmitterCall::Move { dx, dy } => (x + i64::from(*dx), y + i64::from(*dy)),
                _ => (x, y),
            })
        }

        fn record(&self, call: EmitterCall) -> Result<(), PlatformError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            if let Some((n, flag)) = &self.stop_after {
                if calls.len() >= *n {
                    flag.request_stop();
                }
            }
            if self.fail_all {
                return Err(PlatformError::Other("injected failure".into()));
            }
            Ok(())
        }
    }

    impl InputEmitter for RecordingEmitter {
        fn hold_system_awake(&self) -> Result<(), PlatformError> {
            self.record(EmitterCall::Hold)
        }

        fn release_awake_hold(&self) -> Result<(), PlatformError> {
            self.record(EmitterCall::Release)
        }

        fn move_cursor_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
            self.record(EmitterCall::Move { dx, dy })
        }

        fn click_left_button(&self) -> Result<(), PlatformError> {
            self.record(EmitterCall::Click)
        }

        fn tap_key(&self, key: Key) -> Result<(), PlatformError> {
            self.record(EmitterCall::Tap(key))
        }

        fn press_key(&self, key: Key) -> Result<(), PlatformError> {
            self.record(EmitterCall::Press(key))
        }

        fn release_key(&self, key: Key) -> Result<(), PlatformError> {
            self.record(EmitterCall::ReleaseKey(key))
        }
    }

    /// Probe that always reports the same idle duration.
    pub struct FixedIdleProbe(pub Duration);

    impl IdleProbe for FixedIdleProbe {
        fn idle_duration(&self) -> Duration {
            self.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
