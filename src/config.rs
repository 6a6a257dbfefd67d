//! Runtime configuration.
//!
//! Built once from the command line at startup and never mutated afterwards;
//! both duty cycles read it without synchronization. Field bounds are
//! enforced by the CLI layer before a `Config` is ever constructed.

use std::time::Duration;

use clap::ValueEnum;

/// Default main-scheduler interval (2 minutes).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

/// Default auxiliary-mover interval.
pub const DEFAULT_AUX_INTERVAL: Duration = Duration::from_secs(30);

/// Default displacement magnitude for both the jiggle action and the mover.
pub const DEFAULT_PIXELS: i32 = 2;

// ---------------------------------------------------------------------------
// Action mode
// ---------------------------------------------------------------------------

/// The action the main scheduler performs each interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Refresh the OS execution-state request only; no synthesized input.
    Es,
    /// Fixed-direction mouse jiggle (out and straight back).
    Mouse,
    /// Random-direction mouse jiggle of the same magnitude.
    MouseRandom,
    /// Press+release of the primary mouse button.
    Click,
    /// Tap a modifier key (no visible effect in applications).
    Key,
    /// Type a character, wait, delete it again.
    Sequence,
}

impl Mode {
    /// Modes that fire every interval regardless of measured idle time.
    ///
    /// The random walk and the scripted sequence exist to fabricate visible
    /// activity, so gating them on the user already being idle would defeat
    /// their purpose.
    pub fn bypasses_idle_gate(self) -> bool {
        matches!(self, Mode::MouseRandom | Mode::Sequence)
    }

    /// The flag spelling of this mode, for log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Es => "es",
            Mode::Mouse => "mouse",
            Mode::MouseRandom => "mouse-random",
            Mode::Click => "click",
            Mode::Key => "key",
            Mode::Sequence => "sequence",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Time between main-scheduler firings. Zero means "fire on every poll
    /// tick".
    pub interval: Duration,
    /// Pixel magnitude for the jiggle and random-walk actions (1..=1000).
    pub jiggle_pixels: i32,
    /// Gated modes fire only once measured idle time reaches this value.
    /// Zero disables the gate entirely.
    pub idle_threshold: Duration,
    /// Repetitions of the action per firing (1..=10).
    pub actions_per_interval: u32,
    pub aux_mouse: AuxMouseConfig,
}

/// Sub-configuration for the auxiliary mover.
#[derive(Debug, Clone, Copy)]
pub struct AuxMouseConfig {
    pub enabled: bool,
    pub interval: Duration,
    /// Displacement magnitude in pixels (1..=1000).
    pub pixels: i32,
    /// Random-direction displacement instead of the fixed jiggle.
    pub random: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Es,
            interval: DEFAULT_INTERVAL,
            jiggle_pixels: DEFAULT_PIXELS,
            idle_threshold: Duration::ZERO,
            actions_per_interval: 1,
            aux_mouse: AuxMouseConfig::default(),
        }
    }
}

impl Default for AuxMouseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_AUX_INTERVAL,
            pixels: DEFAULT_PIXELS,
            random: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_behavior() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Es);
        assert_eq!(config.interval, Duration::from_secs(120));
        assert_eq!(config.jiggle_pixels, 2);
        assert_eq!(config.idle_threshold, Duration::ZERO);
        assert_eq!(config.actions_per_interval, 1);
        assert!(!config.aux_mouse.enabled);
    }

    #[test]
    fn only_random_walk_and_sequence_bypass_the_gate() {
        assert!(Mode::MouseRandom.bypasses_idle_gate());
        assert!(Mode::Sequence.bypasses_idle_gate());
        assert!(!Mode::Es.bypasses_idle_gate());
        assert!(!Mode::Mouse.bypasses_idle_gate());
        assert!(!Mode::Click.bypasses_idle_gate());
        assert!(!Mode::Key.bypasses_idle_gate());
    }

    #[test]
    fn mode_spelling_matches_flag_values() {
        assert_eq!(Mode::Es.as_str(), "es");
        assert_eq!(Mode::MouseRandom.as_str(), "mouse-random");
        assert_eq!(Mode::Sequence.as_str(), "sequence");
    }
}
