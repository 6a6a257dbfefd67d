//! Command-line surface.
//!
//! All validation happens here, before any loop starts: range-checked
//! numeric flags, the closed mode set, and the flexible duration syntax.
//! Exit codes follow the tool's contract (0 for help/version, 1 for any
//! argument error) rather than clap's default of 2, so `parse_or_exit`
//! wraps `try_parse`.

use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use crate::config::{AuxMouseConfig, Config, Mode, DEFAULT_PIXELS};
use crate::durationfmt::parse_duration;

const DURATION_HELP: &str = "Duration values accept bare seconds (120), clock \
notation (00:02:00), or a suffixed integer (90s, 5m, 1h).";

// ---------------------------------------------------------------------------
// Flag definitions
// ---------------------------------------------------------------------------

/// Keeps a workstation from being marked idle or away.
#[derive(Debug, Parser)]
#[command(name = "noidle", version, after_help = DURATION_HELP)]
#[command(about = "Prevents idle/away status by refreshing the OS idle state \
and optionally synthesizing minimal input")]
pub struct Cli {
    /// Action performed each interval
    #[arg(long, value_enum, default_value_t = Mode::Es)]
    mode: Mode,

    /// Time between actions
    #[arg(long, value_name = "VALUE", value_parser = parse_duration, default_value = "2m")]
    interval: Duration,

    /// For gated modes, act only once the user has been idle this long
    /// (0 = act unconditionally)
    #[arg(long, value_name = "VALUE", value_parser = parse_duration, default_value = "0")]
    idle_threshold: Duration,

    /// Mouse displacement magnitude in pixels
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PIXELS,
          value_parser = clap::value_parser!(i32).range(1..=1000))]
    jiggle_pixels: i32,

    /// Times the action repeats each interval
    #[arg(long, value_name = "N", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..=10))]
    actions: u32,

    /// Enable the independent auxiliary mouse mover
    #[arg(long)]
    mouse_on: bool,

    /// Auxiliary mover interval
    #[arg(long, value_name = "VALUE", value_parser = parse_duration, default_value = "30s")]
    mouse_interval: Duration,

    /// Auxiliary mover displacement in pixels
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PIXELS,
          value_parser = clap::value_parser!(i32).range(1..=1000))]
    mouse_pixels: i32,

    /// Use random-direction displacements in the auxiliary mover
    #[arg(long, value_name = "true|false", action = ArgAction::Set, default_value_t = false)]
    mouse_random: bool,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            mode: self.mode,
            interval: self.interval,
            jiggle_pixels: self.jiggle_pixels,
            idle_threshold: self.idle_threshold,
            actions_per_interval: self.actions,
            aux_mouse: AuxMouseConfig {
                enabled: self.mouse_on,
                interval: self.mouse_interval,
                pixels: self.mouse_pixels,
                random: self.mouse_random,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point used by main
// ---------------------------------------------------------------------------

/// Parses the process arguments and exits on anything other than a usable
/// configuration: 0 after printing help or the version, 1 after printing an
/// argument error to stderr.
pub fn parse_or_exit() -> Config {
    match Cli::try_parse() {
        Ok(cli) => cli.into_config(),
        Err(err) => {
            let code = exit_code(&err);
            // clap routes help/version to stdout and errors to stderr.
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        let full: Vec<&str> = std::iter::once("noidle").chain(args.iter().copied()).collect();
        Cli::try_parse_from(full).map(Cli::into_config)
    }

    #[test]
    fn no_arguments_yields_documented_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.mode, Mode::Es);
        assert_eq!(config.interval, Duration::from_secs(120));
        assert_eq!(config.jiggle_pixels, 2);
        assert_eq!(config.idle_threshold, Duration::ZERO);
        assert_eq!(config.actions_per_interval, 1);
        assert!(!config.aux_mouse.enabled);
        assert_eq!(config.aux_mouse.interval, Duration::from_secs(30));
        assert_eq!(config.aux_mouse.pixels, 2);
        assert!(!config.aux_mouse.random);
    }

    #[test]
    fn every_mode_spelling_parses() {
        for (flag, mode) in [
            ("es", Mode::Es),
            ("mouse", Mode::Mouse),
            ("mouse-random", Mode::MouseRandom),
            ("click", Mode::Click),
            ("key", Mode::Key),
            ("sequence", Mode::Sequence),
        ] {
            let config = parse(&[&format!("--mode={flag}")]).unwrap();
            assert_eq!(config.mode, mode);
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(parse(&["--mode=wiggle"]).is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse(&["--frequency=10"]).is_err());
    }

    #[test]
    fn jiggle_pixels_bounds() {
        assert!(parse(&["--jiggle-pixels=0"]).is_err());
        assert!(parse(&["--jiggle-pixels=1001"]).is_err());
        assert_eq!(parse(&["--jiggle-pixels=1"]).unwrap().jiggle_pixels, 1);
        assert_eq!(parse(&["--jiggle-pixels=1000"]).unwrap().jiggle_pixels, 1000);
    }

    #[test]
    fn actions_bounds() {
        assert!(parse(&["--actions=0"]).is_err());
        assert!(parse(&["--actions=11"]).is_err());
        assert_eq!(parse(&["--actions=10"]).unwrap().actions_per_interval, 10);
    }

    #[test]
    fn interval_accepts_every_duration_form() {
        assert_eq!(parse(&["--interval=30"]).unwrap().interval, Duration::from_secs(30));
        assert_eq!(parse(&["--interval=5m"]).unwrap().interval, Duration::from_secs(300));
        assert_eq!(
            parse(&["--interval=00:02:00"]).unwrap().interval,
            Duration::from_secs(120)
        );
        assert_eq!(parse(&["--interval=0"]).unwrap().interval, Duration::ZERO);
        assert!(parse(&["--interval=soon"]).is_err());
    }

    #[test]
    fn aux_mover_flags_land_in_the_sub_config() {
        let config = parse(&[
            "--mouse-on",
            "--mouse-interval=45s",
            "--mouse-pixels=7",
            "--mouse-random=true",
        ])
        .unwrap();
        assert!(config.aux_mouse.enabled);
        assert_eq!(config.aux_mouse.interval, Duration::from_secs(45));
        assert_eq!(config.aux_mouse.pixels, 7);
        assert!(config.aux_mouse.random);
    }

    #[test]
    fn mouse_random_requires_an_explicit_value() {
        assert!(parse(&["--mouse-random"]).is_err());
        assert!(!parse(&["--mouse-random=false"]).unwrap().aux_mouse.random);
    }

    #[test]
    fn help_and_version_exit_zero_errors_exit_one() {
        let help = Cli::try_parse_from(["noidle", "--help"]).unwrap_err();
        assert_eq!(exit_code(&help), 0);
        let version = Cli::try_parse_from(["noidle", "-V"]).unwrap_err();
        assert_eq!(exit_code(&version), 0);
        let bad = Cli::try_parse_from(["noidle", "--jiggle-pixels=0"]).unwrap_err();
        assert_eq!(exit_code(&bad), 1);
    }
}
