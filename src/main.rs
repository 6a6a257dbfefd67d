//! noidle -- keeps a workstation from being marked idle or away.
//!
//! Entry point: parses the command line, selects the platform backend, and
//! wires the configuration into the two duty cycles (main scheduler on this
//! thread, auxiliary mover on its own). Owns shutdown: Ctrl+C raises the
//! shared stop flag, both loops drain, and the awake hold is released by
//! the RAII guard on the way out.

mod cli;
mod config;
mod displacement;
mod durationfmt;
mod mover;
mod platform;
mod scheduler;
mod stop;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use config::Config;
use durationfmt::format_duration;
use mover::AuxMover;
use platform::{AwakeHold, InputEmitter, PlatformError};
use scheduler::Scheduler;
use stop::StopFlag;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = cli::parse_or_exit();
    if let Err(err) = run(config) {
        eprintln!("noidle: {err}");
        std::process::exit(1);
    }
}

/// Everything after configuration. The awake-hold guard lives inside this
/// function so its release runs on every exit path before `main` decides
/// the exit code.
fn run(config: Config) -> Result<(), PlatformError> {
    let probe = platform::create_idle_probe()?;
    let emitter: Arc<dyn InputEmitter> = Arc::from(platform::create_input_emitter()?);

    let stop = StopFlag::new();
    let handler_flag = stop.clone();
    ctrlc::set_handler(move || handler_flag.request_stop())
        .map_err(|err| PlatformError::Other(format!("cannot install Ctrl+C handler: {err}")))?;

    log::info!(
        "noidle v{}: mode={} interval={} jiggle={}px actions={} idle-threshold={}",
        env!("CARGO_PKG_VERSION"),
        config.mode.as_str(),
        format_duration(config.interval),
        config.jiggle_pixels,
        config.actions_per_interval,
        format_duration(config.idle_threshold),
    );
    log::info!("press Ctrl+C to stop");

    let _hold = AwakeHold::acquire(emitter.clone());

    let mover = AuxMover::from_config(&config.aux_mouse, emitter.clone(), StdRng::from_entropy())
        .map(|mover| mover.spawn(stop.clone()));

    Scheduler::new(config, probe, emitter, StdRng::from_entropy()).run(&stop);

    if let Some(handle) = mover {
        let _ = handle.join();
    }
    Ok(())
}
