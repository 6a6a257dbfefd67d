//! Windows platform backend: SendInput injection, SetThreadExecutionState
//! awake hold, GetLastInputInfo idle probe.
//!
//! Factory functions return boxed trait objects backed by `WindowsEmitter`
//! and `WindowsIdleProbe`. Neither needs construction-time checks: the APIs
//! involved exist on every supported Windows version and require no special
//! permissions.

mod emitter;
mod probe;

use emitter::WindowsEmitter;
use probe::WindowsIdleProbe;

use crate::platform::{IdleProbe, InputEmitter, PlatformError};

/// Returns the `GetLastInputInfo`-based idle probe.
pub fn create_idle_probe() -> Result<Box<dyn IdleProbe>, PlatformError> {
    Ok(Box::new(WindowsIdleProbe))
}

/// Returns the `SendInput`-based emitter.
pub fn create_input_emitter() -> Result<Box<dyn InputEmitter>, PlatformError> {
    Ok(Box::new(WindowsEmitter))
}
