//! macOS platform backend: CGEventPost injection, IOPMAssertion awake hold,
//! CGEventSource idle probe.
//!
//! Synthesizing events requires the Accessibility permission (System
//! Settings > Privacy & Security > Accessibility). Construction checks
//! `AXIsProcessTrusted` and warns when the permission is missing; the
//! emitter still starts, since the `es`-style awake hold works without it.

mod emitter;
mod probe;

use emitter::MacEmitter;
use probe::MacIdleProbe;

use crate::platform::{IdleProbe, InputEmitter, PlatformError};

/// Returns the `CGEventSourceSecondsSinceLastEventType`-based idle probe.
pub fn create_idle_probe() -> Result<Box<dyn IdleProbe>, PlatformError> {
    Ok(Box::new(MacIdleProbe))
}

/// Returns the `CGEventPost`-based emitter.
pub fn create_input_emitter() -> Result<Box<dyn InputEmitter>, PlatformError> {
    Ok(Box::new(MacEmitter::new()))
}
