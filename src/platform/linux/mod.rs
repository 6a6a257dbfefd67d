//! Linux platform backend.
//!
//! Two paths, selected by display-server detection at startup:
//!
//! - X11: XTEST injection, MIT-SCREEN-SAVER idle queries and saver
//!   suspension, all over one `x11rb` connection per component.
//! - Wayland: xdg-desktop-portal RemoteDesktop portal for injection and the
//!   Inhibit portal for the awake hold. The portals expose no idle counter,
//!   so the Wayland idle probe reports zero and gated modes degrade to
//!   "never fire".

mod detect;
mod wayland;
mod x11;

use detect::{detect_display_server, DisplayServer};
use wayland::{WaylandEmitter, WaylandIdleProbe};
use x11::{X11Emitter, X11IdleProbe};

use crate::platform::{IdleProbe, InputEmitter, PlatformError};

fn no_display() -> PlatformError {
    PlatformError::Unavailable(
        "no display server detected (neither WAYLAND_DISPLAY nor DISPLAY is set)".into(),
    )
}

// ---------------------------------------------------------------------------
// Factory: idle probe
// ---------------------------------------------------------------------------

/// Returns the idle probe for the current session.
pub fn create_idle_probe() -> Result<Box<dyn IdleProbe>, PlatformError> {
    match detect_display_server() {
        Some(DisplayServer::Wayland) => Ok(Box::new(WaylandIdleProbe::new())),
        Some(DisplayServer::X11) => Ok(Box::new(X11IdleProbe::new()?)),
        None => Err(no_display()),
    }
}

// ---------------------------------------------------------------------------
// Factory: input emitter
// ---------------------------------------------------------------------------

/// Returns the input emitter for the current session.
pub fn create_input_emitter() -> Result<Box<dyn InputEmitter>, PlatformError> {
    match detect_display_server() {
        Some(DisplayServer::Wayland) => {
            WaylandEmitter::new().map(|emitter| Box::new(emitter) as Box<dyn InputEmitter>)
        }
        Some(DisplayServer::X11) => {
            X11Emitter::new().map(|emitter| Box::new(emitter) as Box<dyn InputEmitter>)
        }
        None => Err(no_display()),
    }
}
