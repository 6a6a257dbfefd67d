//! X11 backend: XTEST injection and MIT-SCREEN-SAVER idle queries.
//!
//! Both components verify their extension at construction so a server
//! without XTEST or MIT-SCREEN-SAVER surfaces as one clear startup error
//! instead of silent per-call failures. The emitter resolves the keycodes
//! for its three action keys from the server's keyboard mapping up front,
//! for the same reason.

use std::time::Duration;

use x11rb::connection::Connection;
use x11rb::protocol::screensaver::ConnectionExt as _;
use x11rb::protocol::xproto::{
    ConnectionExt as _, Keycode, Window, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT,
    KEY_PRESS_EVENT, KEY_RELEASE_EVENT, MOTION_NOTIFY_EVENT,
};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

use crate::platform::{IdleProbe, InputEmitter, Key, PlatformError};

/// X11 keysyms for the three action keys.
const XK_SHIFT_L: u32 = 0xffe1;
const XK_A_LOWER: u32 = 0x0061;
const XK_BACKSPACE: u32 = 0xff08;

/// Core-protocol button number of the primary button.
const LEFT_BUTTON: u8 = 1;

fn connect() -> Result<(RustConnection, Window), PlatformError> {
    let (conn, screen_num) = x11rb::connect(None)
        .map_err(|err| PlatformError::Unavailable(format!("cannot connect to X server: {err}")))?;
    let root = conn.setup().roots[screen_num].root;
    Ok((conn, root))
}

fn request_failed(err: impl std::fmt::Display) -> PlatformError {
    PlatformError::Other(format!("X11 request failed: {err}"))
}

// ---------------------------------------------------------------------------
// Idle probe
// ---------------------------------------------------------------------------

/// Idle probe backed by the MIT-SCREEN-SAVER extension's per-server idle
/// counter.
pub struct X11IdleProbe {
    conn: RustConnection,
    root: Window,
}

impl X11IdleProbe {
    pub fn new() -> Result<Self, PlatformError> {
        let (conn, root) = connect()?;
        conn.screensaver_query_version(1, 0)
            .map_err(request_failed)?
            .reply()
            .map_err(|err| {
                PlatformError::Unavailable(format!("MIT-SCREEN-SAVER extension missing: {err}"))
            })?;
        Ok(Self { conn, root })
    }
}

impl IdleProbe for X11IdleProbe {
    fn idle_duration(&self) -> Duration {
        let ms = self
            .conn
            .screensaver_query_info(self.root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.ms_since_user_input)
            .unwrap_or(0);
        Duration::from_millis(u64::from(ms))
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Emitter backed by XTEST fake input. The awake hold suspends the X
/// screensaver countdown for as long as it is held.
pub struct X11Emitter {
    conn: RustConnection,
    root: Window,
    shift: Keycode,
    a: Keycode,
    backspace: Keycode,
}

impl X11Emitter {
    pub fn new() -> Result<Self, PlatformError> {
        let (conn, root) = connect()?;
        conn.xtest_get_version(2, 2)
            .map_err(request_failed)?
            .reply()
            .map_err(|err| {
                PlatformError::Unavailable(format!("XTEST extension missing: {err}"))
            })?;

        let shift = resolve_keycode(&conn, XK_SHIFT_L)?;
        let a = resolve_keycode(&conn, XK_A_LOWER)?;
        let backspace = resolve_keycode(&conn, XK_BACKSPACE)?;
        Ok(Self {
            conn,
            root,
            shift,
            a,
            backspace,
        })
    }

    fn keycode(&self, key: Key) -> Keycode {
        match key {
            Key::Shift => self.shift,
            Key::A => self.a,
            Key::Backspace => self.backspace,
        }
    }

    /// One XTEST fake event, checked for an error reply so failures surface
    /// to the caller instead of dying on the connection later.
    fn fake_input(&self, kind: u8, detail: u8, x: i16, y: i16) -> Result<(), PlatformError> {
        self.conn
            .xtest_fake_input(kind, detail, x11rb::CURRENT_TIME, self.root, x, y, 0)
            .map_err(request_failed)?
            .check()
            .map_err(request_failed)
    }
}

/// Finds the first keycode whose keysym column contains `keysym`.
fn resolve_keycode(conn: &RustConnection, keysym: u32) -> Result<Keycode, PlatformError> {
    let setup = conn.setup();
    let (min, max) = (setup.min_keycode, setup.max_keycode);
    let mapping = conn
        .get_keyboard_mapping(min, max - min + 1)
        .map_err(request_failed)?
        .reply()
        .map_err(request_failed)?;

    let per_keycode = usize::from(mapping.keysyms_per_keycode);
    for (index, keysyms) in mapping.keysyms.chunks(per_keycode).enumerate() {
        if keysyms.contains(&keysym) {
            return Ok(min + index as u8);
        }
    }
    Err(PlatformError::Unavailable(format!(
        "no X11 keycode maps keysym {keysym:#06x}"
    )))
}

impl InputEmitter for X11Emitter {
    /// Suspends the screensaver countdown. Repeat calls stack in the server
    /// per client, so refreshing while held is safe.
    fn hold_system_awake(&self) -> Result<(), PlatformError> {
        self.conn
            .screensaver_suspend(1)
            .map_err(request_failed)?
            .check()
            .map_err(request_failed)
    }

    fn release_awake_hold(&self) -> Result<(), PlatformError> {
        self.conn
            .screensaver_suspend(0)
            .map_err(request_failed)?
            .check()
            .map_err(request_failed)
    }

    fn move_cursor_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        // Non-zero detail marks the motion as relative. Configured pixel
        // magnitudes are bounded well inside i16.
        self.fake_input(MOTION_NOTIFY_EVENT, 1, dx as i16, dy as i16)
    }

    fn click_left_button(&self) -> Result<(), PlatformError> {
        self.fake_input(BUTTON_PRESS_EVENT, LEFT_BUTTON, 0, 0)?;
        self.fake_input(BUTTON_RELEASE_EVENT, LEFT_BUTTON, 0, 0)
    }

    fn tap_key(&self, key: Key) -> Result<(), PlatformError> {
        self.press_key(key)?;
        self.release_key(key)
    }

    fn press_key(&self, key: Key) -> Result<(), PlatformError> {
        self.fake_input(KEY_PRESS_EVENT, self.keycode(key), 0, 0)
    }

    fn release_key(&self, key: Key) -> Result<(), PlatformError> {
        self.fake_input(KEY_RELEASE_EVENT, self.keycode(key), 0, 0)
    }
}
