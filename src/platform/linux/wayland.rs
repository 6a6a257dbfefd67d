//! Wayland backend via xdg-desktop-portal.
//!
//! Input goes through the RemoteDesktop portal and the awake hold through
//! the Inhibit portal. `WaylandEmitter::new()` spawns a background thread
//! that owns a single-threaded tokio runtime; that runtime establishes the
//! portal session and then loops over emitter commands.
//!
//! Trait methods enqueue commands with the non-blocking `try_send()`, so
//! both duty cycles can call them without ever waiting on D-Bus. The first
//! commands may be queued before the session is ready; the portal task
//! drains them once setup completes.
//!
//! The first run pops the compositor's permission dialog. The restore token
//! from the grant is persisted under the XDG config directory so later runs
//! skip the dialog.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use ashpd::desktop::inhibit::{InhibitFlags, InhibitProxy};
use ashpd::desktop::remote_desktop::{DeviceType, KeyState, RemoteDesktop};
use ashpd::desktop::{PersistMode, Request};
use tokio::sync::mpsc;

use crate::platform::{IdleProbe, InputEmitter, Key, PlatformError};

/// Linux evdev key codes for the three action keys (KEY_LEFTSHIFT, KEY_A,
/// KEY_BACKSPACE).
fn evdev_code(key: Key) -> i32 {
    match key {
        Key::Shift => 42,
        Key::A => 30,
        Key::Backspace => 14,
    }
}

/// evdev button code of the primary button (BTN_LEFT).
const BTN_LEFT: i32 = 0x110;

/// Channel capacity for pending emitter commands. The duty cycles emit a
/// handful of events per interval, so this never fills in practice.
const CMD_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Idle probe
// ---------------------------------------------------------------------------

/// Wayland idle probe. The portals expose no idle counter, so this always
/// reports zero and gated modes degrade to "never fire".
pub struct WaylandIdleProbe;

impl WaylandIdleProbe {
    pub fn new() -> Self {
        log::warn!(
            "probe: Wayland exposes no idle counter; idle-gated modes will \
             not fire (use --idle-threshold=0)"
        );
        WaylandIdleProbe
    }
}

impl IdleProbe for WaylandIdleProbe {
    fn idle_duration(&self) -> Duration {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Internal command type
// ---------------------------------------------------------------------------

/// One emitter operation, shipped from a trait method to the portal task.
enum PortalCmd {
    Hold,
    Release,
    Move { dx: f64, dy: f64 },
    Click,
    Key { keycode: i32, state: KeyState },
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Emitter backed by the RemoteDesktop and Inhibit portals.
///
/// Holds the sending half of the command channel; the portal session lives
/// on the background thread for the process lifetime.
pub struct WaylandEmitter {
    cmd_tx: mpsc::Sender<PortalCmd>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WaylandEmitter {
    pub fn new() -> Result<Self, PlatformError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PortalCmd>(CMD_CAPACITY);

        let thread = thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    log::error!("emitter: failed to build tokio runtime: {err}");
                    return;
                }
            };
            rt.block_on(run_portal_task(cmd_rx));
        });

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Enqueues one command without blocking. A full channel drops the
    /// event (the next interval retries anyway); a closed channel means the
    /// portal task died and is reported to the caller.
    fn send(&self, cmd: PortalCmd) -> Result<(), PlatformError> {
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("emitter: portal command channel full, event dropped");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(PlatformError::Other("portal session closed".into()))
            }
        }
    }
}

impl Drop for WaylandEmitter {
    fn drop(&mut self) {
        // Dropping cmd_tx closes the channel; the portal task drops any
        // active inhibition and exits. The thread is detached.
        drop(self.thread.take());
    }
}

impl InputEmitter for WaylandEmitter {
    fn hold_system_awake(&self) -> Result<(), PlatformError> {
        self.send(PortalCmd::Hold)
    }

    fn release_awake_hold(&self) -> Result<(), PlatformError> {
        self.send(PortalCmd::Release)
    }

    fn move_cursor_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        self.send(PortalCmd::Move {
            dx: f64::from(dx),
            dy: f64::from(dy),
        })
    }

    fn click_left_button(&self) -> Result<(), PlatformError> {
        self.send(PortalCmd::Click)
    }

    fn tap_key(&self, key: Key) -> Result<(), PlatformError> {
        self.press_key(key)?;
        self.release_key(key)
    }

    fn press_key(&self, key: Key) -> Result<(), PlatformError> {
        self.send(PortalCmd::Key {
            keycode: evdev_code(key),
            state: KeyState::Pressed,
        })
    }

    fn release_key(&self, key: Key) -> Result<(), PlatformError> {
        self.send(PortalCmd::Key {
            keycode: evdev_code(key),
            state: KeyState::Released,
        })
    }
}

// ---------------------------------------------------------------------------
// Async portal task
// ---------------------------------------------------------------------------

/// Runs on the background thread's tokio runtime until the command channel
/// closes (emitter dropped).
async fn run_portal_task(mut cmd_rx: mpsc::Receiver<PortalCmd>) {
    if let Err(err) = portal_loop(&mut cmd_rx).await {
        log::error!("emitter: {err}");
    }
}

async fn portal_loop(
    cmd_rx: &mut mpsc::Receiver<PortalCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let portal = RemoteDesktop::new().await?;
    let session = portal.create_session().await?;

    // Reuse a previously saved restore token so the permission dialog is
    // skipped on runs after the initial grant.
    let saved_token = load_restore_token();
    portal
        .select_devices(
            &session,
            DeviceType::Keyboard | DeviceType::Pointer,
            saved_token.as_deref(),
            // ExplicitlyRevoked: the portal keeps the grant indefinitely and
            // returns a restore token to reuse on the next start.
            PersistMode::ExplicitlyRevoked,
        )
        .await?;

    let start_response = portal.start(&session, None).await?;
    if let Some(token) = start_response.response()?.restore_token() {
        save_restore_token(token);
    }

    log::info!("emitter: RemoteDesktop session active");

    // Active Inhibit request, if any. Dropping or closing it releases the
    // inhibition on the portal side.
    let mut inhibit: Option<Request<()>> = None;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            PortalCmd::Hold => {
                // Refresh while held is a no-op; the request stays active.
                if inhibit.is_none() {
                    match inhibit_idle().await {
                        Ok(request) => {
                            log::debug!("emitter: session inhibition active");
                            inhibit = Some(request);
                        }
                        Err(err) => log::warn!("emitter: Inhibit portal failed: {err}"),
                    }
                }
            }
            PortalCmd::Release => {
                if let Some(request) = inhibit.take() {
                    if let Err(err) = request.close().await {
                        log::debug!("emitter: closing inhibition failed: {err}");
                    }
                }
            }
            PortalCmd::Move { dx, dy } => {
                if let Err(err) = portal.notify_pointer_motion(&session, dx, dy).await {
                    log::warn!("emitter: notify_pointer_motion failed: {err}");
                }
            }
            PortalCmd::Click => {
                for state in [KeyState::Pressed, KeyState::Released] {
                    if let Err(err) = portal.notify_pointer_button(&session, BTN_LEFT, state).await
                    {
                        log::warn!("emitter: notify_pointer_button failed: {err}");
                    }
                }
            }
            PortalCmd::Key { keycode, state } => {
                if let Err(err) = portal
                    .notify_keyboard_keycode(&session, keycode, state)
                    .await
                {
                    log::warn!("emitter: notify_keyboard_keycode failed: {err}");
                }
            }
        }
    }

    log::info!("emitter: command channel closed, exiting");
    Ok(())
}

/// Asks the Inhibit portal to suppress the session idle transition. The
/// inhibition lasts until the returned request is closed or dropped.
async fn inhibit_idle() -> ashpd::Result<Request<()>> {
    let proxy = InhibitProxy::new().await?;
    proxy
        .inhibit(None, InhibitFlags::Idle.into(), "holding the session awake")
        .await
}

// ---------------------------------------------------------------------------
// Restore token helpers
// ---------------------------------------------------------------------------

/// Returns the path used to persist the RemoteDesktop restore token.
///
/// Respects `$XDG_CONFIG_HOME`; falls back to `$HOME/.config`.
fn token_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| {
                let mut path = PathBuf::from(home);
                path.push(".config");
                path
            })
        })?;
    Some(config_dir.join("noidle").join("remote-desktop-token"))
}

/// Reads the restore token from disk. Returns `None` if the file is absent
/// or cannot be read.
fn load_restore_token() -> Option<String> {
    let path = token_path()?;
    match std::fs::read_to_string(&path) {
        Ok(token) => {
            let trimmed = token.trim().to_owned();
            if trimmed.is_empty() {
                None
            } else {
                log::debug!("emitter: loaded restore token from {}", path.display());
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Writes the restore token to disk, creating the parent directory if
/// needed.
fn save_restore_token(token: &str) {
    let Some(path) = token_path() else { return };
    if let Some(dir) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(dir) {
            log::warn!("emitter: could not create config dir {}: {err}", dir.display());
            return;
        }
    }
    match std::fs::write(&path, token) {
        Ok(()) => log::debug!("emitter: restore token saved to {}", path.display()),
        Err(err) => log::warn!("emitter: could not save restore token: {err}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter_with_channel(capacity: usize) -> (WaylandEmitter, mpsc::Receiver<PortalCmd>) {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PortalCmd>(capacity);
        (
            WaylandEmitter {
                cmd_tx,
                thread: None,
            },
            cmd_rx,
        )
    }

    #[test]
    fn full_channel_drops_the_event_without_error() {
        let (emitter, _cmd_rx) = emitter_with_channel(1);
        assert!(emitter.click_left_button().is_ok());
        // The channel is now full; the overflow is dropped, not an error.
        assert!(emitter.move_cursor_relative(1, 1).is_ok());
    }

    #[test]
    fn closed_channel_surfaces_as_an_error() {
        let (emitter, cmd_rx) = emitter_with_channel(1);
        drop(cmd_rx);
        assert!(emitter.click_left_button().is_err());
    }

    #[test]
    fn tap_enqueues_press_then_release() {
        let (emitter, mut cmd_rx) = emitter_with_channel(4);
        emitter.tap_key(Key::Shift).unwrap();
        for expected in [KeyState::Pressed, KeyState::Released] {
            match cmd_rx.try_recv().unwrap() {
                PortalCmd::Key { keycode, state } => {
                    assert_eq!(keycode, 42);
                    assert!(matches!(
                        (state, expected),
                        (KeyState::Pressed, KeyState::Pressed)
                            | (KeyState::Released, KeyState::Released)
                    ));
                }
                _ => panic!("expected a key command"),
            }
        }
    }

    #[test]
    fn idle_probe_always_reports_zero() {
        assert_eq!(WaylandIdleProbe.idle_duration(), Duration::ZERO);
    }
}
