//! macOS input emitter via CGEventPost and IOPMAssertion.
//!
//! Injection is synchronous: each call creates a `CGEvent`, posts it at the
//! session tap, and releases it before returning. Relative cursor motion is
//! expressed as a mouse-moved event at the current location plus the delta,
//! read back from a fresh query event.
//!
//! The awake hold is a `PreventUserIdleDisplaySleep` power-management
//! assertion. The assertion id is kept behind a mutex so hold and release
//! stay idempotent no matter which thread calls them.

use std::ffi::c_void;
use std::ptr;
use std::sync::Mutex;

use crate::platform::{InputEmitter, Key, PlatformError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// CGEventTapLocation: kCGSessionEventTap -- post into the current login
/// session, downstream of the HID system.
const CG_SESSION_EVENT_TAP: u32 = 1;

/// kCGEventSourceStateHIDSystemState -- use the real HID hardware state.
const CG_EVENT_SOURCE_STATE_HID_SYSTEM_STATE: i32 = 1;

/// CGEventType values for the events this emitter posts.
const CG_EVENT_LEFT_MOUSE_DOWN: u32 = 1;
const CG_EVENT_LEFT_MOUSE_UP: u32 = 2;
const CG_EVENT_MOUSE_MOVED: u32 = 5;

/// kCGMouseButtonLeft.
const CG_MOUSE_BUTTON_LEFT: u32 = 0;

/// kCFStringEncodingUTF8.
const CF_STRING_ENCODING_UTF8: u32 = 0x0800_0100;

/// kIOPMAssertionLevelOn.
const IOPM_ASSERTION_LEVEL_ON: u32 = 255;

/// IOPMAssertionCreateWithName success (kIOReturnSuccess).
const IO_RETURN_SUCCESS: i32 = 0;

/// IOPMAssertionType and human-readable reason, as NUL-terminated C strings.
const ASSERTION_TYPE: &[u8] = b"PreventUserIdleDisplaySleep\0";
const ASSERTION_REASON: &[u8] = b"noidle is holding the session awake\0";

/// Virtual key codes (kVK_* namespace): Shift, ANSI A, Delete (backspace).
fn virtual_key(key: Key) -> u16 {
    match key {
        Key::Shift => 56,
        Key::A => 0,
        Key::Backspace => 51,
    }
}

// ---------------------------------------------------------------------------
// Raw FFI
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

type CGEventRef = *mut c_void;
type CGEventSourceRef = *mut c_void;
type CFStringRef = *const c_void;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventSourceCreate(state_id: i32) -> CGEventSourceRef;
    fn CGEventCreate(source: CGEventSourceRef) -> CGEventRef;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventCreateMouseEvent(
        source: CGEventSourceRef,
        mouse_type: u32,
        position: CGPoint,
        button: u32,
    ) -> CGEventRef;
    fn CGEventCreateKeyboardEvent(
        source: CGEventSourceRef,
        virtual_key: u16,
        key_down: bool,
    ) -> CGEventRef;
    fn CGEventPost(tap_location: u32, event: CGEventRef);
    fn AXIsProcessTrusted() -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFStringCreateWithCString(
        alloc: *const c_void,
        c_str: *const i8,
        encoding: u32,
    ) -> CFStringRef;
    fn CFRelease(cf: *const c_void);
}

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOPMAssertionCreateWithName(
        assertion_type: CFStringRef,
        assertion_level: u32,
        assertion_name: CFStringRef,
        assertion_id: *mut u32,
    ) -> i32;
    fn IOPMAssertionRelease(assertion_id: u32) -> i32;
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Emitter backed by Quartz event injection and IOKit power assertions.
pub struct MacEmitter {
    /// Active power assertion id, if held.
    assertion: Mutex<Option<u32>>,
}

impl MacEmitter {
    pub fn new() -> Self {
        if !unsafe { AXIsProcessTrusted() } {
            log::warn!(
                "emitter: Accessibility permission not granted; synthesized \
                 input will be ignored (System Settings > Privacy & Security \
                 > Accessibility)"
            );
        }
        Self {
            assertion: Mutex::new(None),
        }
    }

    /// Current cursor position, read from a fresh query event.
    fn cursor_location(&self) -> Result<CGPoint, PlatformError> {
        unsafe {
            let event = CGEventCreate(ptr::null_mut());
            if event.is_null() {
                return Err(PlatformError::Other("CGEventCreate returned null".into()));
            }
            let location = CGEventGetLocation(event);
            CFRelease(event.cast::<c_void>());
            Ok(location)
        }
    }

    /// Posts one mouse event of `mouse_type` at `position`.
    fn post_mouse(&self, mouse_type: u32, position: CGPoint) -> Result<(), PlatformError> {
        unsafe {
            let event = CGEventCreateMouseEvent(
                ptr::null_mut(),
                mouse_type,
                position,
                CG_MOUSE_BUTTON_LEFT,
            );
            if event.is_null() {
                return Err(PlatformError::Other(
                    "CGEventCreateMouseEvent returned null".into(),
                ));
            }
            CGEventPost(CG_SESSION_EVENT_TAP, event);
            CFRelease(event.cast::<c_void>());
        }
        Ok(())
    }

    /// Posts one keyboard event from the HID system state source.
    fn post_key(&self, key: Key, key_down: bool) -> Result<(), PlatformError> {
        unsafe {
            let source = CGEventSourceCreate(CG_EVENT_SOURCE_STATE_HID_SYSTEM_STATE);
            if source.is_null() {
                return Err(PlatformError::Other(
                    "CGEventSourceCreate returned null".into(),
                ));
            }
            let event = CGEventCreateKeyboardEvent(source, virtual_key(key), key_down);
            if event.is_null() {
                CFRelease(source.cast::<c_void>());
                return Err(PlatformError::Other(
                    "CGEventCreateKeyboardEvent returned null".into(),
                ));
            }
            CGEventPost(CG_SESSION_EVENT_TAP, event);
            CFRelease(event.cast::<c_void>());
            CFRelease(source.cast::<c_void>());
        }
        Ok(())
    }

    fn lock_assertion(&self) -> Result<std::sync::MutexGuard<'_, Option<u32>>, PlatformError> {
        self.assertion
            .lock()
            .map_err(|_| PlatformError::Other("assertion mutex poisoned".into()))
    }
}

// ---------------------------------------------------------------------------
// InputEmitter trait impl
// ---------------------------------------------------------------------------

impl InputEmitter for MacEmitter {
    /// Creates the `PreventUserIdleDisplaySleep` assertion. A refresh while
    /// already held is a no-op; the existing assertion keeps working.
    fn hold_system_awake(&self) -> Result<(), PlatformError> {
        let mut guard = self.lock_assertion()?;
        if guard.is_some() {
            return Ok(());
        }

        let mut id: u32 = 0;
        let status = unsafe {
            let cf_type = CFStringCreateWithCString(
                ptr::null(),
                ASSERTION_TYPE.as_ptr().cast(),
                CF_STRING_ENCODING_UTF8,
            );
            let cf_reason = CFStringCreateWithCString(
                ptr::null(),
                ASSERTION_REASON.as_ptr().cast(),
                CF_STRING_ENCODING_UTF8,
            );
            let status =
                IOPMAssertionCreateWithName(cf_type, IOPM_ASSERTION_LEVEL_ON, cf_reason, &mut id);
            CFRelease(cf_reason);
            CFRelease(cf_type);
            status
        };

        if status != IO_RETURN_SUCCESS {
            return Err(PlatformError::Other(format!(
                "IOPMAssertionCreateWithName failed: {status:#x}"
            )));
        }
        *guard = Some(id);
        Ok(())
    }

    /// Releases the assertion if held; releasing an unheld state is a no-op.
    fn release_awake_hold(&self) -> Result<(), PlatformError> {
        let mut guard = self.lock_assertion()?;
        if let Some(id) = guard.take() {
            let status = unsafe { IOPMAssertionRelease(id) };
            if status != IO_RETURN_SUCCESS {
                return Err(PlatformError::Other(format!(
                    "IOPMAssertionRelease failed: {status:#x}"
                )));
            }
        }
        Ok(())
    }

    fn move_cursor_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        let here = self.cursor_location()?;
        let target = CGPoint {
            x: here.x + f64::from(dx),
            y: here.y + f64::from(dy),
        };
        self.post_mouse(CG_EVENT_MOUSE_MOVED, target)
    }

    fn click_left_button(&self) -> Result<(), PlatformError> {
        let here = self.cursor_location()?;
        self.post_mouse(CG_EVENT_LEFT_MOUSE_DOWN, here)?;
        self.post_mouse(CG_EVENT_LEFT_MOUSE_UP, here)
    }

    fn tap_key(&self, key: Key) -> Result<(), PlatformError> {
        self.post_key(key, true)?;
        self.post_key(key, false)
    }

    fn press_key(&self, key: Key) -> Result<(), PlatformError> {
        self.post_key(key, true)
    }

    fn release_key(&self, key: Key) -> Result<(), PlatformError> {
        self.post_key(key, false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_mapping_covers_the_three_action_keys() {
        assert_eq!(virtual_key(Key::Shift), 56);
        assert_eq!(virtual_key(Key::A), 0);
        assert_eq!(virtual_key(Key::Backspace), 51);
    }
}
