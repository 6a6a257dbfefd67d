//! Windows input emitter via SendInput and SetThreadExecutionState.
//!
//! Injection is synchronous: `SendInput` returns after the event is queued,
//! so no background thread is needed.
//!
//! The awake hold uses `SetThreadExecutionState` with `ES_CONTINUOUS`,
//! which is per-thread state: the hold, its refreshes, and the release all
//! run on the main thread (the scheduler and the RAII guard both live
//! there), so the request stays attached to one thread for the process
//! lifetime. Releasing clears back to `ES_CONTINUOUS` alone, returning
//! sleep management to Windows; releasing an unheld state is harmless.

use windows_sys::Win32::System::Power::{
    SetThreadExecutionState, ES_CONTINUOUS, ES_DISPLAY_REQUIRED, ES_SYSTEM_REQUIRED,
};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_KEYUP,
    MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEINPUT, VK_BACK, VK_SHIFT,
};

use crate::platform::{InputEmitter, Key, PlatformError};

/// Emitter backed by `SendInput` and `SetThreadExecutionState`. Stateless:
/// each call builds the `INPUT` records and submits them synchronously.
pub struct WindowsEmitter;

/// Virtual-key code for the given key. `A` has no named constant in the
/// VK namespace; ASCII uppercase letters are their own codes.
fn vk_code(key: Key) -> u16 {
    match key {
        Key::Shift => VK_SHIFT,
        Key::A => 0x41,
        Key::Backspace => VK_BACK,
    }
}

fn mouse_input(dx: i32, dy: i32, flags: u32) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn key_input(vk: u16, flags: u32) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl WindowsEmitter {
    fn send(&self, inputs: &[INPUT]) -> Result<(), PlatformError> {
        let sent = unsafe {
            SendInput(
                inputs.len() as u32,
                inputs.as_ptr(),
                std::mem::size_of::<INPUT>() as i32,
            )
        };
        if sent != inputs.len() as u32 {
            return Err(PlatformError::Other(format!(
                "SendInput queued {sent} of {} events",
                inputs.len()
            )));
        }
        Ok(())
    }

    fn set_execution_state(&self, flags: u32) -> Result<(), PlatformError> {
        // Returns the previous state, or 0 on failure.
        if unsafe { SetThreadExecutionState(flags) } == 0 {
            return Err(PlatformError::Other(
                "SetThreadExecutionState failed".into(),
            ));
        }
        Ok(())
    }
}

impl InputEmitter for WindowsEmitter {
    fn hold_system_awake(&self) -> Result<(), PlatformError> {
        self.set_execution_state(ES_CONTINUOUS | ES_SYSTEM_REQUIRED | ES_DISPLAY_REQUIRED)
    }

    fn release_awake_hold(&self) -> Result<(), PlatformError> {
        self.set_execution_state(ES_CONTINUOUS)
    }

    fn move_cursor_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        self.send(&[mouse_input(dx, dy, MOUSEEVENTF_MOVE)])
    }

    fn click_left_button(&self) -> Result<(), PlatformError> {
        self.send(&[
            mouse_input(0, 0, MOUSEEVENTF_LEFTDOWN),
            mouse_input(0, 0, MOUSEEVENTF_LEFTUP),
        ])
    }

    fn tap_key(&self, key: Key) -> Result<(), PlatformError> {
        let vk = vk_code(key);
        self.send(&[key_input(vk, 0), key_input(vk, KEYEVENTF_KEYUP)])
    }

    fn press_key(&self, key: Key) -> Result<(), PlatformError> {
        self.send(&[key_input(vk_code(key), 0)])
    }

    fn release_key(&self, key: Key) -> Result<(), PlatformError> {
        self.send(&[key_input(vk_code(key), KEYEVENTF_KEYUP)])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_maps_to_a_distinct_vk_code() {
        let codes = [vk_code(Key::Shift), vk_code(Key::A), vk_code(Key::Backspace)];
        assert_eq!(codes[0], 0x10);
        assert_eq!(codes[1], 0x41);
        assert_eq!(codes[2], 0x08);
    }
}
