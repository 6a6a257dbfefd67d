//! Windows idle probe via GetLastInputInfo.
//!
//! `GetLastInputInfo` reports the tick count of the last real input event;
//! subtracting it from the current tick count gives the idle time in
//! milliseconds. Both values live in the 32-bit `GetTickCount` namespace,
//! which rolls over every 49.7 days, so the subtraction must wrap.

use std::time::Duration;

use windows_sys::Win32::System::SystemInformation::GetTickCount;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

use crate::platform::IdleProbe;

/// Idle probe backed by `GetLastInputInfo`. Stateless.
pub struct WindowsIdleProbe;

impl IdleProbe for WindowsIdleProbe {
    fn idle_duration(&self) -> Duration {
        let mut info = LASTINPUTINFO {
            cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
            dwTime: 0,
        };
        if unsafe { GetLastInputInfo(&mut info) } == 0 {
            log::debug!("probe: GetLastInputInfo failed, reporting zero idle");
            return Duration::ZERO;
        }
        // wrapping_sub tolerates the 49.7-day tick counter rollover.
        let idle_ms = unsafe { GetTickCount() }.wrapping_sub(info.dwTime);
        Duration::from_millis(u64::from(idle_ms))
    }
}
