//! macOS idle probe via CGEventSourceSecondsSinceLastEventType.
//!
//! Queries the combined session event source state for the time since the
//! last event of any type, which covers keyboard, mouse, and trackpad input
//! across the login session.

use std::time::Duration;

use crate::platform::IdleProbe;

/// kCGEventSourceStateCombinedSessionState -- aggregate of all event
/// sources in the current session.
const CG_COMBINED_SESSION_STATE: i32 = 0;

/// kCGAnyInputEventType -- matches every input event class.
const CG_ANY_INPUT_EVENT_TYPE: u32 = u32::MAX;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventSourceSecondsSinceLastEventType(state_id: i32, event_type: u32) -> f64;
}

/// Idle probe backed by the Quartz event source counters. Stateless.
pub struct MacIdleProbe;

impl IdleProbe for MacIdleProbe {
    fn idle_duration(&self) -> Duration {
        let seconds = unsafe {
            CGEventSourceSecondsSinceLastEventType(
                CG_COMBINED_SESSION_STATE,
                CG_ANY_INPUT_EVENT_TYPE,
            )
        };
        if seconds.is_finite() && seconds > 0.0 {
            Duration::from_secs_f64(seconds)
        } else {
            Duration::ZERO
        }
    }
}
