//! Round-trip cursor displacement policy.
//!
//! Shared by the `mouse`/`mouse-random` scheduler actions and the auxiliary
//! mover. Every displacement is emitted as a pair of relative moves whose
//! vector sum is exactly (0, 0): the OS idle timer sees pointer activity but
//! the cursor ends up where it started.

use rand::Rng;

use crate::platform::{InputEmitter, PlatformError};

/// Integer displacement of magnitude `pixels` in a uniformly random
/// direction. Rounding means the emitted vector length is only approximately
/// `pixels`; what matters is that the return leg negates it exactly.
pub fn random_offset(rng: &mut impl Rng, pixels: i32) -> (i32, i32) {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let dx = (angle.cos() * f64::from(pixels)).round() as i32;
    let dy = (angle.sin() * f64::from(pixels)).round() as i32;
    (dx, dy)
}

/// Emits `(dx, dy)` immediately followed by its exact negation.
pub fn round_trip(emitter: &dyn InputEmitter, dx: i32, dy: i32) -> Result<(), PlatformError> {
    emitter.move_cursor_relative(dx, dy)?;
    emitter.move_cursor_relative(-dx, -dy)
}

/// Fixed-direction jiggle: out along the diagonal and straight back.
pub fn jiggle(emitter: &dyn InputEmitter, pixels: i32) -> Result<(), PlatformError> {
    round_trip(emitter, pixels, pixels)
}

/// Random-direction jiggle of magnitude `pixels`.
pub fn random_walk(
    emitter: &dyn InputEmitter,
    rng: &mut impl Rng,
    pixels: i32,
) -> Result<(), PlatformError> {
    let (dx, dy) = random_offset(rng, pixels);
    round_trip(emitter, dx, dy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::platform::fakes::{EmitterCall, RecordingEmitter};

    #[test]
    fn random_offset_magnitude_is_close_to_requested() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let (dx, dy) = random_offset(&mut rng, 100);
            let magnitude = f64::from(dx * dx + dy * dy).sqrt();
            // Rounding each axis independently perturbs the length by at
            // most one pixel per axis.
            assert!((magnitude - 100.0).abs() < 1.5, "got {magnitude}");
        }
    }

    #[test]
    fn random_walk_sums_to_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let emitter = RecordingEmitter::new();
            random_walk(&emitter, &mut rng, 250).unwrap();
            assert_eq!(emitter.move_sum(), (0, 0));
            assert_eq!(emitter.calls().len(), 2);
        }
    }

    #[test]
    fn fixed_jiggle_sums_to_zero() {
        let emitter = RecordingEmitter::new();
        jiggle(&emitter, 3).unwrap();
        assert_eq!(
            emitter.calls(),
            vec![
                EmitterCall::Move { dx: 3, dy: 3 },
                EmitterCall::Move { dx: -3, dy: -3 },
            ]
        );
    }

    #[test]
    fn failed_outbound_move_skips_the_return_leg() {
        let emitter = RecordingEmitter::failing();
        assert!(jiggle(&emitter, 2).is_err());
        assert_eq!(emitter.calls().len(), 1);
    }
}
