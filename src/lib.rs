//! Card Carousel - a ring of cards rotating in 3D
//!
//! Core modules:
//! - `anim`: Keyframe scheduler, control handles, sequence/branch/stagger helpers
//! - `input`: Pointer/touch normalization, click detection, velocity sampling
//! - `carousel`: Per-frame state machine (kinetic, auto-rotate, snap, drag, reveal, deal)
//! - `sim`: Deterministic headless animation engine for native runs and tests
//! - `platform`: Browser bindings (wasm32 only)

pub mod anim;
pub mod carousel;
pub mod config;
pub mod error;
pub mod input;
pub mod platform;
pub mod sim;

pub use carousel::{Carousel, CardElements, CardHandle};
pub use config::{CarouselConfig, DealingDirection};
pub use error::{ConfigError, ControlError, ProviderError};

/// Interaction and choreography constants
pub mod consts {
    /// Difference in pixels between the cursor's down and current positions to count as a click
    pub const CLICK_PIXEL_THRESHOLD: f64 = 5.0;

    /// Rate of cursor position sampling for kinetic scrolling velocity (ms)
    pub const KINETIC_TRACKING_RATE: f64 = 50.0;
    /// Kinetic scrolling stops completely once the remaining offset is below this (deg)
    pub const KINETIC_STOP_DEGREE: f64 = 0.1;
    /// Release velocity needed to start kinetic scrolling
    pub const KINETIC_VELOCITY_LOWER_BOUND: f64 = 10.0;
    /// Release velocity needed when snapping is enabled; lower releases are left to snapping
    pub const KINETIC_SNAPPING_VELOCITY_LOWER_BOUND: f64 = 300.0;
    /// Weight of the newest velocity sample in the smoothing filter
    pub const KINETIC_SMOOTHING: f64 = 0.8;

    /// Tilt applied to a dealt card just before it lands (deg)
    pub const DEALING_FINISH_SKEW_DEGREE: f64 = 60.0;
    /// Transition time from the orbit into the shuffling deck, per card (ms)
    pub const TO_SHUFFLING_DURATION: f64 = 300.0;
    /// Delay between cards joining the shuffling deck (ms)
    pub const TO_SHUFFLING_DELAY: f64 = 100.0;
    /// Transition time from the shuffling deck down to the dealing deck (ms)
    pub const TO_DEALING_DURATION: f64 = 600.0;

    /// Vertical lift of a revealed card; its shadow moves the opposite way (px)
    pub const REVEAL_LIFT: f64 = 55.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let r = angle % 360.0;
    let n = if r < 0.0 { r + 360.0 } else { r };
    // (-tiny % 360) + 360 rounds to exactly 360.0
    if n >= 360.0 { 0.0 } else { n }
}

/// Shortest signed rotation from `from` to `to`, in (-180, 180]
#[inline]
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    let d = normalize_degrees(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Euclidean modulo for card indices
#[inline]
pub fn wrap_index(n: i64, m: usize) -> usize {
    if m == 0 {
        return 0;
    }
    n.rem_euclid(m as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn test_shortest_delta() {
        assert!((shortest_delta(359.0, 0.0) - 1.0).abs() < 1e-9);
        assert!((shortest_delta(0.0, 359.0) + 1.0).abs() < 1e-9);
        assert!((shortest_delta(10.0, 190.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(-1, 5), 4);
        assert_eq!(wrap_index(5, 5), 0);
        assert_eq!(wrap_index(3, 0), 0);
    }

    proptest! {
        #[test]
        fn prop_normalize_in_range(angle in -1e6f64..1e6, delta in -1e6f64..1e6) {
            let n = normalize_degrees(angle + delta);
            prop_assert!((0.0..360.0).contains(&n));
        }

        #[test]
        fn prop_normalize_idempotent(angle in -1e6f64..1e6) {
            let once = normalize_degrees(angle);
            prop_assert_eq!(normalize_degrees(once), once);
        }
    }
}
