//! Carousel configuration
//!
//! Plain values only; the host decides where they come from (JSON, code).
//! Times are in seconds unless the name says otherwise, distances in pixels.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{KINETIC_SNAPPING_VELOCITY_LOWER_BOUND, KINETIC_VELOCITY_LOWER_BOUND};
use crate::error::ConfigError;

/// Direction a dealt card travels from the viewer's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DealingDirection {
    Toward,
    #[default]
    Away,
}

impl DealingDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealingDirection::Toward => "toward",
            DealingDirection::Away => "away",
        }
    }

    /// Sign applied to the deck's travel along its Y axis
    pub fn sign(&self) -> f64 {
        match self {
            DealingDirection::Toward => 1.0,
            DealingDirection::Away => -1.0,
        }
    }
}

/// Everything the carousel core reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Number of cards in the ring
    pub number_of_cards: usize,

    // === Rotation ===
    /// Rotate on its own when nobody is interacting
    pub auto_rotate: bool,
    /// Seconds per full revolution when auto-rotating
    pub auto_rotate_time: f64,
    /// Drag to rotate
    pub manual_rotate: bool,
    /// Pixels of horizontal drag for one full revolution
    pub manual_rotate_distance: f64,
    /// Keep spinning after a fast release
    pub kinetic_rotate: bool,
    /// Higher feels heavier
    pub kinetic_rotate_weight: f64,
    /// Higher takes longer to stop (ms time constant)
    pub kinetic_deceleration_rate: f64,

    // === Layout ===
    /// Radius of the ring
    pub card_distance: f64,
    /// Extra Y rotation on every orbiting card (deg)
    pub card_skew: f64,

    // === Snapping ===
    /// Settle the nearest card so it faces the viewer
    pub card_snapping: bool,
    /// Seconds for a hypothetical full revolution at snapping speed
    pub card_snapping_time: f64,

    // === Revealing ===
    /// Seconds to reveal or unreveal a card
    pub card_revealing_duration: f64,
    /// Depth the revealed card moves out to
    pub card_reveal_distance: f64,
    /// Only cards within this depth of the front-most slot may be revealed
    pub card_reveal_limit_distance: Option<f64>,
    /// Shuffle and deal again after dismissing a revealed card
    pub redealing_animation: bool,

    // === First run ===
    /// Play the shuffle and/or deal sequence when mounted
    pub first_animation: bool,
    /// Shuffle before dealing
    pub shuffling_animation: bool,
    pub number_of_shuffling: u32,
    /// Max lateral distance a card flies out while shuffling
    pub shuffling_max_distance: f64,
    /// Height of the deck above the ground while shuffling
    pub shuffling_height: f64,
    /// Seconds for a single shuffle
    pub shuffling_duration: f64,
    /// Deck distance from the ring's center
    pub dealing_deck_distance_from_center: f64,
    pub dealing_direction: DealingDirection,
    /// Seconds for one card to travel from the deck to its slot
    pub dealing_duration: f64,
    /// Seconds between dealt cards
    pub dealing_delay: f64,
    /// How high a dealt card flies
    pub dealing_fly_height: f64,
    /// Resting opacity of card shadows
    pub shadow_opacity: f64,

    // === Card ===
    pub card_floating: bool,
    /// Distance between a floating card's highest and lowest positions
    pub card_floating_delta: f64,
    /// Seconds for a full float (low -> high -> low)
    pub card_floating_time: f64,
    /// Seconds for a full shake while loading content
    pub card_shaking_time: f64,

    // === Misc ===
    /// Frame cap; `None` is unlimited
    pub max_framerate: Option<f64>,
    /// Front contents (image URLs) picked at random for each card
    pub card_contents: Vec<String>,
    /// RNG seed for shuffles and content picks; hosts seed from the clock when unset
    pub seed: Option<u64>,
    /// Render the debug plane and card ids
    pub debug: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            number_of_cards: 10,

            auto_rotate: false,
            auto_rotate_time: 12.0,
            manual_rotate: true,
            manual_rotate_distance: 1000.0,
            kinetic_rotate: true,
            kinetic_rotate_weight: 10.0,
            kinetic_deceleration_rate: 325.0,

            card_distance: 200.0,
            card_skew: 0.0,

            card_snapping: true,
            card_snapping_time: 5.0,

            card_revealing_duration: 0.5,
            card_reveal_distance: 280.0,
            card_reveal_limit_distance: None,
            redealing_animation: true,

            first_animation: true,
            shuffling_animation: true,
            number_of_shuffling: 3,
            shuffling_max_distance: 150.0,
            shuffling_height: 120.0,
            shuffling_duration: 0.6,
            dealing_deck_distance_from_center: 220.0,
            dealing_direction: DealingDirection::Away,
            dealing_duration: 1.0,
            dealing_delay: 0.25,
            dealing_fly_height: 100.0,
            shadow_opacity: 0.5,

            card_floating: true,
            card_floating_delta: 12.0,
            card_floating_time: 3.0,
            card_shaking_time: 0.5,

            max_framerate: None,
            card_contents: Vec::new(),
            seed: None,
            debug: false,
        }
    }
}

impl FromStr for DealingDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toward" | "towards" => Ok(DealingDirection::Toward),
            "away" => Ok(DealingDirection::Away),
            _ => Err(ConfigError::UnknownDirection(s.to_string())),
        }
    }
}

impl CarouselConfig {
    /// Parse from JSON; missing fields take their defaults, unusable rates are reset
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Reset every value used as a divisor that isn't a positive finite number
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let divisors = [
            ("auto_rotate_time", &mut self.auto_rotate_time, defaults.auto_rotate_time),
            ("card_snapping_time", &mut self.card_snapping_time, defaults.card_snapping_time),
            (
                "manual_rotate_distance",
                &mut self.manual_rotate_distance,
                defaults.manual_rotate_distance,
            ),
            (
                "kinetic_deceleration_rate",
                &mut self.kinetic_deceleration_rate,
                defaults.kinetic_deceleration_rate,
            ),
        ];
        for (name, value, default) in divisors {
            if !(value.is_finite() && *value > 0.0) {
                log::warn!("{name} must be positive, got {value}; using {default}");
                *value = default;
            }
        }
        self
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Angular offset between neighbouring cards (deg)
    pub fn card_angle(&self) -> f64 {
        if self.number_of_cards == 0 {
            0.0
        } else {
            360.0 / self.number_of_cards as f64
        }
    }

    /// Auto-rotation speed (deg/ms)
    pub fn auto_rotate_rate(&self) -> f64 {
        360.0 / (self.auto_rotate_time * 1000.0)
    }

    /// Snapping speed (deg/ms)
    pub fn snap_rate(&self) -> f64 {
        360.0 / (self.card_snapping_time * 1000.0)
    }

    /// Minimum time between processed frames (ms), if capped
    pub fn frame_interval(&self) -> Option<f64> {
        self.max_framerate
            .filter(|fps| *fps > 0.0)
            .map(|fps| 1000.0 / fps)
    }

    /// Release velocity above which kinetic scrolling starts
    pub fn kinetic_velocity_lower_bound(&self) -> f64 {
        if self.card_snapping {
            KINETIC_SNAPPING_VELOCITY_LOWER_BOUND
        } else {
            KINETIC_VELOCITY_LOWER_BOUND
        }
    }

    /// Degrees of rotation per pixel of horizontal drag
    pub fn degrees_per_pixel(&self) -> f64 {
        360.0 / self.manual_rotate_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            CarouselConfig::from_json(r#"{"number_of_cards": 5, "dealing_direction": "toward"}"#)
                .unwrap();
        assert_eq!(config.number_of_cards, 5);
        assert_eq!(config.dealing_direction, DealingDirection::Toward);
        assert_eq!(config.manual_rotate_distance, 1000.0);
        assert!(config.card_snapping);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CarouselConfig::from_json("{\"number_of_cards\": -1}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_options() {
        let config = CarouselConfig {
            max_framerate: Some(30.0),
            card_reveal_limit_distance: Some(120.0),
            ..Default::default()
        };
        let parsed = CarouselConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed.max_framerate, Some(30.0));
        assert_eq!(parsed.card_reveal_limit_distance, Some(120.0));
    }

    #[test]
    fn test_derived_rates() {
        let config = CarouselConfig {
            number_of_cards: 10,
            auto_rotate_time: 12.0,
            card_snapping_time: 5.0,
            max_framerate: Some(50.0),
            ..Default::default()
        };
        assert_eq!(config.card_angle(), 36.0);
        assert!((config.auto_rotate_rate() - 0.03).abs() < 1e-12);
        assert!((config.snap_rate() - 0.072).abs() < 1e-12);
        assert_eq!(config.frame_interval(), Some(20.0));
        assert_eq!(config.kinetic_velocity_lower_bound(), 300.0);
    }

    #[test]
    fn test_zero_cards_has_no_angle() {
        let config = CarouselConfig {
            number_of_cards: 0,
            ..Default::default()
        };
        assert_eq!(config.card_angle(), 0.0);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("Toward".parse::<DealingDirection>().ok(), Some(DealingDirection::Toward));
        assert!(matches!(
            "sideways".parse::<DealingDirection>(),
            Err(ConfigError::UnknownDirection(s)) if s == "sideways"
        ));
        assert_eq!(DealingDirection::Away.sign(), -1.0);
    }

    #[test]
    fn test_zero_rates_are_reset() {
        let config = CarouselConfig::from_json(
            r#"{"auto_rotate_time": 0, "card_snapping_time": -2, "manual_rotate_distance": 0}"#,
        )
        .unwrap();
        assert_eq!(config.auto_rotate_time, 12.0);
        assert_eq!(config.card_snapping_time, 5.0);
        assert!(config.auto_rotate_rate().is_finite());
        assert!(config.snap_rate().is_finite());
        assert!(config.degrees_per_pixel().is_finite());
    }
}
