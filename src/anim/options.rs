//! Animation options and resolved timing
//!
//! `AnimateOptions` is the caller-facing, partially-specified form; every unset
//! field falls back to the scheduler defaults when resolved into a `Timing`.

use std::fmt;
use std::rc::Rc;

use super::stagger::Stagger;

/// Timing function between keyframes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    pub fn to_css(&self) -> String {
        match self {
            Easing::Linear => "linear".to_string(),
            Easing::Ease => "ease".to_string(),
            Easing::EaseIn => "ease-in".to_string(),
            Easing::EaseOut => "ease-out".to_string(),
            Easing::EaseInOut => "ease-in-out".to_string(),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

/// What the effect shows outside its active interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    None,
    #[default]
    Forwards,
    Backwards,
    Both,
}

impl Fill {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fill::None => "none",
            Fill::Forwards => "forwards",
            Fill::Backwards => "backwards",
            Fill::Both => "both",
        }
    }

    pub fn fills_forwards(&self) -> bool {
        matches!(self, Fill::Forwards | Fill::Both)
    }

    pub fn fills_backwards(&self) -> bool {
        matches!(self, Fill::Backwards | Fill::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackDirection {
    #[default]
    Normal,
    Reverse,
    Alternate,
    AlternateReverse,
}

impl PlaybackDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackDirection::Normal => "normal",
            PlaybackDirection::Reverse => "reverse",
            PlaybackDirection::Alternate => "alternate",
            PlaybackDirection::AlternateReverse => "alternate-reverse",
        }
    }
}

/// Start delay, fixed or derived from the element's place in the batch
#[derive(Clone)]
pub enum Delay {
    Fixed(f64),
    Stagger(Stagger),
    /// `(index, batch_len) -> ms`
    PerIndex(Rc<dyn Fn(usize, usize) -> f64>),
}

impl Delay {
    pub fn resolve(&self, index: usize, len: usize) -> f64 {
        match self {
            Delay::Fixed(ms) => *ms,
            Delay::Stagger(stagger) => stagger.delay(index, len),
            Delay::PerIndex(f) => f(index, len),
        }
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Fixed(ms) => f.debug_tuple("Fixed").field(ms).finish(),
            Delay::Stagger(stagger) => f.debug_tuple("Stagger").field(stagger).finish(),
            Delay::PerIndex(_) => f.write_str("PerIndex(..)"),
        }
    }
}

impl From<f64> for Delay {
    fn from(ms: f64) -> Self {
        Delay::Fixed(ms)
    }
}

impl From<Stagger> for Delay {
    fn from(stagger: Stagger) -> Self {
        Delay::Stagger(stagger)
    }
}

/// Caller-facing options; unset fields take the defaults
#[derive(Debug, Clone, Default)]
pub struct AnimateOptions {
    /// ms
    pub duration: Option<f64>,
    pub delay: Option<Delay>,
    /// ms
    pub end_delay: Option<f64>,
    pub fill: Option<Fill>,
    pub easing: Option<Easing>,
    /// `f64::INFINITY` loops forever
    pub iterations: Option<f64>,
    pub iteration_start: Option<f64>,
    pub direction: Option<PlaybackDirection>,
    /// Commit the final frame into the element's own style and drop the animation
    pub persist: Option<bool>,
}

impl AnimateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_duration(ms: f64) -> Self {
        Self {
            duration: Some(ms),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn with_delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    pub fn with_end_delay(mut self, ms: f64) -> Self {
        self.end_delay = Some(ms);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_iterations(mut self, iterations: f64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_iteration_start(mut self, start: f64) -> Self {
        self.iteration_start = Some(start);
        self
    }

    pub fn with_direction(mut self, direction: PlaybackDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Fields set on `self` win; the rest come from `base`
    pub fn merged_over(&self, base: &AnimateOptions) -> AnimateOptions {
        AnimateOptions {
            duration: self.duration.or(base.duration),
            delay: self.delay.clone().or_else(|| base.delay.clone()),
            end_delay: self.end_delay.or(base.end_delay),
            fill: self.fill.or(base.fill),
            easing: self.easing.or(base.easing),
            iterations: self.iterations.or(base.iterations),
            iteration_start: self.iteration_start.or(base.iteration_start),
            direction: self.direction.or(base.direction),
            persist: self.persist.or(base.persist),
        }
    }

    pub fn persists(&self) -> bool {
        self.persist.unwrap_or(true)
    }

    /// Concrete timing for the element at `index` of a `len`-element batch
    pub fn timing(&self, index: usize, len: usize) -> Timing {
        Timing {
            duration: self.duration.unwrap_or(0.0).max(0.0),
            delay: self
                .delay
                .as_ref()
                .map(|d| d.resolve(index, len))
                .unwrap_or(0.0),
            end_delay: self.end_delay.unwrap_or(0.0),
            fill: self.fill.unwrap_or_default(),
            easing: self.easing.unwrap_or_default(),
            iterations: self.iterations.unwrap_or(1.0).max(0.0),
            iteration_start: self.iteration_start.unwrap_or(0.0),
            direction: self.direction.unwrap_or_default(),
        }
    }
}

/// A bare number is a duration in ms
impl From<f64> for AnimateOptions {
    fn from(ms: f64) -> Self {
        AnimateOptions::from_duration(ms)
    }
}

/// Fully-resolved timing for one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration: f64,
    pub delay: f64,
    pub end_delay: f64,
    pub fill: Fill,
    pub easing: Easing,
    pub iterations: f64,
    pub iteration_start: f64,
    pub direction: PlaybackDirection,
}

impl Timing {
    pub fn active_duration(&self) -> f64 {
        if self.duration == 0.0 || self.iterations == 0.0 {
            0.0
        } else {
            self.duration * self.iterations
        }
    }

    /// Time at which a forward-playing effect finishes (ms)
    pub fn end_time(&self) -> f64 {
        (self.delay + self.active_duration() + self.end_delay).max(0.0)
    }

    pub fn is_infinite(&self) -> bool {
        self.end_time().is_infinite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::stagger::{StaggerConfig, StaggerFrom, stagger};

    #[test]
    fn test_defaults() {
        let timing = AnimateOptions::new().timing(0, 1);
        assert_eq!(timing.fill, Fill::Forwards);
        assert_eq!(timing.easing, Easing::EaseInOut);
        assert_eq!(timing.duration, 0.0);
        assert_eq!(timing.iterations, 1.0);
        assert!(AnimateOptions::new().persists());
    }

    #[test]
    fn test_numeric_shorthand_is_duration() {
        let options: AnimateOptions = 250.0.into();
        assert_eq!(options.timing(0, 1).duration, 250.0);
    }

    #[test]
    fn test_merge_keeps_overrides() {
        let base = AnimateOptions::from_duration(1000.0)
            .with_easing(Easing::Ease)
            .with_persist(true);
        let step = AnimateOptions::new()
            .with_duration(200.0)
            .with_persist(false);
        let merged = step.merged_over(&base);
        assert_eq!(merged.duration, Some(200.0));
        assert_eq!(merged.easing, Some(Easing::Ease));
        assert!(!merged.persists());
    }

    #[test]
    fn test_staggered_delay_resolves_per_index() {
        let options = AnimateOptions::from_duration(100.0).with_delay(stagger(
            50.0,
            StaggerConfig {
                start: 10.0,
                from: StaggerFrom::Last,
            },
        ));
        assert_eq!(options.timing(0, 4).delay, 160.0);
        assert_eq!(options.timing(3, 4).delay, 10.0);
    }

    #[test]
    fn test_end_time() {
        let timing = AnimateOptions::from_duration(300.0)
            .with_delay(100.0)
            .with_iterations(2.0)
            .timing(0, 1);
        assert_eq!(timing.end_time(), 700.0);
        let looping = AnimateOptions::from_duration(300.0)
            .with_iterations(f64::INFINITY)
            .timing(0, 1);
        assert!(looping.is_infinite());
    }

    #[test]
    fn test_easing_css() {
        assert_eq!(Easing::EaseInOut.to_css(), "ease-in-out");
        assert_eq!(
            Easing::CubicBezier(0.1, 0.7, 1.0, 0.1).to_css(),
            "cubic-bezier(0.1, 0.7, 1, 0.1)"
        );
    }
}
