//! Seams to the animation engine
//!
//! The scheduler never talks to a DOM directly. An `AnimationTarget` is
//! something with styles that can start keyframe effects; a `Playback` is one
//! running effect. The browser binding and the headless `sim` engine both
//! implement these.

use std::rc::Rc;

use super::keyframes::{Property, ResolvedKeyframes};
use super::options::Timing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Finish,
    Cancel,
}

/// One-shot callback
pub type Listener = Box<dyn FnOnce()>;

/// A single running keyframe effect
///
/// Listeners are one-shot: each fires at most once, on the first matching
/// event after registration. Implementations must not hold internal borrows
/// while calling them.
pub trait Playback {
    fn play(&self);
    fn pause(&self);
    fn finish(&self);
    fn cancel(&self);
    fn reverse(&self);
    /// Write the current effect values into the element's own style
    fn commit_styles(&self);
    fn play_state(&self) -> PlayState;
    fn add_listener(&self, event: PlaybackEvent, listener: Listener);
}

pub trait AnimationTarget {
    /// Current computed value of `property`, if any
    fn computed_value(&self, property: Property) -> Option<String>;
    /// Set the element's own (inline) style
    fn set_inline(&self, property: Property, value: &str);
    /// `None` when the target can't animate (e.g. detached); callers treat that as a no-op
    fn start_animation(
        &self,
        keyframes: &ResolvedKeyframes,
        timing: &Timing,
    ) -> Option<Rc<dyn Playback>>;
}

pub type Target = Rc<dyn AnimationTarget>;
