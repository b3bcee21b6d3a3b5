//! Keyframe animation scheduling
//!
//! - `animate`: start keyframes on a batch of targets, get one handle back
//! - `sequence`: run animation factories one after another
//! - `branch`: fan keyframe steps out over per-item target groups
//! - `stagger`: linear start delays across a batch
//!
//! Everything here runs on a single thread. Listeners are one-shot and fire
//! from whatever engine drives the playbacks.

pub mod animate;
pub mod branch;
pub mod controls;
pub mod keyframes;
pub mod options;
pub mod sequence;
pub mod stagger;
pub mod target;
pub mod template;

pub use animate::{animate, animate_one};
pub use branch::{BranchStep, branch};
pub use controls::{AnimationControls, Controls, Outcome};
pub use keyframes::{Keyframe, Keyframes, Property, PropertyKeyframes, ResolvedKeyframes, Value};
pub use options::{AnimateOptions, Delay, Easing, Fill, PlaybackDirection, Timing};
pub use sequence::{Step, sequence};
pub use stagger::{Stagger, StaggerConfig, StaggerFrom, stagger};
pub use target::{AnimationTarget, Listener, PlayState, Playback, PlaybackEvent, Target};
