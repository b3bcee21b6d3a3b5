//! Pointer input
//!
//! - `tracker`: cursor, click and drag bookkeeping fed by mouse/touch handlers
//! - `kinetic`: fixed-rate velocity sampling for release momentum

pub mod kinetic;
pub mod tracker;

pub use kinetic::VelocitySampler;
pub use tracker::{Click, Cursor, InteractionTracker, PointerEvent, Throttle, TrackerSignal};
