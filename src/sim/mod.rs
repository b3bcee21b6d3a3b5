//! Deterministic headless animation engine
//!
//! Stands in for the browser when running natively or under test:
//! - Time only moves when `SimTimeline::advance` is called
//! - Listeners fire synchronously during `advance` or the control call
//! - No rendering or platform dependencies

pub mod card;
pub mod element;
pub mod timeline;

pub use card::{SimCard, sim_deck};
pub use element::SimElement;
pub use timeline::{SimPlayback, SimTimeline};
