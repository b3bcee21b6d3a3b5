//! What the carousel needs from a rendered card
//!
//! The card's own lifecycle (creating elements, loading images) belongs to the
//! host. The carousel only positions the three parts and toggles ambient motion.

use std::rc::Rc;

use crate::anim::Target;

/// The three animatable parts of a card
#[derive(Clone)]
pub struct CardElements {
    /// Positioned on the ring
    pub container: Target,
    /// Holds the front and back faces; floats and shakes
    pub face: Target,
    /// Sits on the ground under the card
    pub shadow: Target,
}

pub trait CardHandle {
    fn id(&self) -> usize;
    /// `None` until the card has finished mounting
    fn elements(&self) -> Option<CardElements>;
    fn start_floating(&self);
    fn stop_floating(&self);
    /// Waiting-for-content wiggle
    fn start_shaking(&self);
    fn stop_shaking(&self);
    fn set_front_content(&self, content: &str);
}

pub type Card = Rc<dyn CardHandle>;
