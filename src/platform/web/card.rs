//! A card rendered as DOM nodes
//!
//! Expected markup, one per card inside the ring:
//!
//! ```html
//! <div class="card" data-id="3">
//!   <div class="card-face">
//!     <img class="card-front"> <div class="card-back"></div>
//!   </div>
//!   <div class="card-shadow"></div>
//! </div>
//! ```

use std::cell::RefCell;

use web_sys::Element;

use super::dom::DomTarget;
use crate::anim::{
    AnimateOptions, AnimationControls, AnimationTarget, Easing, Keyframes, PlaybackDirection,
    Property, animate_one,
};
use crate::carousel::{CardElements, CardHandle};
use crate::config::CarouselConfig;

/// Face transform at rest; the reveal animates back to it as well
const FACE_REST: &str = "translateY(0px)";

pub struct DomCard {
    id: usize,
    container: Element,
    face: Element,
    shadow: Element,
    front: Option<Element>,
    floating_delta: f64,
    floating_time: f64,
    shaking_time: f64,
    floating: RefCell<Option<AnimationControls>>,
    shaking: RefCell<Option<AnimationControls>>,
}

impl DomCard {
    /// `None` unless `container` carries a numeric `data-id` and both parts
    pub fn from_element(container: Element, config: &CarouselConfig) -> Option<Self> {
        let id = container.get_attribute("data-id")?.parse().ok()?;
        let part = |selector: &str| container.query_selector(selector).ok().flatten();
        let face = part(".card-face")?;
        let shadow = part(".card-shadow")?;
        let front = part(".card-front");
        Some(Self {
            id,
            container,
            face,
            shadow,
            front,
            floating_delta: config.card_floating_delta,
            floating_time: config.card_floating_time,
            shaking_time: config.card_shaking_time,
            floating: RefCell::new(None),
            shaking: RefCell::new(None),
        })
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    fn swing(
        &self,
        keyframes: Keyframes,
        period_seconds: f64,
        easing: Easing,
    ) -> AnimationControls {
        // Half a period each way
        let options = AnimateOptions::from_duration(period_seconds * 500.0)
            .with_iterations(f64::INFINITY)
            .with_direction(PlaybackDirection::Alternate)
            .with_easing(easing)
            .with_persist(false);
        animate_one(&DomTarget::target(self.face.clone()), &keyframes, options)
    }
}

impl CardHandle for DomCard {
    fn id(&self) -> usize {
        self.id
    }

    fn elements(&self) -> Option<CardElements> {
        if !self.container.is_connected() {
            return None;
        }
        Some(CardElements {
            container: DomTarget::target(self.container.clone()),
            face: DomTarget::target(self.face.clone()),
            shadow: DomTarget::target(self.shadow.clone()),
        })
    }

    fn start_floating(&self) {
        if self.floating.borrow().is_some() {
            return;
        }
        let top = format!("translateY({}px)", -self.floating_delta);
        let handle = self.swing(
            Keyframes::transforms([FACE_REST.to_string(), top]),
            self.floating_time,
            Easing::EaseInOut,
        );
        *self.floating.borrow_mut() = Some(handle);
    }

    fn stop_floating(&self) {
        if let Some(handle) = self.floating.borrow_mut().take() {
            handle.cancel();
        }
    }

    fn start_shaking(&self) {
        if self.shaking.borrow().is_some() {
            return;
        }
        let handle = self.swing(
            Keyframes::transforms([
                format!("{FACE_REST} rotate(-10deg)"),
                format!("{FACE_REST} rotate(10deg)"),
            ]),
            self.shaking_time,
            Easing::Linear,
        );
        *self.shaking.borrow_mut() = Some(handle);
    }

    fn stop_shaking(&self) {
        if let Some(handle) = self.shaking.borrow_mut().take() {
            handle.cancel();
            // The first shake frame was left as the face's own style
            DomTarget::new(self.face.clone()).set_inline(Property::Transform, FACE_REST);
        }
    }

    fn set_front_content(&self, content: &str) {
        let Some(front) = &self.front else {
            return;
        };
        if let Err(err) = front.set_attribute("src", content) {
            log::warn!("card {}: could not set front content: {err:?}", self.id);
        }
    }
}
