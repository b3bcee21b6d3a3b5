//! An element with inline styles and attached effects

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::timeline::{SimPlayback, SimTimeline, TimelineInner};
use crate::anim::{AnimationTarget, Playback, Property, ResolvedKeyframes, Target, Timing};

pub(crate) struct ElementInner {
    name: String,
    attached: Cell<bool>,
    inline: RefCell<BTreeMap<Property, String>>,
    /// Non-idle effects, oldest first
    animations: RefCell<Vec<Rc<SimPlayback>>>,
    clock: Weak<RefCell<TimelineInner>>,
    started: Cell<usize>,
}

impl ElementInner {
    pub(super) fn attach_animation(&self, playback: Rc<SimPlayback>) {
        let mut animations = self.animations.borrow_mut();
        if !animations.iter().any(|a| Rc::ptr_eq(a, &playback)) {
            animations.push(playback);
        }
    }

    pub(super) fn detach_animation(&self, playback: *const SimPlayback) {
        self.animations
            .borrow_mut()
            .retain(|a| !std::ptr::eq(Rc::as_ptr(a), playback));
    }

    pub(super) fn write_inline(&self, property: Property, value: &str) {
        self.inline
            .borrow_mut()
            .insert(property, value.to_string());
    }
}

/// Headless stand-in for a styled DOM element
#[derive(Clone)]
pub struct SimElement(Rc<ElementInner>);

impl SimElement {
    pub fn new(timeline: &SimTimeline, name: &str) -> Self {
        Self(Rc::new(ElementInner {
            name: name.to_string(),
            attached: Cell::new(true),
            inline: RefCell::new(BTreeMap::new()),
            animations: RefCell::new(Vec::new()),
            clock: timeline.clock(),
            started: Cell::new(0),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn target(&self) -> Target {
        Rc::new(self.clone())
    }

    /// The element's own style, ignoring effects
    pub fn inline(&self, property: Property) -> Option<String> {
        self.0.inline.borrow().get(&property).cloned()
    }

    /// Stop accepting animations, as if removed from the document
    pub fn detach(&self) {
        self.0.attached.set(false);
    }

    pub fn is_attached(&self) -> bool {
        self.0.attached.get()
    }

    /// Effects currently attached (running, paused or filling)
    pub fn animation_count(&self) -> usize {
        self.0.animations.borrow().len()
    }

    /// Total animations ever started on this element
    pub fn started_count(&self) -> usize {
        self.0.started.get()
    }
}

impl AnimationTarget for SimElement {
    fn computed_value(&self, property: Property) -> Option<String> {
        let animations = self.0.animations.borrow().clone();
        animations
            .iter()
            .rev()
            .find_map(|a| a.effect_value(property))
            .or_else(|| self.inline(property))
    }

    fn set_inline(&self, property: Property, value: &str) {
        self.0.write_inline(property, value);
    }

    fn start_animation(
        &self,
        keyframes: &ResolvedKeyframes,
        timing: &Timing,
    ) -> Option<Rc<dyn Playback>> {
        if !self.is_attached() {
            return None;
        }
        let clock = self.0.clock.upgrade()?;
        let now = clock.borrow().now;
        let playback = SimPlayback::start(
            Rc::downgrade(&self.0),
            Rc::downgrade(&clock),
            keyframes.clone(),
            *timing,
            now,
        );
        clock.borrow_mut().playbacks.push(Rc::downgrade(&playback));
        self.0.attach_animation(playback.clone());
        self.0.started.set(self.0.started.get() + 1);
        Some(playback)
    }
}
