//! `web_sys::Element` as an animation target
//!
//! Keyframes and timing are handed to `Element.animate` as plain JS objects;
//! finish and cancel events come back through gloo listeners kept alive by
//! the playback.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Animation, AnimationPlayState, Element, HtmlElement, KeyframeAnimationOptions};

use crate::anim::{
    AnimationTarget, Keyframe, Listener, PlayState, Playback, PlaybackEvent, Property,
    ResolvedKeyframes, Target, Timing, Value,
};

fn set(object: &Object, key: &str, value: &JsValue) {
    // Reflect.set only fails on frozen objects
    let _ = Reflect::set(object, &JsValue::from_str(key), value);
}

fn js_value(value: &Value) -> JsValue {
    match value {
        Value::Text(text) => JsValue::from_str(text),
        Value::Number(n) => JsValue::from_f64(*n),
    }
}

fn keyframe_object(keyframe: &Keyframe) -> Object {
    let object = Object::new();
    for property in Property::ALL {
        if let Some(value) = keyframe.get(property) {
            set(&object, property.css_name(), &js_value(value));
        }
    }
    if let Some(offset) = keyframe.offset {
        set(&object, "offset", &JsValue::from_f64(offset));
    }
    if let Some(easing) = &keyframe.easing {
        set(&object, "easing", &JsValue::from_str(&easing.to_css()));
    }
    object
}

fn keyframes_object(keyframes: &ResolvedKeyframes) -> Object {
    match keyframes {
        ResolvedKeyframes::List(list) => {
            let array: Array = list.iter().map(keyframe_object).collect();
            array.into()
        }
        ResolvedKeyframes::Indexed(indexed) => {
            let object = Object::new();
            for property in Property::ALL {
                let values = indexed.get(property);
                if !values.is_empty() {
                    let array: Array = values.iter().map(js_value).collect();
                    set(&object, property.css_name(), &array);
                }
            }
            object
        }
    }
}

fn timing_options(timing: &Timing) -> KeyframeAnimationOptions {
    let object = Object::new();
    set(&object, "duration", &JsValue::from_f64(timing.duration));
    set(&object, "delay", &JsValue::from_f64(timing.delay));
    set(&object, "endDelay", &JsValue::from_f64(timing.end_delay));
    set(&object, "fill", &JsValue::from_str(timing.fill.as_str()));
    set(&object, "easing", &JsValue::from_str(&timing.easing.to_css()));
    set(&object, "iterations", &JsValue::from_f64(timing.iterations));
    set(
        &object,
        "iterationStart",
        &JsValue::from_f64(timing.iteration_start),
    );
    set(
        &object,
        "direction",
        &JsValue::from_str(timing.direction.as_str()),
    );
    object.unchecked_into()
}

/// A DOM element; styles go through its inline `style`
pub struct DomTarget {
    element: Element,
}

impl DomTarget {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn target(element: Element) -> Target {
        Rc::new(Self::new(element))
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl AnimationTarget for DomTarget {
    fn computed_value(&self, property: Property) -> Option<String> {
        let style = web_sys::window()?
            .get_computed_style(&self.element)
            .ok()
            .flatten()?;
        style.get_property_value(property.css_name()).ok()
    }

    fn set_inline(&self, property: Property, value: &str) {
        if let Some(element) = self.element.dyn_ref::<HtmlElement>() {
            if let Err(err) = element.style().set_property(property.css_name(), value) {
                log::warn!("could not set {}: {err:?}", property.css_name());
            }
        }
    }

    fn start_animation(
        &self,
        keyframes: &ResolvedKeyframes,
        timing: &Timing,
    ) -> Option<Rc<dyn Playback>> {
        if !self.element.is_connected() {
            return None;
        }
        let frames = keyframes_object(keyframes);
        let animation = self
            .element
            .animate_with_keyframe_animation_options(Some(&frames), &timing_options(timing));
        Some(Rc::new(DomPlayback::new(animation)))
    }
}

/// One `web_sys::Animation`
pub struct DomPlayback {
    animation: Animation,
    listeners: RefCell<Vec<EventListener>>,
}

impl DomPlayback {
    pub fn new(animation: Animation) -> Self {
        Self {
            animation,
            listeners: RefCell::new(Vec::new()),
        }
    }

    fn report(&self, action: &str, result: Result<(), JsValue>) {
        if let Err(err) = result {
            log::warn!("animation {action} failed: {err:?}");
        }
    }
}

impl Playback for DomPlayback {
    fn play(&self) {
        self.report("play", self.animation.play());
    }

    fn pause(&self) {
        self.report("pause", self.animation.pause());
    }

    fn finish(&self) {
        // Throws on endless animations
        self.report("finish", self.animation.finish());
    }

    fn cancel(&self) {
        self.animation.cancel();
    }

    fn reverse(&self) {
        self.report("reverse", self.animation.reverse());
    }

    fn commit_styles(&self) {
        self.report("commitStyles", self.animation.commit_styles());
    }

    fn play_state(&self) -> PlayState {
        match self.animation.play_state() {
            AnimationPlayState::Running => PlayState::Running,
            AnimationPlayState::Paused => PlayState::Paused,
            AnimationPlayState::Finished => PlayState::Finished,
            _ => PlayState::Idle,
        }
    }

    fn add_listener(&self, event: PlaybackEvent, listener: Listener) {
        let name = match event {
            PlaybackEvent::Finish => "finish",
            PlaybackEvent::Cancel => "cancel",
        };
        let handle = EventListener::once(&self.animation, name, move |_| listener());
        self.listeners.borrow_mut().push(handle);
    }
}
