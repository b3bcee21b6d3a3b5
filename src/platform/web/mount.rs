//! Wiring a carousel into the page
//!
//! Pointer and touch handlers only feed the shared tracker. A
//! `requestAnimationFrame` loop ticks the carousel and a fixed-rate interval
//! samples the cursor for release velocity. Dropping the mount tears it all
//! down.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use gloo_events::{EventListener, EventListenerOptions};
use gloo_render::{AnimationFrame, request_animation_frame};
use gloo_timers::callback::Interval;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, MouseEvent, TouchEvent};

use super::card::DomCard;
use super::dom::DomTarget;
use crate::carousel::{Card, CardHandle, Carousel, ContentProvider};
use crate::config::CarouselConfig;
use crate::consts::KINETIC_TRACKING_RATE;
use crate::input::{InteractionTracker, PointerEvent};

/// Runs futures on the browser's microtask queue
pub struct WebSpawner;

impl LocalSpawn for WebSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Id of the card under the event target, if any
fn card_under(event: &Event) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target
        .closest("[data-id]")
        .ok()
        .flatten()?
        .get_attribute("data-id")?
        .parse()
        .ok()
}

/// First contact point, relative to the viewport
fn first_touch(event: &TouchEvent) -> Option<(f64, f64)> {
    let touch = event.touches().get(0)?;
    Some((touch.client_x() as f64, touch.client_y() as f64))
}

/// A mounted carousel; drop it to unmount
pub struct MountedCarousel {
    carousel: Rc<RefCell<Carousel>>,
    _listeners: Vec<EventListener>,
    _sampler: Option<Interval>,
    frame: Rc<RefCell<Option<AnimationFrame>>>,
}

impl MountedCarousel {
    pub fn carousel(&self) -> Rc<RefCell<Carousel>> {
        self.carousel.clone()
    }
}

impl Drop for MountedCarousel {
    fn drop(&mut self) {
        self.frame.borrow_mut().take();
        if let Ok(mut carousel) = self.carousel.try_borrow_mut() {
            carousel.unmount();
        }
    }
}

/// Mount on `root`, which must contain a `.carousel-ring` holding the cards
pub fn mount(
    root: &Element,
    mut config: CarouselConfig,
    provider: Option<ContentProvider>,
) -> Result<MountedCarousel, JsValue> {
    let ring = root
        .query_selector(".carousel-ring")?
        .ok_or_else(|| JsValue::from_str("carousel: no .carousel-ring element"))?;

    if config.seed.is_none() {
        config.seed = Some(js_sys::Date::now() as u64);
    }
    if config.debug {
        add_debug_overlay(&ring)?;
    }

    let nodes = ring.query_selector_all(".card")?;
    let cards: Vec<Card> = (0..nodes.length())
        .filter_map(|i| nodes.get(i)?.dyn_into::<Element>().ok())
        .filter_map(|el| DomCard::from_element(el, &config))
        .map(|card| {
            if config.debug {
                add_id_label(card.container(), &card.id().to_string());
            }
            Rc::new(card) as Card
        })
        .collect();
    if cards.len() < config.number_of_cards {
        log::warn!(
            "carousel: found {} cards, expected {}; it will stay still",
            cards.len(),
            config.number_of_cards
        );
    }

    let kinetic = config.kinetic_rotate;
    let mut carousel = Carousel::new(config, DomTarget::target(ring), cards);
    if let Some(provider) = provider {
        carousel = carousel.with_provider(provider, Rc::new(WebSpawner));
    }
    let tracker = carousel.tracker();
    carousel.mount();
    let carousel = Rc::new(RefCell::new(carousel));

    let listeners = install_listeners(root, &tracker)?;
    let sampler = kinetic.then(|| {
        let tracker = tracker.clone();
        Interval::new(KINETIC_TRACKING_RATE as u32, move || {
            let mut tracker = tracker.borrow_mut();
            if tracker.is_sampling() {
                tracker.sample(now());
            }
        })
    });

    let frame = Rc::new(RefCell::new(None));
    schedule(carousel.clone(), frame.clone());

    Ok(MountedCarousel {
        carousel,
        _listeners: listeners,
        _sampler: sampler,
        frame,
    })
}

fn schedule(carousel: Rc<RefCell<Carousel>>, slot: Rc<RefCell<Option<AnimationFrame>>>) {
    let next = slot.clone();
    let handle = request_animation_frame(move |timestamp| {
        carousel.borrow_mut().tick(timestamp);
        schedule(carousel, next);
    });
    *slot.borrow_mut() = Some(handle);
}

fn install_listeners(
    root: &Element,
    tracker: &Rc<RefCell<InteractionTracker>>,
) -> Result<Vec<EventListener>, JsValue> {
    let window: EventTarget = web_sys::window()
        .ok_or_else(|| JsValue::from_str("carousel: no window"))?
        .into();
    let active = EventListenerOptions::enable_prevent_default();
    let feed = |tracker: &Rc<RefCell<InteractionTracker>>| {
        let tracker = tracker.clone();
        move |event: PointerEvent| tracker.borrow_mut().handle(event, now())
    };

    let mut listeners = Vec::new();

    let send = feed(tracker);
    listeners.push(EventListener::new(root, "mousedown", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        if mouse.button() != 0 {
            return;
        }
        send(PointerEvent::Press {
            x: mouse.client_x() as f64,
            y: mouse.client_y() as f64,
            card: card_under(event),
        });
    }));

    let send = feed(tracker);
    listeners.push(EventListener::new(&window, "mousemove", move |event| {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            send(PointerEvent::Move {
                x: mouse.client_x() as f64,
                y: mouse.client_y() as f64,
            });
        }
    }));

    let send = feed(tracker);
    listeners.push(EventListener::new(&window, "mouseup", move |_| {
        send(PointerEvent::Release);
    }));

    let send = feed(tracker);
    listeners.push(EventListener::new_with_options(
        root,
        "touchstart",
        active,
        move |event| {
            let Some(touch) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            event.prevent_default();
            if let Some((x, y)) = first_touch(touch) {
                send(PointerEvent::Press {
                    x,
                    y,
                    card: card_under(event),
                });
            }
        },
    ));

    let send = feed(tracker);
    listeners.push(EventListener::new_with_options(
        root,
        "touchmove",
        active,
        move |event| {
            let Some(touch) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            event.prevent_default();
            if let Some((x, y)) = first_touch(touch) {
                send(PointerEvent::Move { x, y });
            }
        },
    ));

    for name in ["touchend", "touchcancel"] {
        let send = feed(tracker);
        listeners.push(EventListener::new(root, name, move |event| {
            let still_down = event
                .dyn_ref::<TouchEvent>()
                .is_some_and(|t| t.touches().length() > 0);
            if !still_down {
                send(PointerEvent::Release);
            }
        }));
    }

    Ok(listeners)
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("carousel: no document"))
}

/// Visible ground plane under the ring
fn add_debug_overlay(ring: &Element) -> Result<(), JsValue> {
    let plane = document()?.create_element("div")?;
    plane.set_class_name("carousel-debug-plane");
    ring.append_child(&plane)?;
    Ok(())
}

fn add_id_label(container: &Element, text: &str) {
    let Ok(document) = document() else {
        return;
    };
    let Ok(label) = document.create_element("span") else {
        return;
    };
    label.set_class_name("carousel-debug-id");
    label.set_text_content(Some(text));
    if let Err(err) = container.append_child(&label) {
        log::warn!("could not add debug label: {err:?}");
    }
}
