//! Card carousel entry point
//!
//! On the web this mounts the carousel found in the page. Natively it plays
//! a scripted session against the headless backend and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;

    use card_carousel::CarouselConfig;
    use card_carousel::platform::web::{MountedCarousel, mount};

    thread_local! {
        // Lives as long as the page
        static MOUNTED: RefCell<Option<MountedCarousel>> = const { RefCell::new(None) };
    }

    /// Config from the root's `data-config` JSON, defaults otherwise
    fn read_config(root: &web_sys::Element) -> CarouselConfig {
        let Some(json) = root.get_attribute("data-config") else {
            return CarouselConfig::default();
        };
        match CarouselConfig::from_json(&json) {
            Ok(config) => config,
            Err(err) => {
                web_sys::console::warn_1(&format!("bad data-config, using defaults: {err}").into());
                CarouselConfig::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();

        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("no document");
        let root = document
            .get_element_by_id("carousel")
            .or_else(|| document.get_element_by_id("main"))
            .expect("no #carousel or #main element");

        let config = read_config(&root);
        let level = if config.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        console_log::init_with_level(level).expect("Failed to init logger");

        log::info!("Card carousel starting...");

        match mount(&root, config, None) {
            Ok(mounted) => MOUNTED.with(|slot| *slot.borrow_mut() = Some(mounted)),
            Err(err) => log::error!("could not mount carousel: {err:?}"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Card carousel (native) starting...");
    log::info!("The browser build is the real thing; run with `trunk serve`");

    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use futures::executor::LocalPool;

    use card_carousel::carousel::{RevealState, SnapState};
    use card_carousel::input::PointerEvent;
    use card_carousel::sim::{SimElement, SimTimeline, sim_deck};
    use card_carousel::{Carousel, CarouselConfig};

    const FRAME_MS: f64 = 16.0;

    struct Session {
        timeline: SimTimeline,
        pool: LocalPool,
        carousel: Carousel,
    }

    impl Session {
        fn frames(&mut self, count: usize) {
            for _ in 0..count {
                self.timeline.advance(FRAME_MS);
                self.pool.run_until_stalled();
                self.carousel.tick(self.timeline.now());
            }
        }

        /// Tick while `busy` holds, up to a minute of frames
        fn frames_while(&mut self, busy: impl Fn(&Carousel) -> bool) {
            for _ in 0..3750 {
                if !busy(&self.carousel) {
                    return;
                }
                self.frames(1);
            }
            log::warn!("gave up waiting at t = {:.0} ms", self.timeline.now());
        }

        fn pointer(&mut self, event: PointerEvent) {
            self.carousel.pointer(event, self.timeline.now());
        }

        fn report(&self, label: &str) {
            let state = self.carousel.state();
            println!(
                "{label:>12}: angle {:7.2}  snap {:?} (card {:?})  reveal {:?}  first run {}",
                state.angle,
                state.snapping.state,
                state.snapping.snapped_card,
                state.revealing.state,
                state.is_running_first(),
            );
        }
    }

    pub fn run() {
        let config = CarouselConfig {
            seed: Some(42),
            ..Default::default()
        };
        let timeline = SimTimeline::new();
        let ring = SimElement::new(&timeline, "ring");
        let (_cards, handles) = sim_deck(&timeline, config.number_of_cards);
        let mut carousel = Carousel::new(config, ring.target(), handles);
        carousel.mount();

        let mut session = Session {
            timeline,
            pool: LocalPool::new(),
            carousel,
        };

        println!("\nFirst run choreography...");
        session.report("mounted");
        session.frames_while(|c| c.state().is_running_first());
        session.report("dealt");

        println!("\nDrag and let go...");
        session.pointer(PointerEvent::Press {
            x: 400.0,
            y: 300.0,
            card: None,
        });
        session.frames(1);
        for step in 1..=10 {
            session.pointer(PointerEvent::Move {
                x: 400.0 - step as f64 * 12.0,
                y: 300.0,
            });
            session.frames(1);
        }
        session.pointer(PointerEvent::Release);
        session.frames(1);
        session.report("released");
        session.frames_while(|c| c.state().snapping.state != SnapState::DoneSnapping);
        session.report("snapped");

        println!("\nReveal the centered card...");
        let Some(card) = session.carousel.state().snapping.snapped_card else {
            log::warn!("no card snapped into place");
            return;
        };
        session.pointer(PointerEvent::Press {
            x: 400.0,
            y: 300.0,
            card: Some(card),
        });
        session.pointer(PointerEvent::Release);
        session.frames(1);
        session.report("clicked");
        session.frames_while(|c| c.state().revealing.state == RevealState::Revealing);
        session.report("revealed");

        session.pointer(PointerEvent::Press {
            x: 10.0,
            y: 10.0,
            card: None,
        });
        session.pointer(PointerEvent::Release);
        session.frames(1);
        session.frames_while(|c| c.state().revealing.state != RevealState::PreRevealing);
        session.report("dismissed");

        session.carousel.unmount();
        println!("\n✓ Session finished at t = {:.0} ms", session.timeline.now());
    }
}
