//! Headless harness for driving a carousel frame by frame

use std::rc::Rc;

use futures::executor::LocalPool;

use super::{Carousel, ContentProvider, KineticState, SnapState};
use crate::config::CarouselConfig;
use crate::input::PointerEvent;
use crate::sim::{SimCard, SimElement, SimTimeline, sim_deck};

/// Config with the choreography and redeal off, seeded
pub(crate) fn quiet(n: usize) -> CarouselConfig {
    CarouselConfig {
        number_of_cards: n,
        first_animation: false,
        redealing_animation: false,
        seed: Some(7),
        ..Default::default()
    }
}

pub(crate) struct Harness {
    pub timeline: SimTimeline,
    pub ring: SimElement,
    pub cards: Vec<Rc<SimCard>>,
    pub carousel: Carousel,
    pub pool: LocalPool,
}

impl Harness {
    pub fn new(config: CarouselConfig) -> Self {
        Self::build(config, None)
    }

    pub fn with_provider(config: CarouselConfig, provider: ContentProvider) -> Self {
        Self::build(config, Some(provider))
    }

    fn build(config: CarouselConfig, provider: Option<ContentProvider>) -> Self {
        let timeline = SimTimeline::new();
        let ring = SimElement::new(&timeline, "ring");
        let (cards, handles) = sim_deck(&timeline, config.number_of_cards);
        let pool = LocalPool::new();
        let mut carousel = Carousel::new(config, ring.target(), handles);
        if let Some(provider) = provider {
            carousel = carousel.with_provider(provider, Rc::new(pool.spawner()));
        }
        Self {
            timeline,
            ring,
            cards,
            carousel,
            pool,
        }
    }

    pub fn mount(&mut self) {
        self.carousel.mount();
    }

    pub fn angle(&self) -> f64 {
        self.carousel.angle()
    }

    /// Advance the clock, let async work run, then tick
    pub fn frame(&mut self, dt: f64) {
        self.timeline.advance(dt);
        self.pool.run_until_stalled();
        self.carousel.tick(self.timeline.now());
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frame(16.0);
        }
    }

    /// Run frames until nothing is moving the ring or owning the cards
    pub fn settle(&mut self) {
        for _ in 0..5000 {
            self.frame(16.0);
            let state = self.carousel.state();
            let snapped =
                !self.carousel.config().card_snapping || state.snapping.state == SnapState::DoneSnapping;
            if !state.is_running_first() && state.kinetic.state == KineticState::NotScrolling && snapped
            {
                return;
            }
        }
    }

    pub fn press(&mut self, x: f64, y: f64, card: Option<usize>) {
        self.carousel
            .pointer(PointerEvent::Press { x, y, card }, self.timeline.now());
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.carousel
            .pointer(PointerEvent::Move { x, y }, self.timeline.now());
    }

    pub fn release(&mut self) {
        self.carousel
            .pointer(PointerEvent::Release, self.timeline.now());
    }

    /// One kinetic sampling tick
    pub fn sample(&mut self) {
        self.carousel
            .tracker()
            .borrow_mut()
            .sample(self.timeline.now());
    }

    /// Tap on a card and let one frame see it
    pub fn click_card(&mut self, id: usize) {
        self.press(0.0, 0.0, Some(id));
        self.release();
        self.frame(16.0);
    }
}
