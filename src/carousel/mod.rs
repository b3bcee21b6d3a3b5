//! The carousel controller
//!
//! One `Carousel` per mounted ring. It owns every piece of per-frame state;
//! input handlers write only to the shared `InteractionTracker`, and async
//! completions come back through the mailbox.

pub mod card;
pub mod choreo;
mod mailbox;
pub mod reveal;
pub mod state;
mod tick;
pub mod transform;

#[cfg(test)]
mod testing;

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::task::LocalSpawn;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::anim::{Property, Target};
use crate::config::CarouselConfig;
use crate::error::ProviderError;
use crate::input::{InteractionTracker, PointerEvent};
use mailbox::{Mailbox, Message};

pub use card::{Card, CardElements, CardHandle};
pub use state::{
    CarouselState, FirstRun, FirstRunState, KineticState, KineticTracking, RevealState, Revealing,
    SnapState, Snapping,
};

/// Async source of the content shown on a revealed card
pub type ContentProvider = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<String, ProviderError>>>;

/// Seed used when the config doesn't name one
const DEFAULT_SEED: u64 = 0x5eed_ca4d;

pub struct Carousel {
    config: CarouselConfig,
    ring: Target,
    cards: Vec<Card>,
    tracker: Rc<RefCell<InteractionTracker>>,
    provider: Option<(ContentProvider, Rc<dyn LocalSpawn>)>,
    mailbox: Mailbox,
    epoch: u64,
    rng: Pcg32,
    state: CarouselState,
    mounted: bool,
}

impl Carousel {
    pub fn new(config: CarouselConfig, ring: Target, cards: Vec<Card>) -> Self {
        let config = config.sanitized();
        let rng = Pcg32::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        let tracker = Rc::new(RefCell::new(InteractionTracker::from_config(&config)));
        Self {
            config,
            ring,
            cards,
            tracker,
            provider: None,
            mailbox: Mailbox::default(),
            epoch: 0,
            rng,
            state: CarouselState::default(),
            mounted: false,
        }
    }

    /// Fetch revealed content through `provider`, driven by `spawner`
    pub fn with_provider(mut self, provider: ContentProvider, spawner: Rc<dyn LocalSpawn>) -> Self {
        self.provider = Some((provider, spawner));
        self
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn angle(&self) -> f64 {
        self.state.angle
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Shared with the input handlers
    pub fn tracker(&self) -> Rc<RefCell<InteractionTracker>> {
        self.tracker.clone()
    }

    /// Feed one pointer event
    pub fn pointer(&self, event: PointerEvent, now: f64) {
        self.tracker.borrow_mut().handle(event, now);
    }

    /// Replace the card handles, e.g. after the host re-rendered its list
    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Fresh state and a new epoch; plays the first-run choreography if enabled
    pub fn mount(&mut self) {
        if self.mounted {
            self.unmount();
        }
        self.epoch += 1;
        self.mounted = true;
        self.state = CarouselState::default();
        self.mailbox.clear();
        self.tracker.borrow_mut().reset();
        log::info!(
            "carousel mounted: {} cards, epoch {}",
            self.config.number_of_cards,
            self.epoch
        );
        self.start_first_run(false);
    }

    /// Cancel everything in flight; late callbacks from this mount are dropped
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.epoch += 1;
        self.mailbox.clear();

        if let Some(sequence) = self.state.first_run.sequence.take() {
            sequence.cancel();
        }
        for handle in self.state.revealing.animations.drain(..) {
            handle.cancel();
        }
        if let Some(card) = self.state.revealing.reveal_id.and_then(|id| self.card(id)) {
            card.stop_shaking();
        }
        for card in &self.cards {
            card.stop_floating();
        }
        self.tracker.borrow_mut().reset();
        log::info!("carousel unmounted");
    }

    fn card(&self, id: usize) -> Option<Card> {
        self.cards.iter().find(|c| c.id() == id).cloned()
    }

    /// Cards in ring order, capped at the configured count
    fn ring_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().take(self.config.number_of_cards)
    }

    fn assign_contents(&mut self) {
        let pool = &self.config.card_contents;
        if pool.is_empty() {
            return;
        }
        let picks: Vec<usize> = (0..self.cards.len())
            .map(|_| self.rng.random_range(0..pool.len()))
            .collect();
        for (card, pick) in self.cards.iter().zip(picks) {
            card.set_front_content(&pool[pick]);
        }
    }

    /// Angle reset, contents drawn, then shuffle/deal (or straight to idle)
    ///
    /// A redeal always animates; `first_animation` only gates the one on mount.
    fn start_first_run(&mut self, redeal: bool) {
        self.state.angle = 0.0;
        self.ring
            .set_inline(Property::Transform, &transform::ring(0.0));
        self.assign_contents();
        if redeal {
            for card in &self.cards {
                card.stop_floating();
            }
        }

        self.state.first_run = FirstRun {
            state: FirstRunState::Running,
            sequence: None,
        };
        if !(self.config.first_animation || redeal) {
            self.finish_first_run();
            return;
        }

        let items: Vec<(usize, CardElements)> = self
            .ring_cards()
            .enumerate()
            .filter_map(|(slot, card)| card.elements().map(|e| (slot, e)))
            .collect();
        let handle = choreo::first_run(&self.config, items, &mut self.rng, redeal);
        let poster = self.mailbox.poster(self.epoch);
        handle.on_finish(move || poster.post(Message::FirstRunDone));
        self.state.first_run.sequence = Some(handle);
    }

    fn finish_first_run(&mut self) {
        self.state.first_run = FirstRun {
            state: FirstRunState::DoneRunning,
            sequence: None,
        };
        self.state.last_time = None;
        self.state.snapping.rearm();
        self.state.kinetic.stop();
        if self.config.card_floating {
            for card in self.ring_cards() {
                card.start_floating();
            }
        }
        log::info!("first run done");
    }
}
