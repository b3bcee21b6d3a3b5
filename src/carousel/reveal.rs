//! Revealing a card and dismissing it again
//!
//! Only the centered card and its two neighbours can be revealed. The three
//! reveal animations are kept around so a dismiss can reverse them exactly.

use futures::task::LocalSpawnExt;

use super::mailbox::Message;
use super::state::{RevealState, SnapState, nearest_card};
use super::{Carousel, transform};
use crate::anim::{AnimateOptions, AnimationControls, Keyframes, animate_one};
use crate::consts::REVEAL_LIFT;
use crate::error::ProviderError;
use crate::wrap_index;

/// `clicked` is the centered slot or one of its two neighbours
pub fn is_adjacent(clicked: usize, centered: usize, n: usize) -> bool {
    if n == 0 {
        return false;
    }
    let c = centered as i64;
    clicked == centered
        || clicked == wrap_index(c - 1, n)
        || clicked == wrap_index(c + 1, n)
}

/// Slot (in card units) the revealed card travels to
///
/// Either the centered slot itself or its wrapped twin one revolution away,
/// whichever is closer to where the card starts.
pub fn reveal_slot(clicked: usize, centered: usize, n: usize) -> f64 {
    let (k, c, n) = (clicked as i64, centered as i64, n as i64);
    let alt = (c - k).signum() * (c - n);
    if (k - c).abs() <= (k - alt).abs() {
        c as f64
    } else {
        alt as f64
    }
}

/// How far behind the front-most orbital position a slot sits
pub fn depth_gap(slot_angle: f64, ring_angle: f64, distance: f64) -> f64 {
    distance * (1.0 - (slot_angle + ring_angle).to_radians().cos())
}

impl Carousel {
    /// Slot facing the viewer; `None` while a snap is still moving the ring
    pub(crate) fn centered_card(&self) -> Option<usize> {
        let n = self.config.number_of_cards;
        let s = self.config.card_angle();
        if n == 0 {
            return None;
        }
        match self.state.snapping.state {
            SnapState::DoneSnapping => self.state.snapping.snapped_card,
            SnapState::Snapping => None,
            SnapState::PreSnapping => Some(nearest_card(self.state.angle, s, n)),
        }
    }

    fn slot_of(&self, id: usize) -> Option<usize> {
        self.ring_cards().position(|c| c.id() == id)
    }

    pub(crate) fn on_click(&mut self, card: Option<usize>) {
        match self.state.revealing.state {
            RevealState::PreRevealing => match card {
                Some(id) => self.try_reveal(id),
                None => log::debug!("click outside any card"),
            },
            RevealState::DoneRevealing => self.unreveal(),
            state => log::debug!("click ignored while {state:?}"),
        }
    }

    fn try_reveal(&mut self, id: usize) {
        let n = self.config.number_of_cards;
        let Some(slot) = self.slot_of(id) else {
            log::debug!("reveal refused: card {id} is not on the ring");
            return;
        };
        let Some(centered) = self.centered_card() else {
            log::debug!("reveal refused: ring still snapping");
            return;
        };
        if !is_adjacent(slot, centered, n) {
            log::debug!("reveal refused: card {id} is not next to slot {centered}");
            return;
        }
        if let Some(limit) = self.config.card_reveal_limit_distance {
            let slot_angle = slot as f64 * self.config.card_angle();
            let gap = depth_gap(slot_angle, self.state.angle, self.config.card_distance);
            if gap > limit {
                log::debug!("reveal refused: card {id} is {gap:.1}px deep, limit {limit}");
                return;
            }
        }
        let Some(card) = self.card(id) else {
            return;
        };

        self.state.revealing.reveal_id = Some(id);
        self.state.revealing.state = RevealState::Revealing;

        let Some((provider, spawner)) = self.provider.clone() else {
            self.launch_reveal(id);
            return;
        };

        card.start_shaking();
        let pending = provider();
        let poster = self.mailbox.poster(self.epoch);
        let task = async move {
            let message = match pending.await {
                Ok(content) => Message::ContentReady { card: id, content },
                Err(error) => Message::ContentFailed { card: id, error },
            };
            poster.post(message);
        };
        if let Err(err) = spawner.spawn_local(task) {
            log::warn!("could not fetch content for card {id}: {err}");
            card.stop_shaking();
            self.abandon_reveal();
        }
    }

    /// Start the container, face and shadow animations of card `id`
    fn launch_reveal(&mut self, id: usize) {
        let n = self.config.number_of_cards;
        let target = (self.slot_of(id), self.card(id), self.centered_card());
        let (Some(slot), Some(card), Some(centered)) = target else {
            self.abandon_reveal();
            return;
        };
        let Some(elements) = card.elements() else {
            log::debug!("reveal abandoned: card {id} has no elements");
            self.abandon_reveal();
            return;
        };

        let s = self.config.card_angle();
        let skew = self.config.card_skew;
        let from = slot as f64 * s;
        let to = reveal_slot(slot, centered, n) * s;
        let facing = transform::facing_degrees(from, self.state.angle, skew);
        let flipped = facing + 180.0 - skew - (to - from);

        let options = AnimateOptions::from_duration(self.config.card_revealing_duration * 1000.0)
            .with_persist(false);
        let container = animate_one(
            &elements.container,
            &Keyframes::transforms([
                transform::orbit(from, self.config.card_distance, 0.0, facing),
                transform::orbit(to, self.config.card_reveal_distance, -REVEAL_LIFT, flipped),
            ]),
            options.clone(),
        );
        let face = animate_one(
            &elements.face,
            &Keyframes::transforms(["translateY(0px)"]),
            options.clone(),
        );
        let shadow = animate_one(
            &elements.shadow,
            &Keyframes::transforms([format!("translateY({REVEAL_LIFT}px) %s")]),
            options,
        );

        let animations = vec![container, face, shadow];
        let poster = self.mailbox.poster(self.epoch);
        AnimationControls::merge(animations.clone())
            .on_finish(move || poster.post(Message::Revealed { card: id }));
        self.state.revealing.animations = animations;
        log::info!("revealing card {id}");
    }

    /// Play the reveal backwards
    fn unreveal(&mut self) {
        let Some(id) = self.state.revealing.reveal_id else {
            return;
        };
        self.state.revealing.state = RevealState::Unrevealing;
        for handle in &self.state.revealing.animations {
            if let Err(err) = handle.reverse() {
                log::warn!("unreveal: {err}");
            }
        }
        let poster = self.mailbox.poster(self.epoch);
        AnimationControls::merge(self.state.revealing.animations.clone())
            .on_finish(move || poster.post(Message::Unrevealed { card: id }));
        log::info!("unrevealing card {id}");
    }

    fn abandon_reveal(&mut self) {
        for handle in self.state.revealing.animations.drain(..) {
            handle.cancel();
        }
        self.state.revealing.reveal_id = None;
        self.state.revealing.state = RevealState::PreRevealing;
    }

    fn owns_reveal(&self, state: RevealState, card: usize) -> bool {
        self.state.revealing.state == state && self.state.revealing.reveal_id == Some(card)
    }

    pub(super) fn on_revealed(&mut self, card: usize) {
        if self.owns_reveal(RevealState::Revealing, card) {
            self.state.revealing.state = RevealState::DoneRevealing;
            log::info!("card {card} revealed");
        }
    }

    pub(super) fn on_unrevealed(&mut self, card: usize) {
        if !self.owns_reveal(RevealState::Unrevealing, card) {
            return;
        }
        self.abandon_reveal();
        log::info!("card {card} back on the ring");
        if self.config.redealing_animation {
            self.state.kinetic.stop();
            self.start_first_run(true);
        }
    }

    pub(super) fn on_content_ready(&mut self, card: usize, content: &str) {
        if !self.owns_reveal(RevealState::Revealing, card)
            || !self.state.revealing.animations.is_empty()
        {
            return;
        }
        if let Some(handle) = self.card(card) {
            handle.set_front_content(content);
            handle.stop_shaking();
        }
        self.launch_reveal(card);
    }

    pub(super) fn on_content_failed(&mut self, card: usize, error: &ProviderError) {
        if !self.owns_reveal(RevealState::Revealing, card) {
            return;
        }
        if let Some(handle) = self.card(card) {
            handle.stop_shaking();
        }
        log::warn!("reveal of card {card} abandoned: {error}");
        self.abandon_reveal();
    }
}
