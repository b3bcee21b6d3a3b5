//! The per-frame tick
//!
//! Order within a frame:
//! 1. Apply mailbox messages from this mount
//! 2. React to press/release edges (kinetic start/stop)
//! 3. Released: dispatch a pending click, then one rotation source
//!    (kinetic > auto-rotate > snapping). Pressed: click-or-drag.
//! 4. Render the ring and every card not owned by the reveal

use super::mailbox::Message;
use super::state::{KineticState, RevealState};
use super::{Carousel, transform};
use crate::anim::Property;
use crate::consts::CLICK_PIXEL_THRESHOLD;
use crate::input::TrackerSignal;
use crate::normalize_degrees;

impl Carousel {
    /// Advance one display frame; `now` is a monotonic timestamp in ms
    pub fn tick(&mut self, now: f64) {
        if !self.mounted {
            return;
        }
        self.deliver();

        let n = self.config.number_of_cards;
        if n == 0 || self.cards.len() < n {
            return;
        }

        if self.state.is_running_first() {
            // The choreography owns every transform; drop input meanwhile
            let mut tracker = self.tracker.borrow_mut();
            tracker.drain_signals();
            tracker.take_click();
            return;
        }

        let delta = match self.state.last_time {
            Some(last) => now - last,
            None => 0.0,
        };
        if self.state.last_time.is_some() && self.config.frame_interval().is_some_and(|i| delta < i)
        {
            return;
        }
        self.state.last_time = Some(now);

        let signals = self.tracker.borrow_mut().drain_signals();
        for signal in signals {
            self.on_signal(signal);
        }

        let pressed = self.tracker.borrow().cursor().pressed;
        let mut angle = self.state.angle;
        if pressed {
            angle = self.manual_rotate(angle);
        } else {
            let click = self.tracker.borrow_mut().take_click();
            if let Some(card) = click {
                self.on_click(card);
            }
            if self.state.revealing.state == RevealState::PreRevealing {
                angle = self.free_rotate(angle, now, delta);
            }
        }

        self.state.angle = angle;
        self.render();
    }

    fn deliver(&mut self) {
        for (epoch, message) in self.mailbox.drain() {
            if epoch != self.epoch {
                log::debug!("dropping {message:?} from epoch {epoch}");
                continue;
            }
            match message {
                Message::FirstRunDone => {
                    if self.state.is_running_first() {
                        self.finish_first_run();
                    }
                }
                Message::Revealed { card } => self.on_revealed(card),
                Message::Unrevealed { card } => self.on_unrevealed(card),
                Message::ContentReady { card, content } => self.on_content_ready(card, &content),
                Message::ContentFailed { card, error } => self.on_content_failed(card, &error),
            }
        }
    }

    fn on_signal(&mut self, signal: TrackerSignal) {
        match signal {
            TrackerSignal::Pressed { .. } => {
                if self.state.kinetic.state == KineticState::Scrolling {
                    self.state.kinetic.stop();
                    self.state.snapping.rearm();
                }
            }
            TrackerSignal::Released { at, x, velocity } => {
                let Some(velocity) = velocity else {
                    return;
                };
                if !self.config.kinetic_rotate
                    || self.state.revealing.state != RevealState::PreRevealing
                {
                    return;
                }
                let snap = self
                    .config
                    .card_snapping
                    .then(|| self.config.card_angle());
                let started = self.state.kinetic.release(
                    self.state.angle,
                    velocity,
                    x,
                    at,
                    self.config.kinetic_rotate_weight,
                    self.config.kinetic_velocity_lower_bound(),
                    snap,
                );
                if started {
                    self.state.snapping.rearm();
                    log::debug!(
                        "kinetic scroll: velocity {velocity:.1}, goal {:.1}",
                        self.state.kinetic.goal
                    );
                }
            }
        }
    }

    /// While pressed: a click holds still, a drag turns the ring
    fn manual_rotate(&mut self, angle: f64) -> f64 {
        let mut tracker = self.tracker.borrow_mut();
        let dx = tracker.take_drag_delta();
        if tracker.classify_click(CLICK_PIXEL_THRESHOLD) {
            return angle;
        }
        if !self.config.manual_rotate || self.state.revealing.state != RevealState::PreRevealing {
            return angle;
        }
        if self.config.card_snapping {
            self.state.snapping.rearm();
        }
        normalize_degrees(angle + dx * self.config.degrees_per_pixel())
    }

    /// While released: exactly one rotation source applies
    fn free_rotate(&mut self, angle: f64, now: f64, delta: f64) -> f64 {
        if self.state.kinetic.state == KineticState::Scrolling {
            self.state
                .kinetic
                .step(now, self.config.kinetic_deceleration_rate)
        } else if self.config.auto_rotate {
            normalize_degrees(angle + self.config.auto_rotate_rate() * delta)
        } else if self.config.card_snapping {
            let was = self.state.snapping.state;
            let next = self.state.snapping.step(
                angle,
                delta,
                self.config.card_angle(),
                self.config.snap_rate(),
                self.config.number_of_cards,
            );
            if was != self.state.snapping.state && self.state.snapping.snapped_card.is_some() {
                log::debug!("snapped to card {:?}", self.state.snapping.snapped_card);
            }
            next
        } else {
            angle
        }
    }

    fn render(&self) {
        let angle = self.state.angle;
        self.ring
            .set_inline(Property::Transform, &transform::ring(angle));

        let s = self.config.card_angle();
        let reveal_id = self.state.revealing.reveal_id;
        for (i, card) in self.ring_cards().enumerate() {
            if reveal_id == Some(card.id()) {
                continue;
            }
            let Some(elements) = card.elements() else {
                continue;
            };
            let slot = i as f64 * s;
            elements.container.set_inline(
                Property::Transform,
                &transform::orbit(
                    slot,
                    self.config.card_distance,
                    0.0,
                    transform::facing_degrees(slot, angle, self.config.card_skew),
                ),
            );
        }
    }
}
