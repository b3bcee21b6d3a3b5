//! Per-carousel state and its sub-machines
//!
//! Each sub-machine owns the rule for one frame of its behavior; the frame
//! loop decides which one gets to move the angle.

use crate::anim::AnimationControls;
use crate::consts::KINETIC_STOP_DEGREE;
use crate::{normalize_degrees, shortest_delta, wrap_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapState {
    #[default]
    PreSnapping,
    Snapping,
    DoneSnapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Snapping {
    pub state: SnapState,
    pub goal: f64,
    /// Card facing the viewer once settled
    pub snapped_card: Option<usize>,
}

impl Snapping {
    /// Start over from the current angle on the next frame
    pub fn rearm(&mut self) {
        self.state = SnapState::PreSnapping;
        self.snapped_card = None;
    }

    /// Advance one frame and return the new angle
    ///
    /// `rate` is deg/ms. The angle always takes the shorter way round.
    pub fn step(&mut self, angle: f64, delta: f64, card_angle: f64, rate: f64, n: usize) -> f64 {
        match self.state {
            SnapState::PreSnapping => {
                self.goal = normalize_degrees((angle / card_angle).round() * card_angle);
                self.state = SnapState::Snapping;
                angle
            }
            SnapState::Snapping => {
                let remaining = shortest_delta(angle, self.goal);
                let step = rate * delta;
                if remaining.abs() <= step {
                    self.state = SnapState::DoneSnapping;
                    self.snapped_card = Some(snapped_card(self.goal, card_angle, n));
                    self.goal
                } else {
                    normalize_degrees(angle + step.copysign(remaining))
                }
            }
            SnapState::DoneSnapping => angle,
        }
    }
}

/// Card whose slot faces the viewer when the ring is at `goal`
pub fn snapped_card(goal: f64, card_angle: f64, n: usize) -> usize {
    let slots = (goal / card_angle).round() as i64;
    wrap_index(n as i64 - slots, n)
}

/// Card nearest to facing the viewer at an arbitrary angle
pub fn nearest_card(angle: f64, card_angle: f64, n: usize) -> usize {
    wrap_index((-angle / card_angle).round() as i64, n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    #[default]
    PreRevealing,
    /// Waiting for content or for the reveal animation
    Revealing,
    DoneRevealing,
    Unrevealing,
}

#[derive(Clone, Default)]
pub struct Revealing {
    pub state: RevealState,
    pub reveal_id: Option<usize>,
    /// Container, face and shadow animations of the revealed card
    pub animations: Vec<AnimationControls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KineticState {
    #[default]
    NotScrolling,
    Scrolling,
}

/// Release momentum: an exponential approach to `goal`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KineticTracking {
    pub state: KineticState,
    /// px/s at release
    pub velocity: f64,
    pub amplitude: f64,
    pub goal: f64,
    pub last_time: f64,
    pub last_pos: f64,
}

impl KineticTracking {
    pub fn stop(&mut self) {
        self.state = KineticState::NotScrolling;
        self.amplitude = 0.0;
    }

    /// Decide on release whether to coast; `snap_angle` lands the goal on a card
    #[allow(clippy::too_many_arguments)]
    pub fn release(
        &mut self,
        angle: f64,
        velocity: f64,
        x: f64,
        at: f64,
        weight: f64,
        lower_bound: f64,
        snap_angle: Option<f64>,
    ) -> bool {
        self.velocity = velocity;
        self.last_pos = x;
        if velocity.abs() <= lower_bound || weight == 0.0 {
            return false;
        }

        let mut amplitude = velocity / weight;
        let mut goal = angle + amplitude;
        if let Some(s) = snap_angle.filter(|s| *s > 0.0) {
            goal = (goal / s).round() * s;
            amplitude = goal - angle;
        }

        self.amplitude = amplitude;
        self.goal = goal;
        self.last_time = at;
        self.state = KineticState::Scrolling;
        true
    }

    /// Signed distance still to travel to `goal` at `now`
    pub fn offset(&self, now: f64, deceleration: f64) -> f64 {
        let elapsed = (now - self.last_time).max(0.0);
        -self.amplitude * (-elapsed / deceleration).exp()
    }

    /// Angle at `now`; stops once the remaining offset is negligible
    pub fn step(&mut self, now: f64, deceleration: f64) -> f64 {
        let offset = self.offset(now, deceleration);
        if offset.abs() > KINETIC_STOP_DEGREE {
            normalize_degrees(self.goal + offset)
        } else {
            self.stop();
            normalize_degrees(self.goal)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstRunState {
    #[default]
    Running,
    DoneRunning,
}

#[derive(Clone, Default)]
pub struct FirstRun {
    pub state: FirstRunState,
    /// The shuffle/deal sequence while it runs
    pub sequence: Option<AnimationControls>,
}

/// Everything that changes frame to frame
#[derive(Clone, Default)]
pub struct CarouselState {
    /// Ring rotation in [0, 360)
    pub angle: f64,
    /// Timestamp of the last processed frame
    pub last_time: Option<f64>,
    pub snapping: Snapping,
    pub revealing: Revealing,
    pub kinetic: KineticTracking,
    pub first_run: FirstRun,
}

impl CarouselState {
    pub fn is_running_first(&self) -> bool {
        self.first_run.state == FirstRunState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_snap_goes_the_short_way() {
        let mut snapping = Snapping::default();
        let s = 36.0;
        let mut angle = snapping.step(355.0, 16.0, s, 0.072, 10);
        assert_eq!(snapping.goal, 0.0);
        angle = snapping.step(angle, 16.0, s, 0.072, 10);
        assert!(angle > 355.0);

        for _ in 0..10 {
            angle = snapping.step(angle, 16.0, s, 0.072, 10);
        }
        assert_eq!(snapping.state, SnapState::DoneSnapping);
        assert_eq!(angle, 0.0);
        assert_eq!(snapping.snapped_card, Some(0));
    }

    #[test]
    fn test_snapped_card_matches_slot() {
        assert_eq!(snapped_card(36.0, 36.0, 10), 9);
        assert_eq!(snapped_card(324.0, 36.0, 10), 1);
        assert_eq!(snapped_card(0.0, 72.0, 5), 0);
        assert_eq!(nearest_card(324.0, 36.0, 10), 1);
        assert_eq!(nearest_card(10.0, 36.0, 10), 0);
    }

    #[test]
    fn test_done_snapping_holds() {
        let mut snapping = Snapping {
            state: SnapState::DoneSnapping,
            goal: 72.0,
            snapped_card: Some(8),
        };
        assert_eq!(snapping.step(72.0, 100.0, 36.0, 0.072, 10), 72.0);
        snapping.rearm();
        assert_eq!(snapping.state, SnapState::PreSnapping);
        assert_eq!(snapping.snapped_card, None);
    }

    #[test]
    fn test_slow_release_does_not_coast() {
        let mut kinetic = KineticTracking::default();
        assert!(!kinetic.release(0.0, 250.0, 0.0, 0.0, 10.0, 300.0, Some(36.0)));
        assert_eq!(kinetic.state, KineticState::NotScrolling);
        assert!(kinetic.release(0.0, 250.0, 0.0, 0.0, 10.0, 10.0, None));
    }

    #[test]
    fn test_release_lands_on_a_card() {
        let mut kinetic = KineticTracking::default();
        assert!(kinetic.release(10.0, 700.0, 0.0, 0.0, 10.0, 300.0, Some(36.0)));
        assert_eq!(kinetic.goal, 72.0);
        assert_eq!(kinetic.amplitude, 62.0);
    }

    #[test]
    fn test_kinetic_starts_at_release_angle() {
        let mut kinetic = KineticTracking::default();
        kinetic.release(100.0, 500.0, 0.0, 1000.0, 10.0, 10.0, None);
        let angle = kinetic.step(1000.0, 325.0);
        assert!((angle - 100.0).abs() < 1e-9);
        let later = kinetic.step(1325.0, 325.0);
        assert!(later > 100.0 && later < 150.0);
    }

    proptest! {
        #[test]
        fn prop_snap_converges(angle in 0.0f64..360.0, n in 1usize..40, delta in 1.0f64..50.0) {
            let s = 360.0 / n as f64;
            let mut snapping = Snapping::default();
            let mut a = angle;
            let mut frames = 0;
            while snapping.state != SnapState::DoneSnapping && frames < 10_000 {
                a = snapping.step(a, delta, s, 0.072, n);
                prop_assert!((0.0..360.0).contains(&a));
                frames += 1;
            }
            prop_assert_eq!(snapping.state, SnapState::DoneSnapping);
            let slots = a / s;
            prop_assert!((slots - slots.round()).abs() < 1e-6);
            prop_assert_eq!(snapping.snapped_card, Some(nearest_card(a, s, n)));
        }

        #[test]
        fn prop_kinetic_terminates(
            angle in 0.0f64..360.0,
            velocity in -5000.0f64..5000.0,
            snap_cards in prop::option::of(1usize..40),
        ) {
            let snap = snap_cards.map(|n| 360.0 / n as f64);
            let mut kinetic = KineticTracking::default();
            if kinetic.release(angle, velocity, 0.0, 0.0, 10.0, 10.0, snap) {
                let mut now = 0.0;
                let mut a = angle;
                let mut last = kinetic.offset(now, 325.0).abs();
                while kinetic.state == KineticState::Scrolling && now < 60_000.0 {
                    now += 16.0;
                    let remaining = kinetic.offset(now, 325.0).abs();
                    prop_assert!(remaining <= last);
                    last = remaining;
                    let offset = kinetic.offset(now, 325.0);
                    a = kinetic.step(now, 325.0);
                    prop_assert!((0.0..360.0).contains(&a));
                    if kinetic.state == KineticState::Scrolling {
                        prop_assert_eq!(a, normalize_degrees(kinetic.goal + offset));
                    }
                }
                prop_assert_eq!(kinetic.state, KineticState::NotScrolling);
                prop_assert_eq!(a, normalize_degrees(kinetic.goal));
            }
        }
    }
}
