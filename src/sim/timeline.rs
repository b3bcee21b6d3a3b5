//! Manually advanced clock and the playbacks it drives
//!
//! Effects are sampled at the nearest keyframe rather than interpolated;
//! that's all the carousel logic and its tests need to observe.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::element::ElementInner;
use crate::anim::{
    Listener, PlayState, Playback, PlaybackEvent, PlaybackDirection, Property, ResolvedKeyframes,
    Timing,
};

#[derive(Default)]
pub(super) struct TimelineInner {
    pub(super) now: f64,
    pub(super) playbacks: Vec<Weak<SimPlayback>>,
}

/// Shared clock; clones observe the same time
#[derive(Clone, Default)]
pub struct SimTimeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl SimTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time (ms)
    pub fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    /// Move time forward and settle every running playback
    pub fn advance(&self, dt: f64) {
        let (now, live) = {
            let mut inner = self.inner.borrow_mut();
            inner.now += dt.max(0.0);
            inner.playbacks.retain(|p| p.strong_count() > 0);
            let live: Vec<Rc<SimPlayback>> =
                inner.playbacks.iter().filter_map(Weak::upgrade).collect();
            (inner.now, live)
        };
        for playback in live {
            playback.sync(now);
        }
    }

    pub fn advance_to(&self, time: f64) {
        let dt = time - self.now();
        self.advance(dt);
    }

    /// Playbacks still running (not paused, idle or finished)
    pub fn running(&self) -> usize {
        self.inner
            .borrow()
            .playbacks
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|p| p.play_state() == PlayState::Running)
            .count()
    }

    pub(super) fn clock(&self) -> Weak<RefCell<TimelineInner>> {
        Rc::downgrade(&self.inner)
    }
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    play_state: PlayState,
    /// Position along [0, end] (ms)
    time: f64,
    rate: f64,
    synced_at: f64,
}

pub struct SimPlayback {
    this: Weak<SimPlayback>,
    element: Weak<ElementInner>,
    clock: Weak<RefCell<TimelineInner>>,
    keyframes: ResolvedKeyframes,
    timing: Timing,
    progress: RefCell<Progress>,
    listeners: RefCell<Vec<(PlaybackEvent, Listener)>>,
}

impl SimPlayback {
    pub(super) fn start(
        element: Weak<ElementInner>,
        clock: Weak<RefCell<TimelineInner>>,
        keyframes: ResolvedKeyframes,
        timing: Timing,
        now: f64,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            element,
            clock,
            keyframes,
            timing,
            progress: RefCell::new(Progress {
                play_state: PlayState::Running,
                time: 0.0,
                rate: 1.0,
                synced_at: now,
            }),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn now(&self) -> f64 {
        self.clock.upgrade().map(|c| c.borrow().now).unwrap_or(0.0)
    }

    fn end(&self) -> f64 {
        self.timing.end_time()
    }

    pub(super) fn sync(&self, now: f64) {
        let finished = {
            let mut p = self.progress.borrow_mut();
            let mut finished = false;
            if p.play_state == PlayState::Running {
                p.time += (now - p.synced_at) * p.rate;
                let end = self.end();
                if p.rate >= 0.0 && p.time >= end {
                    p.time = end;
                    p.play_state = PlayState::Finished;
                    finished = true;
                } else if p.rate < 0.0 && p.time <= 0.0 {
                    p.time = 0.0;
                    p.play_state = PlayState::Finished;
                    finished = true;
                }
            }
            p.synced_at = now;
            finished
        };
        if finished {
            self.emit(PlaybackEvent::Finish);
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let ready: Vec<Listener> = {
            let mut listeners = self.listeners.borrow_mut();
            let (fire, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut *listeners)
                .into_iter()
                .partition(|(e, _)| *e == event);
            *listeners = keep;
            fire.into_iter().map(|(_, l)| l).collect()
        };
        for listener in ready {
            listener();
        }
    }

    fn attach(&self) {
        if let (Some(element), Some(this)) = (self.element.upgrade(), self.this.upgrade()) {
            element.attach_animation(this);
        }
    }

    fn detach(&self) {
        if let Some(element) = self.element.upgrade() {
            element.detach_animation(self as *const SimPlayback);
        }
    }

    /// Value this effect contributes for `property` right now, if any
    pub fn effect_value(&self, property: Property) -> Option<String> {
        let p = *self.progress.borrow();
        if p.play_state == PlayState::Idle {
            return None;
        }
        let values = self.keyframes.values(property);
        if values.is_empty() {
            return None;
        }

        let t = &self.timing;
        let local = p.time - t.delay;
        let active = t.active_duration();
        let backwards = p.rate < 0.0;

        if local < 0.0 || (backwards && local <= 0.0) {
            return t.fill.fills_backwards().then(|| values[0].clone());
        }
        if local > active || (!backwards && local >= active) {
            return t.fill.fills_forwards().then(|| values[values.len() - 1].clone());
        }
        if t.duration <= 0.0 {
            return values.last().cloned();
        }

        let position = local / t.duration + t.iteration_start;
        let iteration = position.floor();
        let mut fraction = position - iteration;
        let odd = (iteration as i64) % 2 == 1;
        fraction = match t.direction {
            PlaybackDirection::Normal => fraction,
            PlaybackDirection::Reverse => 1.0 - fraction,
            PlaybackDirection::Alternate if odd => 1.0 - fraction,
            PlaybackDirection::Alternate => fraction,
            PlaybackDirection::AlternateReverse if odd => fraction,
            PlaybackDirection::AlternateReverse => 1.0 - fraction,
        };

        if values.len() == 1 {
            // Implicit start frame is the element's own style
            return (fraction >= 0.5).then(|| values[0].clone());
        }
        let step = (fraction * (values.len() - 1) as f64).round() as usize;
        values.get(step.min(values.len() - 1)).cloned()
    }

    pub fn current_time(&self) -> f64 {
        self.progress.borrow().time
    }

    pub fn rate(&self) -> f64 {
        self.progress.borrow().rate
    }
}

impl Playback for SimPlayback {
    fn play(&self) {
        let now = self.now();
        let end = self.end();
        let was_idle = {
            let mut p = self.progress.borrow_mut();
            let was_idle = p.play_state == PlayState::Idle;
            match p.play_state {
                PlayState::Running => return,
                PlayState::Paused => {}
                PlayState::Idle | PlayState::Finished => {
                    if p.rate >= 0.0 {
                        if was_idle || p.time >= end {
                            p.time = 0.0;
                        }
                    } else if was_idle || p.time <= 0.0 {
                        p.time = end;
                    }
                }
            }
            p.play_state = PlayState::Running;
            p.synced_at = now;
            was_idle
        };
        if was_idle {
            self.attach();
        }
    }

    fn pause(&self) {
        self.sync(self.now());
        let mut p = self.progress.borrow_mut();
        if p.play_state == PlayState::Running {
            p.play_state = PlayState::Paused;
        }
    }

    fn finish(&self) {
        if self.timing.is_infinite() {
            log::warn!("finish() on an endless animation; ignoring");
            return;
        }
        let was_idle = {
            let mut p = self.progress.borrow_mut();
            if p.play_state == PlayState::Finished {
                return;
            }
            let was_idle = p.play_state == PlayState::Idle;
            p.time = if p.rate >= 0.0 { self.end() } else { 0.0 };
            p.play_state = PlayState::Finished;
            p.synced_at = self.now();
            was_idle
        };
        if was_idle {
            self.attach();
        }
        self.emit(PlaybackEvent::Finish);
    }

    fn cancel(&self) {
        {
            let mut p = self.progress.borrow_mut();
            if p.play_state == PlayState::Idle {
                return;
            }
            p.play_state = PlayState::Idle;
            p.time = 0.0;
        }
        self.detach();
        self.emit(PlaybackEvent::Cancel);
    }

    fn reverse(&self) {
        self.sync(self.now());
        {
            let mut p = self.progress.borrow_mut();
            p.rate = -p.rate;
        }
        let state = self.play_state();
        if state == PlayState::Running {
            return;
        }
        self.play();
    }

    fn commit_styles(&self) {
        let Some(element) = self.element.upgrade() else {
            return;
        };
        for property in self.keyframes.properties() {
            if let Some(value) = self.effect_value(property) {
                element.write_inline(property, &value);
            }
        }
    }

    fn play_state(&self) -> PlayState {
        self.progress.borrow().play_state
    }

    fn add_listener(&self, event: PlaybackEvent, listener: Listener) {
        self.listeners.borrow_mut().push((event, listener));
    }
}
