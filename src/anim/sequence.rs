//! Run animation factories one after another
//!
//! Each step is a factory invoked only when its turn comes, so it sees the
//! look left behind by the previous step. A step that cancels does not stop
//! the sequence; cancelling the sequence itself does.

use std::cell::RefCell;
use std::rc::Rc;

use super::controls::{AnimationControls, Controls, Outcome};
use super::target::Listener;
use crate::error::ControlError;

/// A deferred animation; `None` means there was nothing to animate
pub type Step = Box<dyn FnOnce() -> Option<AnimationControls>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    /// `finish()` was called; only the last step is allowed to run
    Skipping,
    Settled(Outcome),
}

struct SequenceState {
    steps: Vec<Option<Step>>,
    next: usize,
    current: Option<(usize, AnimationControls)>,
    phase: Phase,
    finish_listeners: Vec<Listener>,
    cancel_listeners: Vec<Listener>,
}

struct Sequence {
    state: Rc<RefCell<SequenceState>>,
}

/// Start a sequence; the first step is invoked right away
pub fn sequence(steps: Vec<Step>) -> AnimationControls {
    let state = Rc::new(RefCell::new(SequenceState {
        steps: steps.into_iter().map(Some).collect(),
        next: 0,
        current: None,
        phase: Phase::Running,
        finish_listeners: Vec::new(),
        cancel_listeners: Vec::new(),
    }));
    advance(&state);
    AnimationControls::new(Sequence { state })
}

/// Invoke the next available step
fn advance(state: &Rc<RefCell<SequenceState>>) {
    loop {
        let (index, step) = {
            let mut s = state.borrow_mut();
            if s.phase != Phase::Running {
                return;
            }
            if s.next >= s.steps.len() {
                drop(s);
                settle(state, Outcome::Finished);
                return;
            }
            let index = s.next;
            s.next += 1;
            (index, s.steps[index].take())
        };

        let Some(handle) = step.and_then(|step| step()) else {
            continue;
        };
        watch(state, index, handle);
        return;
    }
}

/// Track `handle` as step `index` and continue when it settles
fn watch(state: &Rc<RefCell<SequenceState>>, index: usize, handle: AnimationControls) {
    state.borrow_mut().current = Some((index, handle.clone()));

    let on_finish = state.clone();
    handle.on_finish(move || step_settled(&on_finish, index, Outcome::Finished));
    let on_cancel = state.clone();
    handle.on_cancel(move || step_settled(&on_cancel, index, Outcome::Cancelled));
}

fn step_settled(state: &Rc<RefCell<SequenceState>>, index: usize, outcome: Outcome) {
    let phase = {
        let mut s = state.borrow_mut();
        match s.current {
            Some((i, _)) if i == index => {}
            // Stale: a step we already moved past or stopped
            _ => return,
        }
        s.current = None;
        s.phase
    };

    match phase {
        Phase::Running => advance(state),
        Phase::Skipping => settle(state, outcome),
        Phase::Settled(_) => {}
    }
}

fn settle(state: &Rc<RefCell<SequenceState>>, outcome: Outcome) {
    let listeners = {
        let mut s = state.borrow_mut();
        if matches!(s.phase, Phase::Settled(_)) {
            return;
        }
        s.phase = Phase::Settled(outcome);
        let finish = std::mem::take(&mut s.finish_listeners);
        let cancel = std::mem::take(&mut s.cancel_listeners);
        match outcome {
            Outcome::Finished => finish,
            Outcome::Cancelled => cancel,
        }
    };
    for listener in listeners {
        listener();
    }
}

impl Sequence {
    fn current(&self) -> Option<AnimationControls> {
        self.state.borrow().current.as_ref().map(|(_, h)| h.clone())
    }

    fn halt(&self, stop: bool) {
        let current = {
            let mut s = self.state.borrow_mut();
            if matches!(s.phase, Phase::Settled(_)) {
                return;
            }
            s.phase = Phase::Settled(Outcome::Cancelled);
            s.current.take()
        };
        if let Some((_, handle)) = current {
            if stop {
                handle.stop();
            } else {
                handle.cancel();
            }
        }

        let listeners = {
            let mut s = self.state.borrow_mut();
            s.finish_listeners.clear();
            std::mem::take(&mut s.cancel_listeners)
        };
        for listener in listeners {
            listener();
        }
    }
}

impl Controls for Sequence {
    fn play(&self) {
        if let Some(handle) = self.current() {
            handle.play();
        }
    }

    fn pause(&self) {
        if let Some(handle) = self.current() {
            handle.pause();
        }
    }

    /// Skip straight to the last step's end state
    fn finish(&self) {
        let (in_flight, last) = {
            let mut s = self.state.borrow_mut();
            if s.phase != Phase::Running {
                return;
            }
            s.phase = Phase::Skipping;
            let Some(last) = s.steps.len().checked_sub(1) else {
                drop(s);
                settle(&self.state, Outcome::Finished);
                return;
            };
            let last_in_flight = match &s.current {
                Some((i, handle)) if *i == last => Some(handle.clone()),
                _ => None,
            };
            if let Some(handle) = last_in_flight {
                drop(s);
                handle.finish();
                return;
            }
            (s.current.take(), last)
        };

        if let Some((_, handle)) = in_flight {
            handle.stop();
        }

        let factory = self.state.borrow_mut().steps[last].take();
        match factory.and_then(|step| step()) {
            Some(handle) => {
                watch(&self.state, last, handle.clone());
                handle.finish();
            }
            None => settle(&self.state, Outcome::Finished),
        }
    }

    fn cancel(&self) {
        self.halt(false)
    }

    fn reverse(&self) -> Result<(), ControlError> {
        log::warn!("reverse requested on a sequence; ignoring");
        Err(ControlError::ReverseUnsupported)
    }

    fn stop(&self) {
        self.halt(true)
    }

    fn on_finish(&self, listener: Listener) {
        let phase = self.state.borrow().phase;
        match phase {
            Phase::Settled(Outcome::Finished) => listener(),
            Phase::Settled(Outcome::Cancelled) => {}
            _ => self.state.borrow_mut().finish_listeners.push(listener),
        }
    }

    fn on_cancel(&self, listener: Listener) {
        let phase = self.state.borrow().phase;
        match phase {
            Phase::Settled(_) => {}
            _ => self.state.borrow_mut().cancel_listeners.push(listener),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::animate::animate_one;
    use crate::anim::keyframes::{Keyframes, Property};
    use crate::anim::target::AnimationTarget;
    use crate::sim::{SimElement, SimTimeline};
    use futures::FutureExt;
    use std::cell::Cell;

    fn step_to(
        element: &SimElement,
        transform: &'static str,
        ms: f64,
        log: Rc<RefCell<Vec<&'static str>>>,
    ) -> Step {
        let target = element.target();
        Box::new(move || {
            log.borrow_mut().push(transform);
            Some(animate_one(&target, &Keyframes::transforms([transform]), ms))
        })
    }

    #[test]
    fn test_steps_run_in_order() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = sequence(vec![
            step_to(&element, "translateX(1px)", 100.0, log.clone()),
            step_to(&element, "translateX(2px)", 100.0, log.clone()),
        ]);
        let mut outcome = handle.finished().boxed_local();

        assert_eq!(*log.borrow(), vec!["translateX(1px)"]);
        timeline.advance(150.0);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!((&mut outcome).now_or_never(), None);
        timeline.advance(100.0);
        assert_eq!(outcome.now_or_never(), Some(Outcome::Finished));
        assert_eq!(
            element.inline(Property::Transform).as_deref(),
            Some("translateX(2px)")
        );
    }

    #[test]
    fn test_empty_steps_are_skipped() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = sequence(vec![
            Box::new(|| None),
            Box::new(|| Some(AnimationControls::empty())),
            step_to(&element, "translateX(3px)", 100.0, log.clone()),
        ]);
        assert_eq!(*log.borrow(), vec!["translateX(3px)"]);
        timeline.advance(150.0);
        assert_eq!(handle.finished().now_or_never(), Some(Outcome::Finished));
    }

    #[test]
    fn test_cancel_stops_later_steps() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = sequence(vec![
            step_to(&element, "translateX(1px)", 100.0, log.clone()),
            step_to(&element, "translateX(2px)", 100.0, log.clone()),
        ]);
        let outcome = handle.finished();
        handle.cancel();
        timeline.advance(500.0);

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(outcome.now_or_never(), Some(Outcome::Cancelled));
        assert_eq!(element.animation_count(), 0);
    }

    #[test]
    fn test_finish_jumps_to_last_step() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = sequence(vec![
            step_to(&element, "translateX(1px)", 100.0, log.clone()),
            step_to(&element, "translateX(2px)", 100.0, log.clone()),
            step_to(&element, "translateX(3px)", 100.0, log.clone()),
        ]);
        let finished = Rc::new(Cell::new(false));
        let f = finished.clone();
        handle.on_finish(move || f.set(true));

        handle.finish();
        assert_eq!(*log.borrow(), vec!["translateX(1px)", "translateX(3px)"]);
        assert!(finished.get());
        assert_eq!(
            element.inline(Property::Transform).as_deref(),
            Some("translateX(3px)")
        );
        assert_eq!(
            element.computed_value(Property::Transform).as_deref(),
            Some("translateX(3px)")
        );
    }

    #[test]
    fn test_reverse_is_unsupported() {
        let handle = sequence(vec![Box::new(|| Some(AnimationControls::empty()))]);
        assert_eq!(handle.reverse(), Err(ControlError::ReverseUnsupported));
    }
}
