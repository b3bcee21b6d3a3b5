//! Uniform control handles
//!
//! A handle drives either a batch of playbacks started together or a
//! composition of other handles. Listeners are one-shot and fire once every
//! member has emitted the event since registration.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;

use super::target::{Listener, Playback, PlaybackEvent};
use crate::error::ControlError;

/// How a handle settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Cancelled,
}

pub trait Controls {
    fn play(&self);
    fn pause(&self);
    /// Jump to the end
    fn finish(&self);
    fn cancel(&self);
    fn reverse(&self) -> Result<(), ControlError>;
    /// Freeze the current look into the element and drop the animation
    fn stop(&self);
    fn on_finish(&self, listener: Listener);
    fn on_cancel(&self, listener: Listener);
}

/// Shared, cloneable control handle
#[derive(Clone)]
pub struct AnimationControls(Rc<dyn Controls>);

impl AnimationControls {
    pub fn new(controls: impl Controls + 'static) -> Self {
        Self(Rc::new(controls))
    }

    /// A handle with nothing to drive; finish listeners fire immediately
    pub fn empty() -> Self {
        Self::new(Batch::default())
    }

    /// Combine handles; listeners wait for all of them
    pub fn merge(handles: Vec<AnimationControls>) -> Self {
        Self::new(Merged { members: handles })
    }

    pub fn play(&self) {
        self.0.play()
    }

    pub fn pause(&self) {
        self.0.pause()
    }

    pub fn finish(&self) {
        self.0.finish()
    }

    pub fn cancel(&self) {
        self.0.cancel()
    }

    pub fn reverse(&self) -> Result<(), ControlError> {
        self.0.reverse()
    }

    pub fn stop(&self) {
        self.0.stop()
    }

    pub fn on_finish(&self, listener: impl FnOnce() + 'static) {
        self.0.on_finish(Box::new(listener))
    }

    pub fn on_cancel(&self, listener: impl FnOnce() + 'static) {
        self.0.on_cancel(Box::new(listener))
    }

    /// Resolves on whichever of finish/cancel happens first
    pub fn finished(&self) -> impl Future<Output = Outcome> + 'static {
        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_finish = tx.clone();
        self.on_finish(move || {
            let sender = on_finish.borrow_mut().take();
            if let Some(sender) = sender {
                let _ = sender.send(Outcome::Finished);
            }
        });
        self.on_cancel(move || {
            let sender = tx.borrow_mut().take();
            if let Some(sender) = sender {
                let _ = sender.send(Outcome::Cancelled);
            }
        });

        async move { rx.await.unwrap_or(Outcome::Cancelled) }
    }
}

/// Calls the listener once `count` arrivals have been seen
struct Join {
    remaining: Cell<usize>,
    listener: RefCell<Option<Listener>>,
}

impl Join {
    fn new(count: usize, listener: Listener) -> Rc<Self> {
        Rc::new(Self {
            remaining: Cell::new(count),
            listener: RefCell::new(Some(listener)),
        })
    }

    fn arrive(&self) {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            let listener = self.listener.borrow_mut().take();
            if let Some(listener) = listener {
                listener();
            }
        }
    }
}

struct Entry {
    playback: Rc<dyn Playback>,
    /// Set once a persisted playback has committed and been discarded
    retired: Rc<Cell<bool>>,
}

/// Playbacks started by one `animate` call
#[derive(Default)]
pub(crate) struct Batch {
    entries: Vec<Entry>,
}

impl Batch {
    pub(crate) fn push(&mut self, playback: Rc<dyn Playback>, persist: bool) {
        let retired = Rc::new(Cell::new(false));
        if persist {
            let weak: Weak<dyn Playback> = Rc::downgrade(&playback);
            let flag = retired.clone();
            playback.add_listener(
                PlaybackEvent::Finish,
                Box::new(move || {
                    if let Some(playback) = weak.upgrade() {
                        playback.commit_styles();
                        flag.set(true);
                        playback.cancel();
                    }
                }),
            );
        }
        self.entries.push(Entry { playback, retired });
    }

    fn active(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.retired.get())
    }

    fn listen(&self, event: PlaybackEvent, listener: Listener) {
        let active: Vec<&Entry> = self.active().collect();
        if active.is_empty() {
            // Nothing left to wait for, whichever event was asked for
            listener();
            return;
        }

        let join = Join::new(active.len(), listener);
        for entry in active {
            let join = join.clone();
            let retired = entry.retired.clone();
            entry.playback.add_listener(
                event,
                Box::new(move || {
                    // The discard of a persisted playback is not a user cancel
                    if event == PlaybackEvent::Cancel && retired.get() {
                        return;
                    }
                    join.arrive();
                }),
            );
        }
    }
}

impl Controls for Batch {
    fn play(&self) {
        self.active().for_each(|e| e.playback.play());
    }

    fn pause(&self) {
        self.active().for_each(|e| e.playback.pause());
    }

    fn finish(&self) {
        self.active().for_each(|e| e.playback.finish());
    }

    fn cancel(&self) {
        self.active().for_each(|e| e.playback.cancel());
    }

    fn reverse(&self) -> Result<(), ControlError> {
        self.active().for_each(|e| e.playback.reverse());
        Ok(())
    }

    fn stop(&self) {
        for entry in self.active() {
            entry.playback.commit_styles();
            entry.playback.cancel();
        }
    }

    fn on_finish(&self, listener: Listener) {
        self.listen(PlaybackEvent::Finish, listener)
    }

    fn on_cancel(&self, listener: Listener) {
        self.listen(PlaybackEvent::Cancel, listener)
    }
}

struct Merged {
    members: Vec<AnimationControls>,
}

impl Merged {
    fn listen(&self, listener: Listener, register: fn(&AnimationControls, Listener)) {
        if self.members.is_empty() {
            listener();
            return;
        }
        let join = Join::new(self.members.len(), listener);
        for member in &self.members {
            let join = join.clone();
            register(member, Box::new(move || join.arrive()));
        }
    }
}

impl Controls for Merged {
    fn play(&self) {
        self.members.iter().for_each(AnimationControls::play);
    }

    fn pause(&self) {
        self.members.iter().for_each(AnimationControls::pause);
    }

    fn finish(&self) {
        self.members.iter().for_each(AnimationControls::finish);
    }

    fn cancel(&self) {
        self.members.iter().for_each(AnimationControls::cancel);
    }

    fn reverse(&self) -> Result<(), ControlError> {
        self.members
            .iter()
            .map(AnimationControls::reverse)
            .fold(Ok(()), |acc, r| acc.and(r))
    }

    fn stop(&self) {
        self.members.iter().for_each(AnimationControls::stop);
    }

    fn on_finish(&self, listener: Listener) {
        self.listen(listener, |member, l| member.0.on_finish(l))
    }

    fn on_cancel(&self, listener: Listener) {
        self.listen(listener, |member, l| member.0.on_cancel(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::animate::animate;
    use crate::anim::keyframes::{Keyframes, Property};
    use crate::anim::options::AnimateOptions;
    use crate::anim::target::{AnimationTarget, Target};
    use crate::sim::{SimElement, SimTimeline};
    use futures::FutureExt;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    fn slide(timeline: &SimTimeline, n: usize) -> (Vec<SimElement>, AnimationControls) {
        let elements: Vec<SimElement> = (0..n)
            .map(|i| SimElement::new(timeline, &format!("e{i}")))
            .collect();
        let targets: Vec<Target> = elements.iter().map(SimElement::target).collect();
        let handle = animate(
            &targets,
            &Keyframes::transforms(["translateX(0px)", "translateX(100px)"]),
            AnimateOptions::from_duration(100.0),
        );
        (elements, handle)
    }

    #[test]
    fn test_empty_handle_finishes_immediately() {
        let (count, listener) = counter();
        AnimationControls::empty().on_finish(listener);
        assert_eq!(count.get(), 1);
        assert_eq!(
            AnimationControls::empty().finished().now_or_never(),
            Some(Outcome::Finished)
        );
    }

    #[test]
    fn test_finish_waits_for_every_playback() {
        let timeline = SimTimeline::new();
        let elements: Vec<SimElement> = (0..2)
            .map(|i| SimElement::new(&timeline, &format!("e{i}")))
            .collect();
        let targets: Vec<Target> = elements.iter().map(SimElement::target).collect();
        let handle = animate(
            &targets,
            &Keyframes::transforms(["translateX(100px)"]),
            AnimateOptions::from_duration(100.0).with_delay(crate::anim::options::Delay::PerIndex(
                Rc::new(|i, _| i as f64 * 100.0),
            )),
        );
        let (count, listener) = counter();
        handle.on_finish(listener);

        timeline.advance(150.0);
        assert_eq!(count.get(), 0);
        timeline.advance(100.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_persisted_discard_is_not_a_cancel() {
        let timeline = SimTimeline::new();
        let (elements, handle) = slide(&timeline, 1);
        let (cancels, on_cancel) = counter();
        let (finishes, on_finish) = counter();
        handle.on_cancel(on_cancel);
        handle.on_finish(on_finish);

        timeline.advance(200.0);
        assert_eq!(finishes.get(), 1);
        assert_eq!(cancels.get(), 0);
        assert_eq!(
            elements[0].inline(Property::Transform).as_deref(),
            Some("translateX(100px)")
        );
        assert_eq!(elements[0].animation_count(), 0);
    }

    #[test]
    fn test_stop_commits_current_look() {
        let timeline = SimTimeline::new();
        let (elements, handle) = slide(&timeline, 1);
        timeline.advance(60.0);
        let mid = elements[0].computed_value(Property::Transform);
        let (cancels, on_cancel) = counter();
        handle.on_cancel(on_cancel);

        handle.stop();
        assert_eq!(cancels.get(), 1);
        assert_eq!(elements[0].inline(Property::Transform), mid);
        assert_eq!(elements[0].animation_count(), 0);
    }

    #[test]
    fn test_merged_listeners_wait_for_all() {
        let timeline = SimTimeline::new();
        let (_a, first) = slide(&timeline, 1);
        timeline.advance(50.0);
        let (_b, second) = slide(&timeline, 1);
        let merged = AnimationControls::merge(vec![first, second]);
        let mut outcome = merged.finished().boxed_local();

        timeline.advance(60.0);
        assert_eq!((&mut outcome).now_or_never(), None);
        timeline.advance(60.0);
        assert_eq!(outcome.now_or_never(), Some(Outcome::Finished));
    }

    #[test]
    fn test_merged_cancel_with_an_empty_member() {
        let timeline = SimTimeline::new();
        let (_elements, real) = slide(&timeline, 1);
        let merged = AnimationControls::merge(vec![real, AnimationControls::empty()]);
        let (cancels, on_cancel) = counter();
        merged.on_cancel(on_cancel);
        let outcome = merged.finished();

        merged.cancel();
        timeline.advance(500.0);
        assert_eq!(cancels.get(), 1);
        assert_eq!(outcome.now_or_never(), Some(Outcome::Cancelled));
    }

    #[test]
    fn test_empty_handle_reports_cancel_listeners_too() {
        let (count, listener) = counter();
        AnimationControls::empty().on_cancel(listener);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cancel_resolves_finished_future_as_cancelled() {
        let timeline = SimTimeline::new();
        let (_elements, handle) = slide(&timeline, 3);
        let outcome = handle.finished();
        handle.cancel();
        assert_eq!(outcome.now_or_never(), Some(Outcome::Cancelled));
    }

    #[test]
    fn test_listener_only_sees_events_after_registration() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        let handle = animate(
            &[element.target()],
            &Keyframes::transforms(["translateX(10px)"]),
            AnimateOptions::from_duration(100.0).with_persist(false),
        );
        timeline.advance(150.0);
        let (count, listener) = counter();
        handle.on_finish(listener);
        assert_eq!(count.get(), 0);

        handle.play();
        timeline.advance(150.0);
        assert_eq!(count.get(), 1);
    }
}
