//! Fan a list of keyframe steps out over per-item element groups
//!
//! Each item yields a group of targets (e.g. a card's container and shadow).
//! Step `j` of the sequence is animated on the `j`-th target of every group at
//! once, so all containers move together and all shadows move together.

use super::animate::animate;
use super::controls::AnimationControls;
use super::keyframes::Keyframes;
use super::options::AnimateOptions;
use super::target::Target;

/// One entry of a branch: keyframes plus optional overrides
#[derive(Debug, Clone)]
pub struct BranchStep {
    pub keyframes: Keyframes,
    pub options: Option<AnimateOptions>,
}

impl BranchStep {
    pub fn new(keyframes: impl Into<Keyframes>) -> Self {
        Self {
            keyframes: keyframes.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: impl Into<AnimateOptions>) -> Self {
        self.options = Some(options.into());
        self
    }
}

/// Animate `steps` across the target groups produced from `items`
///
/// Only `min(group size, steps)` positions are used. Step options are merged
/// over `defaults`.
pub fn branch<T>(
    items: &[T],
    groups: impl Fn(&T) -> Vec<Target>,
    steps: &[BranchStep],
    defaults: Option<&AnimateOptions>,
) -> AnimationControls {
    let groups: Vec<Vec<Target>> = items.iter().map(groups).collect();
    let Some(width) = groups.iter().map(Vec::len).min() else {
        return AnimationControls::empty();
    };
    let width = width.min(steps.len());
    let base = defaults.cloned().unwrap_or_default();

    let handles = (0..width)
        .map(|j| {
            let column: Vec<Target> = groups.iter().map(|g| g[j].clone()).collect();
            let step = &steps[j];
            let options = match &step.options {
                Some(options) => options.merged_over(&base),
                None => base.clone(),
            };
            animate(&column, &step.keyframes, options)
        })
        .collect();

    AnimationControls::merge(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::keyframes::{Keyframe, Property};
    use crate::sim::{SimElement, SimTimeline};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Pair {
        body: SimElement,
        shadow: SimElement,
    }

    fn pairs(timeline: &SimTimeline, n: usize) -> Vec<Pair> {
        (0..n)
            .map(|i| Pair {
                body: SimElement::new(timeline, &format!("body{i}")),
                shadow: SimElement::new(timeline, &format!("shadow{i}")),
            })
            .collect()
    }

    #[test]
    fn test_columns_animate_in_parallel() {
        let timeline = SimTimeline::new();
        let items = pairs(&timeline, 3);
        let handle = branch(
            &items,
            |p| vec![p.body.target(), p.shadow.target()],
            &[
                BranchStep::new(Keyframes::per_element(|i| {
                    Keyframes::transforms([format!("translateX({i}px)")])
                })),
                BranchStep::new(Keyframe::opacity(0.5)).with_options(50.0),
            ],
            Some(&AnimateOptions::from_duration(100.0)),
        );
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        handle.on_finish(move || d.set(true));

        timeline.advance(60.0);
        assert_eq!(items[1].shadow.inline(Property::Opacity).as_deref(), Some("0.5"));
        assert!(!done.get());
        timeline.advance(60.0);
        assert!(done.get());
        assert_eq!(
            items[2].body.inline(Property::Transform).as_deref(),
            Some("translateX(2px)")
        );
    }

    #[test]
    fn test_extra_steps_are_ignored() {
        let timeline = SimTimeline::new();
        let items = pairs(&timeline, 2);
        branch(
            &items,
            |p| vec![p.body.target()],
            &[
                BranchStep::new(Keyframes::transforms(["translateY(1px)"])),
                BranchStep::new(Keyframes::transforms(["translateY(2px)"])),
            ],
            Some(&AnimateOptions::from_duration(10.0)),
        );
        timeline.advance(20.0);
        assert_eq!(
            items[0].body.inline(Property::Transform).as_deref(),
            Some("translateY(1px)")
        );
        assert_eq!(items[0].shadow.animation_count(), 0);
    }

    #[test]
    fn test_no_items_is_empty() {
        let items: Vec<Pair> = Vec::new();
        let handle = branch(&items, |p| vec![p.body.target()], &[], None);
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        handle.on_finish(move || d.set(true));
        assert!(done.get());
    }
}
