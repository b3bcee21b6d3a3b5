//! The keyframe scheduler entry point

use super::controls::{AnimationControls, Batch};
use super::keyframes::{Keyframes, Property, ResolvedKeyframes};
use super::options::AnimateOptions;
use super::target::Target;
use super::template::resolve_keyframes;

/// Start `keyframes` on every target and return one handle for all of them
///
/// Placeholders are resolved for every target before any animation starts, so
/// `%s` sees the look each element had at call time. Multi-step keyframes
/// pre-set the element's own style to the first frame. Targets that can't
/// animate are skipped silently.
pub fn animate(
    targets: &[Target],
    keyframes: &Keyframes,
    options: impl Into<AnimateOptions>,
) -> AnimationControls {
    let options = options.into();
    let len = targets.len();

    let resolved: Vec<ResolvedKeyframes> = targets
        .iter()
        .enumerate()
        .map(|(i, target)| resolve_keyframes(keyframes.for_element(i), target.as_ref(), i))
        .collect();

    let mut batch = Batch::default();
    for (i, (target, keyframes)) in targets.iter().zip(resolved).enumerate() {
        if keyframes.step_count() > 1 {
            for property in Property::ALL {
                if let Some(first) = keyframes.first_value(property) {
                    target.set_inline(property, &first);
                }
            }
        }

        let timing = options.timing(i, len);
        match target.start_animation(&keyframes, &timing) {
            Some(playback) => batch.push(playback, options.persists()),
            None => log::debug!("animate: target {i} is not attached, skipping"),
        }
    }

    AnimationControls::new(batch)
}

/// `animate` for a single target
pub fn animate_one(
    target: &Target,
    keyframes: &Keyframes,
    options: impl Into<AnimateOptions>,
) -> AnimationControls {
    animate(std::slice::from_ref(target), keyframes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::keyframes::Keyframe;
    use crate::anim::options::Delay;
    use crate::anim::stagger::{StaggerConfig, StaggerFrom, stagger};
    use crate::anim::target::AnimationTarget;
    use crate::sim::{SimElement, SimTimeline};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_persisted_end_state_sticks() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        element.set_inline(Property::Transform, "rotateY(30deg)");

        animate_one(
            &element.target(),
            &Keyframes::transforms(["%s translateY(10px)"]),
            300.0,
        );
        timeline.advance(400.0);

        assert_eq!(
            element.inline(Property::Transform).as_deref(),
            Some("rotateY(30deg) translateY(10px)")
        );
        assert_eq!(element.animation_count(), 0);
    }

    #[test]
    fn test_without_persist_effect_keeps_filling() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        element.set_inline(Property::Opacity, "1");

        animate_one(
            &element.target(),
            &Keyframes::List(vec![Keyframe::opacity(0.0)]),
            AnimateOptions::from_duration(100.0).with_persist(false),
        );
        timeline.advance(200.0);

        assert_eq!(element.inline(Property::Opacity).as_deref(), Some("1"));
        assert_eq!(
            element.computed_value(Property::Opacity).as_deref(),
            Some("0")
        );
        assert_eq!(element.animation_count(), 1);
    }

    #[test]
    fn test_multi_step_pre_sets_first_frame() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "e");
        animate_one(
            &element.target(),
            &Keyframes::transforms(["translateX(5px)", "translateX(50px)"]),
            AnimateOptions::from_duration(100.0).with_delay(1000.0),
        );
        assert_eq!(
            element.inline(Property::Transform).as_deref(),
            Some("translateX(5px)")
        );
    }

    #[test]
    fn test_placeholders_resolve_before_any_start() {
        let timeline = SimTimeline::new();
        let a = SimElement::new(&timeline, "a");
        let b = SimElement::new(&timeline, "b");
        a.set_inline(Property::Transform, "scale(1)");
        b.set_inline(Property::Transform, "scale(2)");

        animate(
            &[a.target(), b.target()],
            &Keyframes::transforms(["%s translateZ(%ipx)", "translateZ(0px)"]),
            100.0,
        );
        assert_eq!(
            a.inline(Property::Transform).as_deref(),
            Some("scale(1) translateZ(0px)")
        );
        assert_eq!(
            b.inline(Property::Transform).as_deref(),
            Some("scale(2) translateZ(1px)")
        );
    }

    #[test]
    fn test_detached_target_is_a_no_op() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "gone");
        element.detach();

        let handle = animate_one(&element.target(), &Keyframes::transforms(["x"]), 100.0);
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        handle.on_finish(move || f.set(true));
        assert!(fired.get());
        assert_eq!(element.animation_count(), 0);
    }

    #[test]
    fn test_stagger_orders_starts() {
        let timeline = SimTimeline::new();
        let elements: Vec<SimElement> = (0..3)
            .map(|i| SimElement::new(&timeline, &format!("e{i}")))
            .collect();
        let targets: Vec<Target> = elements.iter().map(SimElement::target).collect();
        animate(
            &targets,
            &Keyframes::transforms(["translateX(1px)"]),
            AnimateOptions::from_duration(50.0).with_delay(Delay::from(stagger(
                100.0,
                StaggerConfig {
                    start: 0.0,
                    from: StaggerFrom::Last,
                },
            ))),
        );

        timeline.advance(60.0);
        assert_eq!(elements[2].animation_count(), 0);
        assert_eq!(elements[0].animation_count(), 1);
        timeline.advance(200.0);
        assert_eq!(elements[0].animation_count(), 0);
    }
}
