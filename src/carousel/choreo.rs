//! First-run choreography: gather into a deck, shuffle, deal onto the ring
//!
//! Every random decision is drawn up front, so a seeded RNG replays the same
//! shuffle no matter when the steps actually run.

use std::rc::Rc;

use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::card::CardElements;
use super::transform::{deck, facing_degrees, orbit};
use crate::anim::{
    AnimateOptions, AnimationControls, BranchStep, Easing, Keyframe, Keyframes, Step, StaggerConfig,
    StaggerFrom, Target, animate, branch, sequence, stagger,
};
use crate::config::CarouselConfig;
use crate::consts::{
    DEALING_FINISH_SKEW_DEGREE, TO_DEALING_DURATION, TO_SHUFFLING_DELAY, TO_SHUFFLING_DURATION,
};

/// A card's ring slot and its elements
type Item = (usize, CardElements);

/// Stack position of each item in the deck, by item index
type Layers = Vec<usize>;

fn layer_of(layers: &[usize], i: usize) -> usize {
    layers.get(i).copied().unwrap_or(i)
}

fn container_and_shadow(item: &Item) -> Vec<Target> {
    vec![item.1.container.clone(), item.1.shadow.clone()]
}

/// Build and start the first-run sequence
///
/// With shuffling on: into the deck, `number_of_shuffling` shuffles, down to
/// the dealing height, deal. Without it the cards are dealt from where they
/// are, except on a redeal where they first gather into the deck.
pub(crate) fn first_run(
    config: &CarouselConfig,
    items: Vec<Item>,
    rng: &mut Pcg32,
    redeal: bool,
) -> AnimationControls {
    let config = Rc::new(config.clone());
    let items = Rc::new(items);
    let mut layers: Layers = (0..items.len()).collect();
    let mut steps: Vec<Step> = Vec::new();

    if config.shuffling_animation {
        steps.push(to_shuffling(&config, &items, layers.clone()));
        let max = config.shuffling_max_distance.abs();
        for _ in 0..config.number_of_shuffling {
            let offsets: Vec<f64> = (0..items.len())
                .map(|_| rng.random_range(-max..=max))
                .collect();
            let mut next = layers.clone();
            next.shuffle(rng);
            steps.push(shuffle_once(&config, &items, layers, next.clone(), offsets));
            layers = next;
        }
    }
    if config.shuffling_animation || redeal {
        steps.push(to_dealing(&config, &items, layers.clone()));
    }
    steps.push(deal(&config, &items, layers));

    log::debug!(
        "first run: {} cards, {} steps{}",
        items.len(),
        steps.len(),
        if redeal { " (redeal)" } else { "" }
    );
    sequence(steps)
}

/// Every card flies into the deck, shadows fade out
fn to_shuffling(config: &Rc<CarouselConfig>, items: &Rc<Vec<Item>>, layers: Layers) -> Step {
    let (config, items) = (config.clone(), items.clone());
    Box::new(move || {
        let d = config.dealing_deck_distance_from_center;
        let h = config.shuffling_height;
        let containers = Keyframes::per_element(move |i| {
            Keyframes::transforms([deck(d, h, layer_of(&layers, i) + 1, 0.0)])
        });
        let steps = [
            BranchStep::new(containers),
            BranchStep::new(Keyframe::opacity(0.0)),
        ];
        let options = AnimateOptions::from_duration(TO_SHUFFLING_DURATION)
            .with_delay(stagger(TO_SHUFFLING_DELAY, StaggerConfig::default()));
        Some(branch(
            items.as_slice(),
            container_and_shadow,
            &steps,
            Some(&options),
        ))
    })
}

/// Cards slide out sideways and come back at their new stack position
fn shuffle_once(
    config: &Rc<CarouselConfig>,
    items: &Rc<Vec<Item>>,
    from: Layers,
    to: Layers,
    offsets: Vec<f64>,
) -> Step {
    let (config, items) = (config.clone(), items.clone());
    Box::new(move || {
        let d = config.dealing_deck_distance_from_center;
        let h = config.shuffling_height;
        let keyframes = Keyframes::per_element(move |i| {
            let before = layer_of(&from, i) + 1;
            let after = layer_of(&to, i) + 1;
            let lateral = offsets.get(i).copied().unwrap_or(0.0);
            Keyframes::transforms([
                deck(d, h, before, 0.0),
                deck(d, h, before, lateral),
                deck(d, h, after, 0.0),
            ])
        });
        let containers: Vec<Target> = items.iter().map(|(_, e)| e.container.clone()).collect();
        Some(animate(
            &containers,
            &keyframes,
            config.shuffling_duration * 1000.0,
        ))
    })
}

/// The deck settles on the ground
fn to_dealing(config: &Rc<CarouselConfig>, items: &Rc<Vec<Item>>, layers: Layers) -> Step {
    let (config, items) = (config.clone(), items.clone());
    Box::new(move || {
        let d = config.dealing_deck_distance_from_center;
        let keyframes = Keyframes::per_element(move |i| {
            Keyframes::transforms([deck(d, 0.0, layer_of(&layers, i) + 1, 0.0)])
        });
        let containers: Vec<Target> = items.iter().map(|(_, e)| e.container.clone()).collect();
        Some(animate(&containers, &keyframes, TO_DEALING_DURATION))
    })
}

/// Top card first: slide off the deck, lift and tilt, land in the ring slot
fn deal(config: &Rc<CarouselConfig>, items: &Rc<Vec<Item>>, layers: Layers) -> Step {
    let (config, items) = (config.clone(), items.clone());
    Box::new(move || {
        let d = config.dealing_deck_distance_from_center;
        let card_distance = config.card_distance;
        let travel = config.dealing_direction.sign() * card_distance;
        let fly = config.dealing_fly_height;
        let skew = config.card_skew;
        let s = config.card_angle();
        let slots: Vec<usize> = items.iter().map(|(slot, _)| *slot).collect();

        let containers = Keyframes::per_element(move |i| {
            let slot = slots.get(i).copied().unwrap_or(i) as f64 * s;
            Keyframes::transforms([
                deck(d, 0.0, layer_of(&layers, i) + 1, 0.0),
                format!("%k0 translateY({travel}px)"),
                format!("%k1 translateZ({fly}px) rotateX(-{DEALING_FINISH_SKEW_DEGREE}deg)"),
                orbit(slot, card_distance, 0.0, facing_degrees(slot, 0.0, skew)),
            ])
        });
        let shadows: Keyframes = [0.0, 0.0, 0.0, config.shadow_opacity]
            .into_iter()
            .map(Keyframe::opacity)
            .collect::<Vec<_>>()
            .into();

        let steps = [BranchStep::new(containers), BranchStep::new(shadows)];
        let options = AnimateOptions::from_duration(config.dealing_duration * 1000.0)
            .with_easing(Easing::Ease)
            .with_delay(stagger(
                config.dealing_delay * 1000.0,
                StaggerConfig {
                    start: 0.0,
                    from: StaggerFrom::Last,
                },
            ));
        Some(branch(
            items.as_slice(),
            container_and_shadow,
            &steps,
            Some(&options),
        ))
    })
}
