//! Headless card made of three sim elements

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::element::SimElement;
use super::timeline::SimTimeline;
use crate::carousel::{Card, CardElements, CardHandle};

pub struct SimCard {
    id: usize,
    container: SimElement,
    face: SimElement,
    shadow: SimElement,
    mounted: Cell<bool>,
    floating: Cell<bool>,
    shaking: Cell<bool>,
    front: RefCell<Option<String>>,
}

impl SimCard {
    pub fn new(timeline: &SimTimeline, id: usize) -> Self {
        Self {
            id,
            container: SimElement::new(timeline, &format!("card{id}")),
            face: SimElement::new(timeline, &format!("card{id}.face")),
            shadow: SimElement::new(timeline, &format!("card{id}.shadow")),
            mounted: Cell::new(true),
            floating: Cell::new(false),
            shaking: Cell::new(false),
            front: RefCell::new(None),
        }
    }

    pub fn container(&self) -> &SimElement {
        &self.container
    }

    pub fn face(&self) -> &SimElement {
        &self.face
    }

    pub fn shadow(&self) -> &SimElement {
        &self.shadow
    }

    /// Pretend the card hasn't mounted its elements yet
    pub fn set_mounted(&self, mounted: bool) {
        self.mounted.set(mounted);
    }

    pub fn is_floating(&self) -> bool {
        self.floating.get()
    }

    pub fn is_shaking(&self) -> bool {
        self.shaking.get()
    }

    pub fn front_content(&self) -> Option<String> {
        self.front.borrow().clone()
    }
}

impl CardHandle for SimCard {
    fn id(&self) -> usize {
        self.id
    }

    fn elements(&self) -> Option<CardElements> {
        self.mounted.get().then(|| CardElements {
            container: self.container.target(),
            face: self.face.target(),
            shadow: self.shadow.target(),
        })
    }

    fn start_floating(&self) {
        self.floating.set(true);
    }

    fn stop_floating(&self) {
        self.floating.set(false);
    }

    fn start_shaking(&self) {
        self.shaking.set(true);
    }

    fn stop_shaking(&self) {
        self.shaking.set(false);
    }

    fn set_front_content(&self, content: &str) {
        *self.front.borrow_mut() = Some(content.to_string());
    }
}

/// `n` cards with ids `0..n`, plus the same list as trait objects
pub fn sim_deck(timeline: &SimTimeline, n: usize) -> (Vec<Rc<SimCard>>, Vec<Card>) {
    let cards: Vec<Rc<SimCard>> = (0..n).map(|id| Rc::new(SimCard::new(timeline, id))).collect();
    let handles = cards.iter().map(|c| c.clone() as Card).collect();
    (cards, handles)
}
