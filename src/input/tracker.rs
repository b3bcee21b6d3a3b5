//! Pointer state shared between event handlers and the frame loop
//!
//! Handlers only record what happened. Press/release edges are queued as
//! signals so the frame loop is the one place that reacts to them.

use glam::DVec2;

use super::kinetic::VelocitySampler;
use crate::config::CarouselConfig;
use crate::consts::CLICK_PIXEL_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub pos: DVec2,
    pub pressed: bool,
}

impl Cursor {
    pub fn new(x: f64, y: f64, pressed: bool) -> Self {
        Self {
            pos: DVec2::new(x, y),
            pressed,
        }
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }

    /// Both axes strictly within `threshold` pixels of `other`
    pub fn within(&self, other: &Cursor, threshold: f64) -> bool {
        let d = (self.pos - other.pos).abs();
        d.x < threshold && d.y < threshold
    }
}

/// Where the press started and whether it still counts as a click
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Click {
    pub down_cursor: Option<Cursor>,
    pub clicked: bool,
    /// Card under the pointer at press time
    pub clicked_card: Option<usize>,
}

/// Already normalized: touch uses its first contact point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { x: f64, y: f64, card: Option<usize> },
    Move { x: f64, y: f64 },
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerSignal {
    Pressed { at: f64 },
    /// `velocity` is set when kinetic sampling was active (px/s)
    Released { at: f64, x: f64, velocity: Option<f64> },
}

/// Leading-edge rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Throttle {
    interval: Option<f64>,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(interval: Option<f64>) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn allow(&mut self, now: f64) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        match self.last {
            Some(last) if now - last < interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteractionTracker {
    cursor: Cursor,
    /// Drag baseline; cleared on release
    last_cursor: Option<Cursor>,
    click: Click,
    kinetic: bool,
    sampler: Option<VelocitySampler>,
    throttle: Throttle,
    signals: Vec<TrackerSignal>,
}

impl InteractionTracker {
    pub fn new(kinetic: bool, move_interval: Option<f64>) -> Self {
        Self {
            cursor: Cursor::default(),
            last_cursor: None,
            click: Click::default(),
            kinetic,
            sampler: None,
            throttle: Throttle::new(move_interval),
            signals: Vec::new(),
        }
    }

    pub fn from_config(config: &CarouselConfig) -> Self {
        Self::new(config.kinetic_rotate, config.frame_interval())
    }

    pub fn handle(&mut self, event: PointerEvent, now: f64) {
        match event {
            PointerEvent::Press { x, y, card } => {
                self.cursor = Cursor::new(x, y, true);
                self.click = Click {
                    down_cursor: Some(self.cursor),
                    clicked: false,
                    clicked_card: card,
                };
                if self.kinetic {
                    self.sampler = Some(VelocitySampler::start(now, x));
                }
                self.signals.push(TrackerSignal::Pressed { at: now });
            }
            PointerEvent::Move { x, y } => {
                if self.throttle.allow(now) {
                    self.cursor.pos = DVec2::new(x, y);
                }
            }
            PointerEvent::Release => {
                if self.cursor.pressed {
                    // A tap shorter than a frame still counts
                    self.classify_click(CLICK_PIXEL_THRESHOLD);
                }
                self.click.down_cursor = None;
                self.cursor.pressed = false;
                self.last_cursor = None;
                let velocity = self.sampler.take().map(|s| s.velocity());
                self.signals.push(TrackerSignal::Released {
                    at: now,
                    x: self.cursor.x(),
                    velocity,
                });
            }
        }
    }

    /// Fixed-rate velocity sampling tick; no-op unless pressed with kinetic on
    pub fn sample(&mut self, now: f64) {
        let x = self.cursor.x();
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.sample(now, x);
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_some()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn click(&self) -> &Click {
        &self.click
    }

    /// Re-evaluate whether the current press is still a click
    pub fn classify_click(&mut self, threshold: f64) -> bool {
        let clicked = self
            .click
            .down_cursor
            .is_some_and(|down| self.cursor.within(&down, threshold));
        self.click.clicked = clicked;
        clicked
    }

    /// Consume a pending click, if the last press ended as one
    pub fn take_click(&mut self) -> Option<Option<usize>> {
        if !self.click.clicked {
            return None;
        }
        self.click.clicked = false;
        Some(self.click.clicked_card)
    }

    /// Horizontal movement since the last call (0 at drag start)
    pub fn take_drag_delta(&mut self) -> f64 {
        let delta = self
            .last_cursor
            .map(|last| self.cursor.x() - last.x())
            .unwrap_or(0.0);
        self.last_cursor = Some(self.cursor);
        delta
    }

    pub fn drain_signals(&mut self) -> Vec<TrackerSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Forget everything, e.g. on unmount
    pub fn reset(&mut self) {
        *self = Self::new(self.kinetic, self.throttle.interval);
    }
}
