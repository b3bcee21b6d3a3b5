//! Linearly staggered start delays

/// Which end of the batch starts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerFrom {
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaggerConfig {
    /// Delay of the first element to start (ms)
    pub start: f64,
    pub from: StaggerFrom,
}

/// Delay generator: `start + rank * duration`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stagger {
    pub duration: f64,
    pub start: f64,
    pub from: StaggerFrom,
}

impl Stagger {
    pub fn delay(&self, index: usize, len: usize) -> f64 {
        let rank = match self.from {
            StaggerFrom::First => index,
            StaggerFrom::Last => len.saturating_sub(index + 1),
        };
        self.start + rank as f64 * self.duration
    }
}

pub fn stagger(duration: f64, config: StaggerConfig) -> Stagger {
    Stagger {
        duration,
        start: config.start,
        from: config.from,
    }
}
