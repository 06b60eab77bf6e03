//! Carousel phase machine
//!
//! A single enumerated phase replaces independent "is scrolling", "is
//! flipping" and "is filtering" flags. Every change goes through
//! [`CarouselPhase::can_transition_to`], so the mutual-exclusion rules live in
//! one table.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CarouselPhase {
    #[default]
    Idle,
    /// A touch drag is moving the track 1:1 with the finger.
    Dragging,
    /// An eased scroll or snap transition is in flight.
    Animating,
    /// A card shows its detail face (in place or in the touch overlay).
    Flipped,
    /// The filter engine is rewriting `filtered` flags or repositioning.
    Filtering,
}

impl CarouselPhase {
    pub const ALL: [CarouselPhase; 5] = [
        CarouselPhase::Idle,
        CarouselPhase::Dragging,
        CarouselPhase::Animating,
        CarouselPhase::Flipped,
        CarouselPhase::Filtering,
    ];

    /// Transition table.
    ///
    /// | from \ to | Idle | Dragging | Animating | Flipped | Filtering |
    /// |-----------|------|----------|-----------|---------|-----------|
    /// | Idle      | y    | y        | y         | y       | y         |
    /// | Dragging  | y    | n        | y         | n       | y         |
    /// | Animating | y    | y        | y         | y       | y         |
    /// | Flipped   | y    | y        | y         | n       | y         |
    /// | Filtering | y    | n        | y         | n       | y         |
    pub fn can_transition_to(self, to: CarouselPhase) -> bool {
        use CarouselPhase::*;
        match (self, to) {
            (_, Idle) => true,
            (Idle, _) => true,
            (Animating, _) => true,
            (Dragging, Animating) | (Dragging, Filtering) => true,
            (Dragging, _) => false,
            (Flipped, Flipped) => false,
            (Flipped, _) => true,
            (Filtering, Animating) | (Filtering, Filtering) => true,
            (Filtering, _) => false,
        }
    }

    /// Whether user navigation may start from this phase.
    pub fn accepts_navigation(self) -> bool {
        !matches!(self, CarouselPhase::Filtering)
    }
}

impl fmt::Display for CarouselPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CarouselPhase::Idle => "idle",
            CarouselPhase::Dragging => "dragging",
            CarouselPhase::Animating => "animating",
            CarouselPhase::Flipped => "flipped",
            CarouselPhase::Filtering => "filtering",
        };
        f.write_str(name)
    }
}

/// Sub-phase reported alongside `is_filtering` to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilteringPhase {
    #[default]
    Idle,
    Filtering,
    Repositioning,
}

impl fmt::Display for FilteringPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilteringPhase::Idle => "idle",
            FilteringPhase::Filtering => "filtering",
            FilteringPhase::Repositioning => "repositioning",
        };
        f.write_str(name)
    }
}

/// Travel direction along the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn from_delta(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(Direction::Next)
        } else if delta < 0.0 {
            Some(Direction::Prev)
        } else {
            None
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Prev => Direction::Next,
            Direction::Next => Direction::Prev,
        }
    }
}
