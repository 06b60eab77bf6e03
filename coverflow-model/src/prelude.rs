//! Snapshot of the types surface for driver and host code.

pub use super::card::{COLLAPSED_CARD_HEIGHT, Card};
pub use super::filter_types::{FilterCriteria, ScoreRange};
pub use super::phase::{CarouselPhase, Direction, FilteringPhase};
pub use super::platform::{DeviceClass, Orientation, Platform};
