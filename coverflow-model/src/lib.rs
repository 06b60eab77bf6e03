//! Core data model definitions shared across Coverflow crates.
#![allow(missing_docs)]

pub mod card;
pub mod error;
pub mod filter_types;
pub mod phase;
pub mod platform;
pub mod prelude;

pub use card::{COLLAPSED_CARD_HEIGHT, Card, cards_from_summaries};
pub use error::{ModelError, Result as ModelResult};
pub use filter_types::{
    FilterCriteria, SCORE_CEILING, SCORE_FLOOR, ScoreRange, join_term_list,
    parse_term_list,
};
pub use phase::{CarouselPhase, Direction, FilteringPhase};
pub use platform::{DeviceClass, Orientation, Platform};

