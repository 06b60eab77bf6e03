//! # Coverflow Core
//!
//! Headless engine for a news-card carousel: a registry of cards, desktop
//! and touch navigation drivers, a text and score filter, a sliding dot
//! indicator and a readiness barrier that reveals the UI once the layout is
//! final.
//!
//! ## Overview
//!
//! The engine never touches a surface. The host:
//!
//! - feeds [`CoverflowMessage`]s stamped with a millisecond timestamp;
//! - answers layout queries through
//!   [`LayoutProbe`](coverflow_contracts::layout::LayoutProbe);
//! - drives time with [`Coverflow::advance`] and
//!   [`Coverflow::animation_frame`];
//! - applies the [`Effect`]s drained after each call, in order.
//!
//! ## Architecture
//!
//! - [`registry`]: shared carousel state and its invariants
//! - [`desktop`] / [`touch`]: platform drivers, one per session
//! - [`filter`]: include/exclude words and optimism score window
//! - [`dots`]: dot indicator window
//! - [`session`]: message routing, timers and layout finalization
//! - [`config`] / [`constants`]: tuning and runtime overrides
//! - [`prefs`]: stored filter settings and splash order
//!
//! ## Examples
//!
//! ```
//! use coverflow_contracts::geometry::Viewport;
//! use coverflow_contracts::layout::UniformLayout;
//! use coverflow_core::prelude::*;
//! use coverflow_model::cards_from_summaries;
//!
//! let cards = cards_from_summaries([
//!     ("Markets rally on tariff pause", Some(72.0)),
//!     ("Storm season starts early", Some(35.0)),
//! ]);
//! let probe = UniformLayout::new(Viewport::new(1280.0, 800.0, false), 400.0, 24.0, 2);
//! let mut carousel = Coverflow::new(cards, probe, &RuntimeConfig::default());
//! carousel.initialize(0);
//! assert!(carousel.system().is_fully_initialized());
//!
//! carousel.update(CoverflowMessage::Key(Direction::Next), 10);
//! assert_eq!(carousel.system().active_card_index(), 1);
//! ```

#![allow(missing_docs)]

pub mod animator;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod device;
pub mod dots;
pub mod effects;
pub mod error;
pub mod filter;
pub mod messages;
pub mod prefs;
pub mod registry;
pub mod session;
pub mod timers;
pub mod touch;

pub use config::RuntimeConfig;
pub use effects::{Effect, SystemEvent};
pub use error::{CoverflowError, Result};
pub use messages::CoverflowMessage;
pub use registry::{CardSystem, Readiness};
pub use session::{Coverflow, Driver, FilterHook, StoredFilterHook};

pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::effects::{Effect, RenderSnapshot, SystemEvent};
    pub use crate::filter::FilterOutcome;
    pub use crate::messages::CoverflowMessage;
    pub use crate::prefs::{FilterPreferences, MemoryStore};
    pub use crate::registry::{CardSystem, Readiness};
    pub use crate::session::{Coverflow, FilterHook, StoredFilterHook};
    pub use coverflow_model::{
        CarouselPhase, Direction, FilterCriteria, FilteringPhase, Platform,
        ScoreRange,
    };
}
