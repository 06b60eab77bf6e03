//! Desktop navigation driver
//!
//! Wheel, keyboard, dot and nav-arrow input animate the track with an eased
//! tween sampled on host animation frames. Clicking a card flips it in place;
//! a flipped card that drifts off-center closes after a grace period.

pub mod config;
pub mod driver;

pub use config::DesktopTuning;
pub use driver::{DesktopDriver, DesktopTask, GraceState};
