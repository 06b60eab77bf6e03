//! Touch navigation driver
//!
//! The track follows the finger 1:1 and snaps to a card on release. Tapping
//! the active card opens its back face in a full-screen overlay.

pub mod config;
pub mod driver;
pub mod gesture;
pub mod overlay;

pub use config::TouchTuning;
pub use driver::{TouchDriver, TouchTask};
pub use gesture::{Axis, DragGesture};
pub use overlay::OverlayState;
