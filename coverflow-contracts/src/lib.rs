//! Trait surfaces that describe how the Coverflow engine talks to its host.
#![allow(missing_docs)]

pub mod geometry;
pub mod layout;
pub mod store;

/// Frequently used contracts for driver and host crates.
pub mod prelude {
    pub use super::geometry::{CardBox, CardContent, Viewport};
    pub use super::layout::{LayoutProbe, UniformLayout};
    pub use super::store::KeyValueStore;
}
