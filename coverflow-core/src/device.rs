//! Viewport/device classification
//!
//! Pure query over a [`Viewport`]; nothing is retained between calls. The
//! session calls it once at startup to fix the platform for its lifetime.

use coverflow_contracts::geometry::{DESKTOP_MIN_WIDTH, Viewport};
use coverflow_model::{DeviceClass, Orientation};

/// Landscape viewports at or below this height on touch devices are phones
/// turned sideways.
pub const PHONE_LANDSCAPE_MAX_HEIGHT: f32 = 500.0;

pub fn classify(viewport: &Viewport) -> DeviceClass {
    let orientation = if viewport.width > viewport.height {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };
    let is_mobile = viewport.touch_capable || viewport.width < DESKTOP_MIN_WIDTH;
    let phone_landscape = viewport.touch_capable
        && orientation == Orientation::Landscape
        && viewport.height <= PHONE_LANDSCAPE_MAX_HEIGHT;

    DeviceClass {
        is_mobile,
        touch_capable: viewport.touch_capable,
        orientation,
        phone_landscape,
    }
}
