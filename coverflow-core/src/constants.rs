//! Coverflow constants
//!
//! Tuning lives here so both drivers and the registry update consistently.
//! Values that users may override at runtime are re-exposed through
//! [`crate::config::RuntimeConfig`].

/// Registry-level timings shared by both drivers.
pub mod registry {
    /// How long a user-initiated flip suppresses automatic re-centering and
    /// unflipping (ms).
    pub const MANUAL_FLIP_GUARD_MS: u64 = 500;
}

/// Desktop navigation (wheel, keyboard, click, nav arrows).
pub mod desktop {
    /// Scroll animation duration for an adjacent card (ms).
    pub const ADJACENT_DURATION_MS: u64 = 200;
    /// Extra duration per additional card of travel (ms).
    pub const PER_CARD_DURATION_MS: u64 = 100;
    /// Longest scroll animation regardless of distance (ms).
    pub const MAX_DURATION_MS: u64 = 450;
    /// Easing kind for scroll animations: 0=Linear,1=EaseIn,2=EaseOut,3=EaseInOut.
    pub const EASING_KIND: u8 = 2;
    /// Cards whose visible share is below this ratio only recenter on click.
    pub const MIN_VISIBLE_RATIO_FOR_FLIP: f32 = 0.7;
    /// Off-center distance that counts as "not centered" (px).
    pub const CENTER_TOLERANCE_PX: f32 = 20.0;
    /// Grace period before an off-center flipped card auto-closes (ms).
    pub const GRACE_PERIOD_MS: u64 = 500;
    /// Momentum window after a discrete wheel notch (ms).
    pub const WHEEL_MOMENTUM_MS: u64 = 150;
    /// Momentum window after a trackpad-sized wheel delta (ms).
    pub const TRACKPAD_MOMENTUM_MS: u64 = 200;
    /// Wheel deltas at or above this magnitude are treated as notches (px).
    pub const WHEEL_NOTCH_DELTA: f32 = 50.0;
    /// Polling interval while waiting for momentum to settle (ms).
    pub const CENTER_POLL_INTERVAL_MS: u64 = 100;
    /// Hard cap on momentum polling before centering anyway (ms).
    pub const CENTER_POLL_MAX_MS: u64 = 1000;
}

/// Touch navigation (drag, snap, overlay).
pub mod touch {
    /// Multiplier applied to drag distance beyond the first/last card.
    pub const EDGE_RESISTANCE: f32 = 0.3;
    /// Swipe threshold as a fraction of the card width.
    pub const THRESHOLD_CARD_FRACTION: f32 = 0.4;
    /// Share of the threshold at which an adjacent card is pre-targeted.
    pub const PRETARGET_PROGRESS: f32 = 0.5;
    /// Minimum travel for a quick swipe (px).
    pub const QUICK_SWIPE_DISTANCE: f32 = 30.0;
    /// Maximum duration of a quick swipe (ms).
    pub const QUICK_SWIPE_MAX_MS: u64 = 300;
    /// Movement needed before the gesture commits to an axis (px).
    pub const AXIS_LOCK_PX: f32 = 10.0;
    /// Snap transition duration (ms).
    pub const SNAP_DURATION_MS: u64 = 270;
    /// Snap transition timing function control points.
    pub const SNAP_BEZIER: (f32, f32, f32, f32) = (0.25, 0.46, 0.45, 0.94);
    /// Horizontal travel that turns an overlay touch into a swipe (px).
    pub const OVERLAY_SWIPE_PX: f32 = 50.0;
}

/// Dot indicator window.
pub mod dots {
    /// Number of dots visible at once.
    pub const VISIBLE_RANGE: usize = 9;
    /// Distance from a window edge that triggers a re-center.
    pub const EDGE_MARGIN: usize = 2;
    /// Delay between the two phases of a window shift (ms).
    pub const SHIFT_SECOND_PHASE_MS: u64 = 42;
}

/// Card flip and collapse.
pub mod flip {
    /// Collapse transition length before scroll is restored (ms).
    pub const COLLAPSE_TRANSITION_MS: u64 = 500;
}

/// Startup measurement.
pub mod init {
    /// Attempts at measuring the first card before continuing anyway.
    pub const MEASURE_MAX_ATTEMPTS: u32 = 25;
    /// Interval between measurement attempts (ms).
    pub const MEASURE_RETRY_MS: u64 = 40;
}
