//! Tuning for the touch driver

use crate::animator::Timing;
use crate::config::RuntimeConfig;
use crate::constants::touch as t;

#[derive(Debug, Clone, Copy)]
pub struct TouchTuning {
    pub edge_resistance: f32,
    pub threshold_fraction: f32,
    pub pretarget_progress: f32,
    pub quick_swipe_distance: f32,
    pub quick_swipe_max_ms: u64,
    pub axis_lock_px: f32,
    pub snap_duration_ms: u64,
    pub snap_timing: Timing,
    pub overlay_swipe_px: f32,
}

impl Default for TouchTuning {
    fn default() -> Self {
        Self::from_runtime_config(&RuntimeConfig::default())
    }
}

impl TouchTuning {
    pub fn from_runtime_config(rc: &RuntimeConfig) -> Self {
        Self {
            pretarget_progress: t::PRETARGET_PROGRESS,
            quick_swipe_distance: t::QUICK_SWIPE_DISTANCE,
            quick_swipe_max_ms: t::QUICK_SWIPE_MAX_MS,
            axis_lock_px: t::AXIS_LOCK_PX,
            snap_timing: Timing::bezier(t::SNAP_BEZIER),
            overlay_swipe_px: t::OVERLAY_SWIPE_PX,
            edge_resistance: rc.touch_edge_resistance(),
            threshold_fraction: rc.touch_threshold_fraction(),
            snap_duration_ms: rc.touch_snap_duration_ms(),
        }
    }

    /// Drag distance that always counts as a swipe for a card this wide.
    pub fn threshold_for(&self, card_width: f32) -> f32 {
        card_width * self.threshold_fraction
    }

    pub fn is_quick_swipe(&self, distance: f32, elapsed_ms: u64) -> bool {
        distance > self.quick_swipe_distance
            && elapsed_ms < self.quick_swipe_max_ms
    }
}
