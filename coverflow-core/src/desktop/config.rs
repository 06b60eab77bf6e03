//! Tuning for the desktop driver

use crate::config::{EasingKind, RuntimeConfig};
use crate::constants::desktop as desk;

#[derive(Debug, Clone, Copy)]
pub struct DesktopTuning {
    pub adjacent_duration_ms: u64,
    pub per_card_duration_ms: u64,
    pub max_duration_ms: u64,
    pub easing: EasingKind,
    pub min_visible_ratio: f32,
    pub center_tolerance_px: f32,
    pub grace_period_ms: u64,
    pub wheel_momentum_ms: u64,
    pub trackpad_momentum_ms: u64,
    pub wheel_notch_delta: f32,
    pub center_poll_interval_ms: u64,
    pub center_poll_max_ms: u64,
    pub collapse_transition_ms: u64,
}

impl Default for DesktopTuning {
    fn default() -> Self {
        Self::from_runtime_config(&RuntimeConfig::default())
    }
}

impl DesktopTuning {
    pub fn from_runtime_config(rc: &RuntimeConfig) -> Self {
        Self {
            // Static
            min_visible_ratio: desk::MIN_VISIBLE_RATIO_FOR_FLIP,
            wheel_notch_delta: desk::WHEEL_NOTCH_DELTA,
            center_poll_interval_ms: desk::CENTER_POLL_INTERVAL_MS,
            center_poll_max_ms: desk::CENTER_POLL_MAX_MS,
            // Overridable
            adjacent_duration_ms: rc.desktop_adjacent_duration_ms(),
            per_card_duration_ms: rc.desktop_per_card_duration_ms(),
            max_duration_ms: rc.desktop_max_duration_ms(),
            easing: rc.desktop_easing(),
            center_tolerance_px: rc.center_tolerance_px(),
            grace_period_ms: rc.grace_period_ms(),
            wheel_momentum_ms: rc.wheel_momentum_ms(),
            trackpad_momentum_ms: rc.trackpad_momentum_ms(),
            collapse_transition_ms: rc.collapse_transition_ms(),
        }
    }

    /// Scroll animation length for travelling `steps` cards.
    pub fn duration_for(&self, steps: usize) -> u64 {
        let extra = steps.saturating_sub(1) as u64;
        (self.adjacent_duration_ms + extra * self.per_card_duration_ms)
            .min(self.max_duration_ms)
    }

    /// Momentum window following a wheel event with this delta.
    pub fn momentum_for(&self, delta: f32) -> u64 {
        if delta.abs() >= self.wheel_notch_delta {
            self.wheel_momentum_ms
        } else {
            self.trackpad_momentum_ms
        }
    }
}
