//! Runtime configuration for user-adjustable constants
//!
//! [`RuntimeConfig`] holds `Option<T>` overrides for the values in
//! [`crate::constants`]. Accessor methods fall back to the constants when a
//! field is `None`, so an empty config behaves exactly like the compiled
//! defaults. Overrides can be read from TOML:
//!
//! ```toml
//! grace_period_ms = 650
//! desktop_easing = "ease-in-out"
//! touch_snap_duration_ms = 300
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{desktop, flip, registry, touch};

/// Environment variable naming a TOML file with overrides.
pub const CONFIG_ENV_VAR: &str = "COVERFLOW_CONFIG";

/// Easing function type for scroll animations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingKind {
    Linear = 0,
    EaseIn = 1,
    #[default]
    EaseOut = 2,
    EaseInOut = 3,
}

impl EasingKind {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Linear,
            1 => Self::EaseIn,
            2 => Self::EaseOut,
            3 => Self::EaseInOut,
            _ => Self::EaseOut,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Map linear progress `t` in `0..=1` onto the eased curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

impl std::fmt::Display for EasingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::EaseIn => write!(f, "Ease In"),
            Self::EaseOut => write!(f, "Ease Out"),
            Self::EaseInOut => write!(f, "Ease In/Out"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime configuration with optional overrides for constants.
/// Fields are None by default, falling back to compiled constants.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    // ========== REGISTRY ==========
    /// Manual flip guard length (ms)
    pub manual_flip_guard_ms: Option<u64>,

    // ========== DESKTOP ==========
    /// Scroll duration for an adjacent card (ms)
    pub desktop_adjacent_duration_ms: Option<u64>,
    /// Extra duration per further card (ms)
    pub desktop_per_card_duration_ms: Option<u64>,
    /// Upper bound on scroll duration (ms)
    pub desktop_max_duration_ms: Option<u64>,
    /// Easing for desktop scroll animations
    pub desktop_easing: Option<EasingKind>,
    /// Grace period before auto-closing an off-center card (ms)
    pub grace_period_ms: Option<u64>,
    /// Off-center tolerance (px)
    pub center_tolerance_px: Option<f32>,
    /// Momentum window after a wheel notch (ms)
    pub wheel_momentum_ms: Option<u64>,
    /// Momentum window after a trackpad delta (ms)
    pub trackpad_momentum_ms: Option<u64>,
    /// Collapse transition before scroll restore (ms)
    pub collapse_transition_ms: Option<u64>,

    // ========== TOUCH ==========
    /// Snap transition duration (ms)
    pub touch_snap_duration_ms: Option<u64>,
    /// Edge resistance multiplier
    pub touch_edge_resistance: Option<f32>,
    /// Swipe threshold as a fraction of card width
    pub touch_threshold_fraction: Option<f32>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("Loaded coverflow config overrides from {}", path.display());
        Ok(config)
    }

    /// Load overrides from the file named by `COVERFLOW_CONFIG`, falling back
    /// to defaults when the variable is unset or the file is unusable.
    pub fn from_environment() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Falling back to default coverflow config: {err}");
                Self::default()
            }
        }
    }

    // ========== REGISTRY ACCESSORS ==========

    pub fn manual_flip_guard_ms(&self) -> u64 {
        self.manual_flip_guard_ms
            .unwrap_or(registry::MANUAL_FLIP_GUARD_MS)
    }

    // ========== DESKTOP ACCESSORS ==========

    pub fn desktop_adjacent_duration_ms(&self) -> u64 {
        self.desktop_adjacent_duration_ms
            .unwrap_or(desktop::ADJACENT_DURATION_MS)
    }

    pub fn desktop_per_card_duration_ms(&self) -> u64 {
        self.desktop_per_card_duration_ms
            .unwrap_or(desktop::PER_CARD_DURATION_MS)
    }

    pub fn desktop_max_duration_ms(&self) -> u64 {
        self.desktop_max_duration_ms
            .unwrap_or(desktop::MAX_DURATION_MS)
    }

    pub fn desktop_easing(&self) -> EasingKind {
        self.desktop_easing
            .unwrap_or_else(|| EasingKind::from_u8(desktop::EASING_KIND))
    }

    pub fn grace_period_ms(&self) -> u64 {
        self.grace_period_ms.unwrap_or(desktop::GRACE_PERIOD_MS)
    }

    pub fn center_tolerance_px(&self) -> f32 {
        self.center_tolerance_px
            .unwrap_or(desktop::CENTER_TOLERANCE_PX)
    }

    pub fn wheel_momentum_ms(&self) -> u64 {
        self.wheel_momentum_ms.unwrap_or(desktop::WHEEL_MOMENTUM_MS)
    }

    pub fn trackpad_momentum_ms(&self) -> u64 {
        self.trackpad_momentum_ms
            .unwrap_or(desktop::TRACKPAD_MOMENTUM_MS)
    }

    pub fn collapse_transition_ms(&self) -> u64 {
        self.collapse_transition_ms
            .unwrap_or(flip::COLLAPSE_TRANSITION_MS)
    }

    // ========== TOUCH ACCESSORS ==========

    pub fn touch_snap_duration_ms(&self) -> u64 {
        self.touch_snap_duration_ms
            .unwrap_or(touch::SNAP_DURATION_MS)
    }

    pub fn touch_edge_resistance(&self) -> f32 {
        self.touch_edge_resistance.unwrap_or(touch::EDGE_RESISTANCE)
    }

    pub fn touch_threshold_fraction(&self) -> f32 {
        self.touch_threshold_fraction
            .unwrap_or(touch::THRESHOLD_CARD_FRACTION)
    }
}
