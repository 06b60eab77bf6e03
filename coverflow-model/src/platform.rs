//! Platform and device classification types

use std::fmt;

/// Which navigation driver owns the carousel for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Desktop,
    Touch,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Desktop => write!(f, "desktop"),
            Platform::Touch => write!(f, "touch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Derived device booleans for one viewport observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceClass {
    pub is_mobile: bool,
    pub touch_capable: bool,
    pub orientation: Orientation,
    pub phone_landscape: bool,
}

impl DeviceClass {
    /// Driver that should own a session on this device.
    pub fn platform(&self) -> Platform {
        if self.touch_capable {
            Platform::Touch
        } else {
            Platform::Desktop
        }
    }
}
