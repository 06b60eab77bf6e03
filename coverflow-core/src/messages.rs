use coverflow_model::Direction;

/// Host input routed to the active driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoverflowMessage {
    /// Left/right arrow key.
    Key(Direction),
    /// Previous/next nav arrow button.
    ArrowClicked(Direction),
    DotClicked(usize),
    CardClicked(usize),
    Wheel { delta: f32 },
    /// Native scroll position reported by the surface.
    Scrolled { scroll_left: f32 },
    Resized,
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    CardTapped(usize),
    CloseOverlay,
}

impl CoverflowMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Key(_) => "Key",
            Self::ArrowClicked(_) => "ArrowClicked",
            Self::DotClicked(_) => "DotClicked",
            Self::CardClicked(_) => "CardClicked",
            Self::Wheel { .. } => "Wheel",
            Self::Scrolled { .. } => "Scrolled",
            Self::Resized => "Resized",
            Self::TouchStart { .. } => "TouchStart",
            Self::TouchMove { .. } => "TouchMove",
            Self::TouchEnd => "TouchEnd",
            Self::CardTapped(_) => "CardTapped",
            Self::CloseOverlay => "CloseOverlay",
        }
    }
}
