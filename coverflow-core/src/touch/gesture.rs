//! Single-finger drag tracking

use coverflow_model::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
pub struct DragGesture {
    pub start_x: f32,
    pub start_y: f32,
    /// Track offset when the finger went down.
    pub start_scroll: f32,
    pub started_at_ms: u64,
    pub last_x: f32,
    pub last_y: f32,
    pub axis: Option<Axis>,
    /// Adjacent card currently highlighted as the release target.
    pub pretarget: Option<usize>,
}

impl DragGesture {
    pub fn new(x: f32, y: f32, start_scroll: f32, now_ms: u64) -> Self {
        Self {
            start_x: x,
            start_y: y,
            start_scroll,
            started_at_ms: now_ms,
            last_x: x,
            last_y: y,
            axis: None,
            pretarget: None,
        }
    }

    pub fn dx(&self) -> f32 {
        self.last_x - self.start_x
    }

    pub fn dy(&self) -> f32 {
        self.last_y - self.start_y
    }

    pub fn track(&mut self, x: f32, y: f32) {
        self.last_x = x;
        self.last_y = y;
    }

    /// Commit to an axis once movement passes `lock_px`; later calls return
    /// the committed axis.
    pub fn lock_axis(&mut self, lock_px: f32) -> Option<Axis> {
        if self.axis.is_none() {
            let (ax, ay) = (self.dx().abs(), self.dy().abs());
            if ax > lock_px || ay > lock_px {
                self.axis = Some(if ay > ax {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                });
            }
        }
        self.axis
    }

    /// Travel direction along the carousel: dragging left moves forward.
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_delta(-self.dx())
    }
}

/// Damp an offset past `[min, max]` by `resistance`.
pub fn apply_edge_resistance(
    raw: f32,
    min: f32,
    max: f32,
    resistance: f32,
) -> f32 {
    if raw < min {
        min + (raw - min) * resistance
    } else if raw > max {
        max + (raw - max) * resistance
    } else {
        raw
    }
}
