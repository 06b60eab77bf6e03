//! Geometry records reported by the host surface.

/// Minimum viewport width that receives the desktop flip treatment
/// (scroll indicators on overflowing back faces).
pub const DESKTOP_MIN_WIDTH: f32 = 769.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Whether the device reports touch input (`ontouchstart` or
    /// `maxTouchPoints > 0` in a browser).
    pub touch_capable: bool,
}

impl Viewport {
    pub const fn new(width: f32, height: f32, touch_capable: bool) -> Self {
        Self {
            width,
            height,
            touch_capable,
        }
    }

    pub fn is_desktop_width(&self) -> bool {
        self.width >= DESKTOP_MIN_WIDTH
    }
}

/// Horizontal placement of a card inside the scrolling track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardBox {
    /// Left edge in track coordinates (independent of scroll).
    pub left: f32,
    pub width: f32,
}

impl CardBox {
    pub fn center(&self) -> f32 {
        self.left + self.width / 2.0
    }

    /// Track scroll offset that puts this card in the middle of the viewport.
    pub fn centered_offset(&self, viewport_width: f32) -> f32 {
        self.center() - viewport_width / 2.0
    }

    /// Width of the card that is inside `[0, viewport_width]` at the given
    /// scroll offset.
    pub fn visible_width(&self, scroll_left: f32, viewport_width: f32) -> f32 {
        let start = self.left - scroll_left;
        let end = start + self.width;
        (end.min(viewport_width) - start.max(0.0)).max(0.0)
    }

    pub fn visible_ratio(&self, scroll_left: f32, viewport_width: f32) -> f32 {
        if self.width <= 0.0 {
            return 0.0;
        }
        self.visible_width(scroll_left, viewport_width) / self.width
    }

    /// Signed distance between the card center and the viewport center.
    pub fn center_offset(&self, scroll_left: f32, viewport_width: f32) -> f32 {
        self.center() - scroll_left - viewport_width / 2.0
    }
}

/// Content measurements of a card's faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardContent {
    /// Natural height of the back face content.
    pub back_content_height: f32,
    /// Scrollable height of the back face (`scrollHeight`).
    pub back_scroll_height: f32,
    /// Visible height of the back face (`clientHeight`).
    pub back_client_height: f32,
}

impl CardContent {
    pub fn back_overflows(&self) -> bool {
        self.back_scroll_height > self.back_client_height + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_width_clips_both_edges() {
        let card = CardBox {
            left: 900.0,
            width: 300.0,
        };
        // Fully inside.
        assert_eq!(card.visible_width(700.0, 1000.0), 300.0);
        // Clipped on the right edge.
        assert_eq!(card.visible_width(0.0, 1000.0), 100.0);
        // Clipped on the left edge.
        assert_eq!(card.visible_width(1100.0, 1000.0), 100.0);
        // Entirely off screen.
        assert_eq!(card.visible_width(2000.0, 1000.0), 0.0);
    }

    #[test]
    fn centered_offset_puts_center_mid_viewport() {
        let card = CardBox {
            left: 1000.0,
            width: 400.0,
        };
        let offset = card.centered_offset(800.0);
        assert_eq!(offset, 800.0);
        assert_eq!(card.center_offset(offset, 800.0), 0.0);
    }

    #[test]
    fn overflow_needs_more_than_rounding_slack() {
        let fits = CardContent {
            back_content_height: 380.0,
            back_scroll_height: 400.5,
            back_client_height: 400.0,
        };
        assert!(!fits.back_overflows());
        let overflows = CardContent {
            back_scroll_height: 620.0,
            ..fits
        };
        assert!(overflows.back_overflows());
    }
}
