//! Full-screen detail overlay opened by tapping the active card

use coverflow_model::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub index: usize,
    touch_start: Option<(f32, f32)>,
    touch_last: Option<(f32, f32)>,
}

impl OverlayState {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            touch_start: None,
            touch_last: None,
        }
    }

    pub fn begin_touch(&mut self, x: f32, y: f32) {
        self.touch_start = Some((x, y));
        self.touch_last = Some((x, y));
    }

    pub fn move_touch(&mut self, x: f32, y: f32) {
        if self.touch_start.is_some() {
            self.touch_last = Some((x, y));
        }
    }

    /// Finish a touch inside the overlay. Horizontal travel beyond
    /// `swipe_px` yields the direction to navigate in; anything else is left
    /// to the overlay's own vertical scrolling.
    pub fn end_touch(&mut self, swipe_px: f32) -> Option<Direction> {
        let (sx, sy) = self.touch_start.take()?;
        let (lx, ly) = self.touch_last.take()?;
        let (dx, dy) = (lx - sx, ly - sy);
        if dx.abs() > swipe_px && dx.abs() > dy.abs() {
            Direction::from_delta(-dx)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_swipe_navigates() {
        let mut overlay = OverlayState::new(2);
        overlay.begin_touch(300.0, 400.0);
        overlay.move_touch(220.0, 420.0);
        assert_eq!(overlay.end_touch(50.0), Some(Direction::Next));

        overlay.begin_touch(100.0, 400.0);
        overlay.move_touch(180.0, 390.0);
        assert_eq!(overlay.end_touch(50.0), Some(Direction::Prev));
    }

    #[test]
    fn vertical_and_short_swipes_pass_through() {
        let mut overlay = OverlayState::new(0);
        overlay.begin_touch(200.0, 600.0);
        overlay.move_touch(140.0, 300.0);
        assert_eq!(overlay.end_touch(50.0), None);

        overlay.begin_touch(200.0, 600.0);
        overlay.move_touch(170.0, 600.0);
        assert_eq!(overlay.end_touch(50.0), None);
        assert_eq!(overlay.end_touch(50.0), None, "no touch in progress");
    }
}
