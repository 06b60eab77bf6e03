//! Layout measurement seam
//!
//! The engine never touches a DOM. Whenever it needs to know where a card is
//! or how tall its content is, it asks the host through [`LayoutProbe`].
//! Missing measurements are reported as `None`; callers skip the operation
//! rather than guess.

use super::geometry::{CardBox, CardContent, Viewport};

pub trait LayoutProbe {
    /// Current viewport size and input capabilities.
    fn viewport(&self) -> Viewport;

    /// Box of the card at `index`, or `None` when it is not laid out yet.
    fn card_box(&self, index: usize) -> Option<CardBox>;

    /// Content measurements of the card at `index`.
    fn card_content(&self, index: usize) -> Option<CardContent>;

    /// Largest scroll offset the track accepts.
    fn max_scroll_left(&self) -> f32;

    /// Centered scroll offset for a card, clamped into the track's range.
    fn centered_offset(&self, index: usize) -> Option<f32> {
        let card = self.card_box(index)?;
        let viewport = self.viewport();
        let max = self.max_scroll_left().max(0.0);
        Some(card.centered_offset(viewport.width).clamp(0.0, max))
    }

    /// True once the first card reports a usable width.
    fn is_measured(&self) -> bool {
        self.card_box(0).is_some_and(|b| b.width > 0.0)
    }
}

/// Strip of equally sized cards with side padding so the first and last
/// card can reach the viewport center.
#[derive(Debug, Clone)]
pub struct UniformLayout {
    pub viewport: Viewport,
    pub card_width: f32,
    pub gap: f32,
    pub count: usize,
    /// Cleared to simulate a surface that has not laid cards out yet.
    pub measured: bool,
    pub contents: Vec<Option<CardContent>>,
}

impl UniformLayout {
    pub fn new(
        viewport: Viewport,
        card_width: f32,
        gap: f32,
        count: usize,
    ) -> Self {
        Self {
            viewport,
            card_width,
            gap,
            count,
            measured: true,
            contents: vec![None; count],
        }
    }

    pub fn with_content(mut self, index: usize, content: CardContent) -> Self {
        if let Some(slot) = self.contents.get_mut(index) {
            *slot = Some(content);
        }
        self
    }

    fn padding(&self) -> f32 {
        ((self.viewport.width - self.card_width) / 2.0).max(0.0)
    }

    fn track_width(&self) -> f32 {
        let gaps = self.count.saturating_sub(1) as f32 * self.gap;
        2.0 * self.padding() + self.count as f32 * self.card_width + gaps
    }
}

impl LayoutProbe for UniformLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn card_box(&self, index: usize) -> Option<CardBox> {
        if !self.measured || index >= self.count {
            return None;
        }
        Some(CardBox {
            left: self.padding() + index as f32 * (self.card_width + self.gap),
            width: self.card_width,
        })
    }

    fn card_content(&self, index: usize) -> Option<CardContent> {
        self.contents.get(index).copied().flatten()
    }

    fn max_scroll_left(&self) -> f32 {
        (self.track_width() - self.viewport.width).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_card_can_be_centered() {
        let layout =
            UniformLayout::new(Viewport::new(1200.0, 800.0, false), 400.0, 20.0, 5);
        for i in 0..5 {
            assert_eq!(layout.centered_offset(i), Some(420.0 * i as f32));
        }
        assert_eq!(layout.max_scroll_left(), 1680.0);
        assert!(layout.is_measured());
    }

    #[test]
    fn unmeasured_layout_reports_nothing() {
        let mut layout =
            UniformLayout::new(Viewport::new(390.0, 844.0, true), 300.0, 0.0, 3);
        layout.measured = false;
        assert!(!layout.is_measured());
        assert_eq!(layout.centered_offset(1), None);
    }
}
