//! Card entity

/// Height every card collapses back to when its detail face is hidden.
pub const COLLAPSED_CARD_HEIGHT: f32 = 400.0;

/// One content item in the carousel.
///
/// Identity is positional: `index` is the position in the original,
/// unfiltered ordering and is never reassigned. Filtered cards stay in the
/// list; navigation skips them.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub index: usize,
    pub summary: String,
    /// Optimism score in `0..=100`, when the item carries one.
    pub score: Option<f32>,
    pub filtered: bool,
    pub flipped: bool,
    /// Last height assigned by the registry.
    pub height: f32,
}

impl Card {
    pub fn new(index: usize, summary: impl Into<String>) -> Self {
        Self {
            index,
            summary: summary.into(),
            score: None,
            filtered: false,
            flipped: false,
            height: COLLAPSED_CARD_HEIGHT,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Cards that navigation may land on.
    #[inline]
    pub fn is_navigable(&self) -> bool {
        !self.filtered
    }
}

/// Build a card list from `(summary, score)` pairs, assigning indices in
/// order.
pub fn cards_from_summaries<I, S>(items: I) -> Vec<Card>
where
    I: IntoIterator<Item = (S, Option<f32>)>,
    S: Into<String>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, (summary, score))| Card {
            score,
            ..Card::new(index, summary)
        })
        .collect()
}
