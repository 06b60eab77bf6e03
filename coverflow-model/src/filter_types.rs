//! Filter criteria shared by the filter engine and stored preferences

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest score the optimism slider can express.
pub const SCORE_FLOOR: f32 = 0.0;
/// Highest score the optimism slider can express.
pub const SCORE_CEILING: f32 = 100.0;

/// Inclusive optimism score window.
///
/// The full `0..=100` window is treated as "no score filter".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl ScoreRange {
    pub const FULL: ScoreRange = ScoreRange {
        min: SCORE_FLOOR,
        max: SCORE_CEILING,
    };

    /// Build a range, swapping the bounds when given in reverse and clamping
    /// both into `0..=100`.
    pub fn new(min: f32, max: f32) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min: lo.clamp(SCORE_FLOOR, SCORE_CEILING),
            max: hi.clamp(SCORE_FLOOR, SCORE_CEILING),
        }
    }

    /// True when the range narrows the full window.
    pub fn is_active(&self) -> bool {
        self.min > SCORE_FLOOR || self.max < SCORE_CEILING
    }

    pub fn contains(&self, score: f32) -> bool {
        score >= self.min && score <= self.max
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Include/exclude word lists plus an optional score window.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterCriteria {
    pub excludes: Vec<String>,
    pub includes: Vec<String>,
    pub score: Option<ScoreRange>,
}

impl FilterCriteria {
    /// Build criteria from the comma-separated strings used by the filter
    /// forms and the key-value store.
    pub fn from_lists(excludes: &str, includes: &str) -> Self {
        Self {
            excludes: parse_term_list(excludes),
            includes: parse_term_list(includes),
            score: None,
        }
    }

    pub fn with_score(mut self, range: ScoreRange) -> Self {
        self.score = Some(range);
        self
    }

    /// Score window that actually narrows the result set, if any.
    pub fn active_score(&self) -> Option<ScoreRange> {
        self.score.filter(ScoreRange::is_active)
    }

    pub fn is_empty(&self) -> bool {
        self.excludes.is_empty()
            && self.includes.is_empty()
            && self.active_score().is_none()
    }

    /// Remove terms that appear in both lists and return them.
    ///
    /// A term that is both wanted and unwanted says nothing, so it is dropped
    /// from both sides before matching.
    pub fn cancel_common_terms(&mut self) -> Vec<String> {
        let common: Vec<String> = self
            .excludes
            .iter()
            .filter(|term| self.includes.contains(term))
            .cloned()
            .collect();
        if !common.is_empty() {
            self.excludes.retain(|t| !common.contains(t));
            self.includes.retain(|t| !common.contains(t));
        }
        common
    }
}

/// Split a comma-separated list into normalised terms.
///
/// Terms are trimmed and lowercased; empty entries and duplicates are dropped
/// while keeping first-seen order.
pub fn parse_term_list(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let term = part.trim().to_lowercase();
        if term.is_empty() || terms.contains(&term) {
            continue;
        }
        terms.push(term);
    }
    terms
}

/// Inverse of [`parse_term_list`].
pub fn join_term_list(terms: &[String]) -> String {
    terms.join(",")
}
