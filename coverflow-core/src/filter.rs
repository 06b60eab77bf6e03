//! Filter engine
//!
//! Hides cards by word lists and an optimism score window. Precedence per
//! card: an exclude match hides; otherwise a non-empty include list with no
//! match hides; otherwise an active score window hides cards whose score is
//! missing or outside it. Matching is case-insensitive on whole words.

use coverflow_model::{FilterCriteria, FilteringPhase};
use regex::Regex;

use crate::registry::CardSystem;

/// Case-insensitive whole-word alternation over a term list.
///
/// `\b` is avoided so that terms starting or ending in punctuation still
/// anchor on the surrounding non-word characters.
fn compile_terms(terms: &[String]) -> Option<Regex> {
    if terms.is_empty() {
        return None;
    }
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)(?:^|[^\w])(?:{alternation})(?:[^\w]|$)");
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("Failed to compile filter terms {terms:?}: {err}");
            None
        }
    }
}

/// Criteria compiled once per `apply_filters` call.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    criteria: FilterCriteria,
    excludes: Option<Regex>,
    includes: Option<Regex>,
    cancelled_terms: Vec<String>,
}

impl CompiledFilter {
    pub fn new(criteria: &FilterCriteria) -> Self {
        let mut criteria = criteria.clone();
        let cancelled_terms = criteria.cancel_common_terms();
        if !cancelled_terms.is_empty() {
            log::info!(
                "Terms in both include and exclude lists cancel out: {}",
                cancelled_terms.join(", ")
            );
        }
        Self {
            excludes: compile_terms(&criteria.excludes),
            includes: compile_terms(&criteria.includes),
            criteria,
            cancelled_terms,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn cancelled_terms(&self) -> &[String] {
        &self.cancelled_terms
    }

    /// Whether a card with this summary and score should be hidden.
    pub fn hides(&self, summary: &str, score: Option<f32>) -> bool {
        if self.excludes.as_ref().is_some_and(|re| re.is_match(summary)) {
            return true;
        }
        if let Some(re) = &self.includes
            && !re.is_match(summary)
        {
            return true;
        }
        match self.criteria.active_score() {
            Some(range) => !score.is_some_and(|s| range.contains(s)),
            None => false,
        }
    }
}

/// What one filter pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub hidden: usize,
    pub visible: usize,
    pub first_visible: Option<usize>,
    pub cancelled_terms: Vec<String>,
}

/// Rewrite every card's `filtered` flag from `criteria`.
///
/// Leaves the registry in `FilteringPhase::Repositioning`; the caller moves
/// the carousel to `first_visible` (when there is one) and then clears the
/// filtering state.
pub fn apply_filters(
    system: &mut CardSystem,
    criteria: &FilterCriteria,
) -> FilterOutcome {
    system.set_filtering_state(true, FilteringPhase::Filtering);
    let compiled = CompiledFilter::new(criteria);

    let decisions: Vec<(usize, bool)> = system
        .cards()
        .iter()
        .map(|card| (card.index, compiled.hides(&card.summary, card.score)))
        .collect();

    let mut hidden = 0;
    for (index, hide) in decisions {
        if hide {
            hidden += 1;
        }
        // Index comes from the registry itself.
        if let Err(err) = system.set_card_filtered(index, hide) {
            log::warn!("Skipping card {index}: {err}");
        }
    }

    let first_visible = system.first_visible_index();
    let visible = system.visible_count();
    log::info!(
        "Filters applied: {hidden} hidden, {visible} visible{}",
        if first_visible.is_none() {
            " (no card matches)"
        } else {
            ""
        }
    );
    system.set_filtering_state(true, FilteringPhase::Repositioning);

    FilterOutcome {
        hidden,
        visible,
        first_visible,
        cancelled_terms: compiled.cancelled_terms,
    }
}
