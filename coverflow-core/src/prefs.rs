//! Stored preferences
//!
//! Filter settings and the splash order persist opportunistically in a
//! [`KeyValueStore`]. Malformed values are logged and treated as absent;
//! nothing here fails the caller.

use std::collections::HashMap;

use coverflow_contracts::store::KeyValueStore;
use coverflow_model::{FilterCriteria, ScoreRange, join_term_list, parse_term_list};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{CoverflowError, Result};

pub mod keys {
    pub const EXCLUDES: &str = "Excludes";
    pub const INCLUDES: &str = "Includes";
    pub const OPTIMISM_SCORE: &str = "OptimismScore";
    pub const AUTO_APPLY_FILTERS: &str = "autoApplyFilters";
    pub const SPLASH_ORDER: &str = "splashAnimationOrder";
    pub const SPLASH_INDEX: &str = "splashAnimationIndex";
}

/// In-process store, used by tests and hosts without persistent storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Decode the stored `{min, max}` score window.
pub fn decode_score(raw: &str) -> Result<ScoreRange> {
    let range: ScoreRange = serde_json::from_str(raw).map_err(|source| {
        CoverflowError::Preference {
            key: keys::OPTIMISM_SCORE,
            source,
        }
    })?;
    Ok(ScoreRange::new(range.min, range.max))
}

/// Filter settings as the filter forms persist them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPreferences {
    pub criteria: FilterCriteria,
    pub auto_apply: bool,
}

impl FilterPreferences {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let excludes = store.get(keys::EXCLUDES).unwrap_or_default();
        let includes = store.get(keys::INCLUDES).unwrap_or_default();
        let mut criteria = FilterCriteria {
            excludes: parse_term_list(&excludes),
            includes: parse_term_list(&includes),
            score: None,
        };
        if let Some(raw) = store.get(keys::OPTIMISM_SCORE) {
            match decode_score(&raw) {
                Ok(range) => criteria.score = Some(range),
                Err(err) => log::warn!("{err}"),
            }
        }
        let auto_apply =
            store.get_flag(keys::AUTO_APPLY_FILTERS).unwrap_or(false);
        Self {
            criteria,
            auto_apply,
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        store.set(keys::EXCLUDES, &join_term_list(&self.criteria.excludes));
        store.set(keys::INCLUDES, &join_term_list(&self.criteria.includes));
        match self.criteria.score {
            Some(range) => match serde_json::to_string(&range) {
                Ok(json) => store.set(keys::OPTIMISM_SCORE, &json),
                Err(err) => log::warn!("Could not encode score window: {err}"),
            },
            None => store.remove(keys::OPTIMISM_SCORE),
        }
        store.set_flag(keys::AUTO_APPLY_FILTERS, self.auto_apply);
    }
}

fn load_splash_order<S: KeyValueStore + ?Sized>(
    store: &S,
    count: usize,
) -> Option<Vec<usize>> {
    let raw = store.get(keys::SPLASH_ORDER)?;
    let order: Vec<usize> = match serde_json::from_str(&raw) {
        Ok(order) => order,
        Err(err) => {
            log::warn!("Ignoring malformed {}: {err}", keys::SPLASH_ORDER);
            return None;
        }
    };
    let mut seen = vec![false; count];
    for &v in &order {
        if v >= count || seen[v] {
            log::debug!("Stored splash order no longer fits {count} variants");
            return None;
        }
        seen[v] = true;
    }
    (order.len() == count).then_some(order)
}

/// Pick the next splash animation variant out of `count`.
///
/// Walks a stored random permutation; when it is exhausted a new one is
/// shuffled, never starting with the variant that ended the previous cycle.
pub fn next_splash_variant<S, R>(store: &mut S, count: usize, rng: &mut R) -> usize
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    if count <= 1 {
        return 0;
    }
    let stored = load_splash_order(store, count);
    let index = store
        .get(keys::SPLASH_INDEX)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let (order, index) = match stored {
        Some(order) if index < order.len() => (order, index),
        previous => {
            let mut order: Vec<usize> = (0..count).collect();
            order.shuffle(rng);
            if let Some(last) = previous.and_then(|p| p.last().copied())
                && order[0] == last
            {
                let swap_with = rng.random_range(1..count);
                order.swap(0, swap_with);
            }
            match serde_json::to_string(&order) {
                Ok(json) => store.set(keys::SPLASH_ORDER, &json),
                Err(err) => log::warn!("Could not store splash order: {err}"),
            }
            (order, 0)
        }
    };

    store.set(keys::SPLASH_INDEX, &(index + 1).to_string());
    order[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn filter_preferences_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let prefs = FilterPreferences {
            criteria: FilterCriteria::from_lists("tariffs, war", "")
                .with_score(ScoreRange::new(20.0, 90.0)),
            auto_apply: true,
        };
        prefs.save(&mut store);
        assert_eq!(store.get(keys::EXCLUDES).as_deref(), Some("tariffs,war"));
        assert_eq!(store.get(keys::AUTO_APPLY_FILTERS).as_deref(), Some("true"));
        assert_eq!(FilterPreferences::load(&store), prefs);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let store = MemoryStore::with_entries([
            (keys::EXCLUDES, "Tariffs"),
            (keys::OPTIMISM_SCORE, "{not json"),
            (keys::AUTO_APPLY_FILTERS, "yes"),
        ]);
        let prefs = FilterPreferences::load(&store);
        assert_eq!(prefs.criteria.excludes, vec!["tariffs"]);
        assert_eq!(prefs.criteria.score, None);
        assert!(!prefs.auto_apply);
    }

    #[test]
    fn score_decodes_integers_and_reorders_bounds() {
        let range = decode_score(r#"{"min":90,"max":10}"#).unwrap();
        assert_eq!((range.min, range.max), (10.0, 90.0));
        assert!(matches!(
            decode_score("[]"),
            Err(CoverflowError::Preference { key: "OptimismScore", .. })
        ));
    }

    #[test]
    fn splash_cycle_never_repeats() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut previous_last = None;
        for _ in 0..20 {
            let mut cycle: Vec<usize> = (0..4)
                .map(|_| next_splash_variant(&mut store, 4, &mut rng))
                .collect();
            if let Some(last) = previous_last {
                assert_ne!(cycle[0], last, "new cycle repeats previous variant");
            }
            previous_last = cycle.last().copied();
            cycle.sort_unstable();
            assert_eq!(cycle, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn stale_order_is_replaced() {
        let mut store = MemoryStore::with_entries([
            (keys::SPLASH_ORDER, "[0,1,7]"),
            (keys::SPLASH_INDEX, "1"),
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        let variant = next_splash_variant(&mut store, 3, &mut rng);
        assert!(variant < 3);
        assert_eq!(store.get(keys::SPLASH_INDEX).as_deref(), Some("1"));
        assert_eq!(next_splash_variant(&mut store, 1, &mut rng), 0);
    }
}
