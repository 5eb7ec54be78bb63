//! Fuzzy refiltering of cached suggestions
//!
//! When the user keeps typing after a fresh query, the previous result set is
//! refiltered locally instead of re-querying the tool. The matching itself is
//! liblevenshtein's transducer over the cached suggestions' fuzzy keys;
//! case-insensitive prefix matches rank ahead of edit-distance matches.

use std::collections::HashMap;

use liblevenshtein::prelude::{Algorithm, DynamicDawg, Transducer};

use super::suggestion::Suggestion;

/// Maximum edit distance for a cached key to survive a refilter.
const MAX_DISTANCE: usize = 2;

/// Refilter a cached suggestion list against a new prefix. Matched items get
/// the prefix as their new replacement prefix; order is closest-first.
pub fn refilter(cached: &[Suggestion], prefix: &str) -> Vec<Suggestion> {
    let mut dict: DynamicDawg<()> = DynamicDawg::new();
    for suggestion in cached {
        dict.insert(&suggestion.fuzzy_key);
    }
    let transducer = Transducer::new(dict, Algorithm::Standard);

    let mut distances: HashMap<String, usize> = HashMap::new();
    for candidate in transducer.query_with_distance(prefix, MAX_DISTANCE) {
        distances
            .entry(candidate.term)
            .and_modify(|d| *d = (*d).min(candidate.distance))
            .or_insert(candidate.distance);
    }

    let lowered = prefix.to_lowercase();
    let mut matched: Vec<(usize, Suggestion)> = cached
        .iter()
        .filter_map(|suggestion| {
            let rank = if suggestion.fuzzy_key.to_lowercase().starts_with(&lowered) {
                Some(0)
            } else {
                distances.get(&suggestion.fuzzy_key).copied()
            }?;
            let mut refiltered = suggestion.clone();
            refiltered.replacement_prefix = prefix.to_string();
            Some((rank, refiltered))
        })
        .collect();

    matched.sort_by_key(|(rank, _)| *rank);
    matched.into_iter().map(|(_, suggestion)| suggestion).collect()
}
