use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

/// Words of this many characters or fewer are never fuzzily corrected
const MIN_FUZZY_LENGTH: usize = 4;

/// Largest distance accepted against a canonical word
const MAX_CANONICAL_DISTANCE: usize = 2;

/// Largest distance accepted against a known misspelling
const MAX_MISSPELLING_DISTANCE: usize = 1;

/// Levenshtein distance with unit insert, delete and substitute costs
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Dictionary-plus-edit-distance corrector for medical vocabulary
#[derive(Debug, Clone, Default)]
pub struct SpellCorrector {
    /// misspelling -> canonical, chains already collapsed
    corrections: BTreeMap<String, String>,

    /// Distinct canonical forms
    canonical: BTreeSet<String>,

    /// Correctly spelled domain words that must not be pulled toward a neighbor
    known: HashSet<String>,
}

impl SpellCorrector {
    /// Build from merged `(misspelling, canonical)` pairs plus known-good words.
    pub fn new(
        pairs: impl IntoIterator<Item = (String, String)>,
        known_words: impl IntoIterator<Item = String>,
    ) -> Self {
        let raw: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();

        let corrections = collapse_chains(&raw);
        let canonical: BTreeSet<String> = corrections.values().cloned().collect();

        // Words of multi-word corrections ("blood work") must survive a second pass
        let phrase_words: Vec<String> = canonical
            .iter()
            .flat_map(|c| c.split_whitespace().map(str::to_string))
            .collect();

        let known = known_words
            .into_iter()
            .chain(phrase_words)
            .map(|w| w.to_lowercase())
            .filter(|w| w.chars().count() > MIN_FUZZY_LENGTH)
            .collect();

        Self {
            corrections,
            canonical,
            known,
        }
    }

    #[must_use]
    pub fn with_known_words(mut self, words: impl IntoIterator<Item = String>) -> Self {
        self.known.extend(
            words
                .into_iter()
                .map(|w| w.to_lowercase())
                .filter(|w| w.chars().count() > MIN_FUZZY_LENGTH),
        );
        self
    }

    /// Correct a single word. Unknown words come back unchanged.
    #[must_use]
    pub fn correct(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if let Some(canonical) = self.corrections.get(&lower) {
            return canonical.clone();
        }

        if lower.chars().count() <= MIN_FUZZY_LENGTH
            || self.known.contains(&lower)
            || self.canonical.contains(&lower)
        {
            return word.to_string();
        }

        match self.closest(&lower) {
            Some(best) => {
                debug!("Spelling: '{}' -> '{}'", word, best);
                best.to_string()
            }
            None => word.to_string(),
        }
    }

    /// Nearest canonical form within range; canonical words are tried first,
    /// and a misspelling key only wins with a strictly smaller distance.
    fn closest(&self, lower: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;

        for candidate in &self.canonical {
            let distance = edit_distance(lower, candidate);
            if distance <= MAX_CANONICAL_DISTANCE && best.map_or(true, |(_, d)| distance < d) {
                best = Some((candidate.as_str(), distance));
            }
        }

        for (misspelling, canonical) in &self.corrections {
            let distance = edit_distance(lower, misspelling);
            if distance <= MAX_MISSPELLING_DISTANCE && best.map_or(true, |(_, d)| distance < d) {
                best = Some((canonical.as_str(), distance));
            }
        }

        best.map(|(word, _)| word)
    }

    /// Lowercase a query and correct it word by word, joined by single spaces.
    #[must_use]
    pub fn correct_search_query(&self, query: &str) -> String {
        query
            .to_lowercase()
            .split_whitespace()
            .map(|word| self.correct(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

/// Map every misspelling straight to its final canonical form.
///
/// Self-maps and entries caught in a cycle are dropped.
fn collapse_chains(raw: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut collapsed = BTreeMap::new();

    for (key, value) in raw {
        let mut target = value;
        let mut hops = 0;
        while let Some(next) = raw.get(target) {
            hops += 1;
            if next == target || hops > raw.len() {
                break;
            }
            target = next;
        }

        if target != key && !raw.get(target).is_some_and(|t| t != target) {
            collapsed.insert(key.clone(), target.clone());
        }
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn corrector() -> SpellCorrector {
        SpellCorrector::new(
            pairs(&[
                ("cardioligy", "cardiology"),
                ("cardiolgy", "cardiology"),
                ("orthopaedic", "orthopedic"),
                ("orthopedic", "orthopedics"),
                ("neurolgy", "neurology"),
                ("hart", "heart"),
                ("same", "same"),
            ]),
            vec!["Radiology".to_string(), "care".to_string()],
        )
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        for word in ["", "a", "cardiology", "x-ray"] {
            assert_eq!(edit_distance(word, word), 0);
        }
        assert_eq!(
            edit_distance("saturday", "sunday"),
            edit_distance("sunday", "saturday")
        );
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let c = corrector();
        assert_eq!(c.correct("Cardioligy"), "cardiology");
        assert_eq!(c.correct("hart"), "heart");
    }

    #[test]
    fn test_chains_collapse() {
        let c = corrector();
        assert_eq!(c.correct("orthopaedic"), "orthopedics");
        assert_eq!(c.correct("orthopedic"), "orthopedics");
        assert_eq!(c.correct("orthopedics"), "orthopedics");
    }

    #[test]
    fn test_self_map_dropped() {
        let c = corrector();
        assert_eq!(c.len(), 6);
        assert_eq!(c.correct("same"), "same");
    }

    #[test]
    fn test_fuzzy_against_canonical() {
        let c = corrector();
        // distance 2 from "cardiology"
        assert_eq!(c.correct("kardiolgy"), "cardiology");
        assert_eq!(c.correct("neurologi"), "neurology");
    }

    #[test]
    fn test_short_and_unknown_words_unchanged() {
        let c = corrector();
        assert_eq!(c.correct("hrt"), "hrt");
        assert_eq!(c.correct("Mott"), "Mott");
        assert_eq!(c.correct("pharmacy"), "pharmacy");
    }

    #[test]
    fn test_known_words_not_pulled() {
        let c = corrector();
        assert_eq!(c.correct("radiology"), "radiology");
    }

    #[test]
    fn test_correct_search_query() {
        let c = corrector();
        assert_eq!(
            c.correct_search_query("  Cardioligy   3rd floor "),
            "cardiology 3rd floor"
        );
        assert_eq!(c.correct_search_query(""), "");
    }

    #[test]
    fn test_correction_is_idempotent() {
        let c = corrector();
        for query in [
            "cardioligy clinic",
            "orthopaedic 2nd floor mott",
            "kardiolgy",
            "radiology hart",
            "neurologi room 204",
        ] {
            let once = c.correct_search_query(query);
            assert_eq!(c.correct_search_query(&once), once, "query: {query}");
        }
    }
}
