use serde::Serialize;

use crate::core::room::{normalize_floor, Room};
use crate::directory::store::DirectoryStore;
use crate::matching::query::{ParsedTerm, QueryProcessor};
use crate::matching::scoring::{exact_room_number_match, score_term, RoomView};
use crate::matching::suggest::DEFAULT_SUGGESTION_LIMIT;
use crate::matching::tags::UnifiedTags;
use crate::vocab::Vocabulary;

/// Convert a count to f64 for ratio math
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let result = count as f64;
    result
}

/// Default fraction of terms a multi-term query must match
pub const DEFAULT_MIN_MATCH_RATIO: f64 = 0.7;

/// Configuration for the search engine
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Fraction of terms (rounded up) that must match for multi-term queries
    pub min_match_ratio: f64,
    /// Cap on the autocomplete vocabulary
    pub suggestion_limit: usize,
    /// Run the query through the spell corrector before parsing
    pub correct_spelling: bool,
    /// Attach abbreviation expansions to query terms
    pub expand_abbreviations: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_match_ratio: DEFAULT_MIN_MATCH_RATIO,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            correct_spelling: true,
            expand_abbreviations: true,
        }
    }
}

/// Filters applied after ranking
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Either building name, case-insensitive
    pub building: Option<String>,
    pub floor: Option<String>,
    /// Every tag must overlap some unified tag of the room
    pub tags: Vec<String>,
}

impl SearchFilters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.building.is_none() && self.floor.is_none() && self.tags.is_empty()
    }

    fn accepts(&self, room: &Room, tags: &UnifiedTags) -> bool {
        if let Some(building) = &self.building {
            let building = building.trim();
            if !room
                .building_names()
                .any(|b| b.eq_ignore_ascii_case(building))
            {
                return false;
            }
        }

        if let Some(floor) = &self.floor {
            if normalize_floor(floor) != room.floor {
                return false;
            }
        }

        self.tags.iter().all(|filter| {
            let filter = filter.trim().to_lowercase();
            tags.iter()
                .any(|tag| tag.contains(filter.as_str()) || filter.contains(tag))
        })
    }
}

/// A room that passed the search, with its score
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    pub room: &'a Room,
    pub score: f64,
    pub matched_terms: usize,
    pub total_terms: usize,
}

/// Ranks the rooms of a store against free-text queries
pub struct SearchEngine<'a> {
    store: &'a DirectoryStore,
    vocab: &'a Vocabulary,
    config: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    #[must_use]
    pub fn new(store: &'a DirectoryStore, vocab: &'a Vocabulary) -> Self {
        Self::with_config(store, vocab, SearchConfig::default())
    }

    #[must_use]
    pub fn with_config(
        store: &'a DirectoryStore,
        vocab: &'a Vocabulary,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            vocab,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Spell-correct (if enabled) and parse a query into terms
    #[must_use]
    pub fn parse(&self, query: &str) -> Vec<ParsedTerm> {
        let query = if self.config.correct_spelling {
            let corrected = self.vocab.spelling.correct_search_query(query);
            if corrected != query.trim().to_lowercase() {
                tracing::debug!("Corrected query '{}' to '{}'", query, corrected);
            }
            corrected
        } else {
            query.to_string()
        };

        let processor = if self.config.expand_abbreviations {
            QueryProcessor::with_abbreviations(&self.vocab.abbreviations)
        } else {
            QueryProcessor::new()
        };
        processor.parse(&query)
    }

    /// Rooms matching `query`, best first.
    ///
    /// A query with no terms returns every room in store order with score 0.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit<'a>> {
        self.search_filtered(query, &SearchFilters::default())
    }

    #[must_use]
    pub fn search_filtered(&self, query: &str, filters: &SearchFilters) -> Vec<SearchHit<'a>> {
        let terms = self.parse(query);
        self.search_terms(&terms, filters)
    }

    /// Rank already-parsed terms, then apply `filters`
    #[must_use]
    pub fn search_terms(&self, terms: &[ParsedTerm], filters: &SearchFilters) -> Vec<SearchHit<'a>> {
        let store = self.store;
        let required = self.required_matches(terms.len());
        let mut hits = Vec::new();

        for room in store.rooms() {
            let staff = store.staff_tags(room.id);
            let tags = UnifiedTags::unify(room, store.custom_tags(room.id), staff);

            if !filters.is_empty() && !filters.accepts(room, &tags) {
                continue;
            }

            if terms.is_empty() {
                hits.push(SearchHit {
                    room,
                    score: 0.0,
                    matched_terms: 0,
                    total_terms: 0,
                });
                continue;
            }

            let view = RoomView {
                room,
                tags: &tags,
                staff,
            };
            let mut score = 0.0;
            let mut matched = 0;
            for term in terms {
                let term_score = score_term(term, view);
                if term_score > 0.0 {
                    matched += 1;
                    score += term_score * term.weight;
                }
            }

            if matched < required {
                continue;
            }
            if exact_room_number_match(terms, room) {
                score *= 2.0;
            }

            hits.push(SearchHit {
                room,
                score,
                matched_terms: matched,
                total_terms: terms.len(),
            });
        }

        // sort_by is stable, so equal scores keep store order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            "{} of {} rooms matched {} term(s)",
            hits.len(),
            store.len(),
            terms.len()
        );
        hits
    }

    /// Matched terms needed for inclusion: all of a single-term query,
    /// otherwise the configured fraction rounded up.
    fn required_matches(&self, term_count: usize) -> usize {
        match term_count {
            0 => 0,
            1 => 1,
            n => {
                let ratio = self.config.min_match_ratio.clamp(0.0, 1.0);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let required = (count_to_f64(n) * ratio).ceil() as usize;
                required.max(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::CustomTag;
    use crate::core::types::RoomId;

    fn vocab() -> Vocabulary {
        Vocabulary::load_embedded().unwrap()
    }

    fn store() -> DirectoryStore {
        let mut a = Room::new(RoomId(0), "2204", "2", "University Hospital");
        a.department = "Cardiology".to_string();
        a.type_full = "Office".to_string();
        let mut b = Room::new(RoomId(1), "204", "2", "Mott");
        b.department = "Radiology".to_string();
        b.type_full = "Exam Room".to_string();
        let mut c = Room::new(RoomId(2), "310", "3", "Mott");
        c.department = "Cardiology".to_string();
        c.type_full = "Exam Room".to_string();
        DirectoryStore::from_rooms(vec![a, b, c])
    }

    fn ids(hits: &[SearchHit<'_>]) -> Vec<u32> {
        hits.iter().map(|h| h.room.id.0).collect()
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let store = store();
        let vocab = vocab();
        let engine = SearchEngine::new(&store, &vocab);
        assert_eq!(ids(&engine.search("")), vec![0, 1, 2]);
        assert_eq!(ids(&engine.search("  the  ")), vec![0, 1, 2]);
    }

    #[test]
    fn test_exact_room_number_ranks_first() {
        let store = store();
        let vocab = vocab();
        let hits = SearchEngine::new(&store, &vocab).search("204");
        assert_eq!(ids(&hits), vec![1, 0]);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_single_term_must_match() {
        let store = store();
        let vocab = vocab();
        let hits = SearchEngine::new(&store, &vocab).search("mott");
        assert_eq!(ids(&hits), vec![1, 2]);
    }

    #[test]
    fn test_multi_term_threshold() {
        let store = store();
        let vocab = vocab();
        let engine = SearchEngine::new(&store, &vocab);

        // 3 terms need ceil(2.1) = 3 matches
        assert_eq!(ids(&engine.search("3rd floor mott cardiology")), vec![2]);

        let relaxed = SearchConfig {
            min_match_ratio: 0.3,
            ..SearchConfig::default()
        };
        let engine = SearchEngine::with_config(&store, &vocab, relaxed);
        let hits = engine.search("3rd floor mott cardiology");
        assert_eq!(hits[0].room.id, RoomId(2));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_ties_keep_store_order() {
        let store = store();
        let vocab = vocab();
        let hits = SearchEngine::new(&store, &vocab).search("exam");
        assert_eq!(ids(&hits), vec![1, 2]);
        assert!((hits[0].score - hits[1].score).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_tags_are_searchable() {
        let mut store = store();
        store
            .add_custom_tag(RoomId(0), CustomTag::new("Crash Cart"))
            .unwrap();
        let vocab = vocab();
        let hits = SearchEngine::new(&store, &vocab).search("crash cart");
        assert_eq!(ids(&hits), vec![0]);
    }

    #[test]
    fn test_spelling_is_corrected() {
        let store = store();
        let vocab = vocab();
        let engine = SearchEngine::new(&store, &vocab);
        assert_eq!(ids(&engine.search("cardiolgy")), vec![0, 2]);

        let config = SearchConfig {
            correct_spelling: false,
            ..SearchConfig::default()
        };
        let engine = SearchEngine::with_config(&store, &vocab, config);
        assert!(engine.search("cardiolgy").is_empty());
    }

    #[test]
    fn test_filters() {
        let store = store();
        let vocab = vocab();
        let engine = SearchEngine::new(&store, &vocab);

        let filters = SearchFilters {
            building: Some("MOTT".to_string()),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&engine.search_filtered("", &filters)), vec![1, 2]);

        let filters = SearchFilters {
            floor: Some("02".to_string()),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&engine.search_filtered("", &filters)), vec![0, 1]);

        let filters = SearchFilters {
            tags: vec!["cardio".to_string()],
            ..SearchFilters::default()
        };
        assert_eq!(ids(&engine.search_filtered("", &filters)), vec![0, 2]);
    }

    #[test]
    fn test_required_matches() {
        let store = store();
        let vocab = vocab();
        let engine = SearchEngine::new(&store, &vocab);
        assert_eq!(engine.required_matches(0), 0);
        assert_eq!(engine.required_matches(1), 1);
        assert_eq!(engine.required_matches(2), 2);
        assert_eq!(engine.required_matches(3), 3);
        assert_eq!(engine.required_matches(4), 3);
        assert_eq!(engine.required_matches(10), 7);
    }
}
