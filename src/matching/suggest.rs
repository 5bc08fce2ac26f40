use std::collections::BTreeSet;

use crate::core::types::{ordinal_suffix, ordinal_word};
use crate::directory::store::DirectoryStore;
use crate::matching::tags::UnifiedTags;

/// Default cap on the number of distinct suggestions
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5000;

const MAX_NUMERIC_SUGGESTIONS: usize = 10;
const MAX_PREFIX_SUGGESTIONS: usize = 5;
const MAX_CONTAINS_SUGGESTIONS: usize = 5;

/// Collects suggestions until the limit is reached
struct Collector {
    items: BTreeSet<String>,
    limit: usize,
}

impl Collector {
    fn full(&self) -> bool {
        self.items.len() >= self.limit
    }

    fn push(&mut self, item: &str) {
        let item = item.trim().to_lowercase();
        if !item.is_empty() && !self.full() {
            self.items.insert(item);
        }
    }
}

/// Sorted autocomplete vocabulary for the store, at most `limit` entries.
///
/// Floor phrases and building names go in first so they survive the cap,
/// then each room's unified tags and raw room number in store order.
#[must_use]
pub fn build_suggestions(store: &DirectoryStore, limit: usize) -> Vec<String> {
    let mut collector = Collector {
        items: BTreeSet::new(),
        limit,
    };

    let facets = store.facets();
    for floor in &facets.floors {
        collector.push(&format!("floor {floor}"));
        collector.push(&format!("level {floor}"));
        collector.push(&format!("f{floor}"));
        if let Ok(n) = floor.parse::<u32>() {
            collector.push(&format!("{n}{} floor", ordinal_suffix(n)));
            if let Some(word) = ordinal_word(n) {
                collector.push(&format!("{word} floor"));
            }
        }
    }

    for room in store.rooms() {
        for name in room.building_names() {
            collector.push(name);
            collector.push(&format!("building {name}"));
        }
    }

    for room in store.rooms() {
        if collector.full() {
            break;
        }
        let tags = UnifiedTags::unify(
            room,
            store.custom_tags(room.id),
            store.staff_tags(room.id),
        );
        for tag in tags.iter() {
            collector.push(tag);
        }
        collector.push(&room.room_number);
    }

    if collector.full() {
        tracing::debug!("Suggestion list capped at {} entries", limit);
    }
    collector.items.into_iter().collect()
}

/// Completions for `prefix` from a sorted suggestion list.
///
/// A numeric prefix gets up to 10 prefix matches. Anything else gets up to 5
/// prefix matches followed by up to 5 entries that contain it elsewhere.
#[must_use]
pub fn suggest<'a>(items: &'a [String], prefix: &str) -> Vec<&'a str> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }

    if prefix.chars().all(|c| c.is_ascii_digit()) {
        return items
            .iter()
            .filter(|item| item.starts_with(&prefix))
            .take(MAX_NUMERIC_SUGGESTIONS)
            .map(String::as_str)
            .collect();
    }

    let starts = items
        .iter()
        .filter(|item| item.starts_with(&prefix))
        .take(MAX_PREFIX_SUGGESTIONS);
    let contains = items
        .iter()
        .filter(|item| !item.starts_with(&prefix) && item.contains(&prefix))
        .take(MAX_CONTAINS_SUGGESTIONS);

    starts.chain(contains).map(String::as_str).collect()
}
