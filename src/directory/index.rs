use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::room::Room;
use crate::core::types::{IdentityKey, RoomId};

/// Lookup tables from identity keys to positions in the room list.
///
/// When two rooms share a key (possible until cleanup runs), the first one wins.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    by_id: HashMap<RoomId, usize>,
    by_record: HashMap<String, usize>,
    by_composite: HashMap<IdentityKey, usize>,
}

impl IdentityIndex {
    #[must_use]
    pub fn build(rooms: &[Room]) -> Self {
        let mut index = Self::default();
        for (position, room) in rooms.iter().enumerate() {
            index.insert(room, position);
        }
        index
    }

    pub fn insert(&mut self, room: &Room, position: usize) {
        self.by_id.entry(room.id).or_insert(position);
        if let Some(key) = &room.record_key {
            self.by_record.entry(key.clone()).or_insert(position);
        }
        self.by_composite
            .entry(room.composite_key())
            .or_insert(position);
    }

    #[must_use]
    pub fn position(&self, id: RoomId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    #[must_use]
    pub fn by_record_key(&self, key: &str) -> Option<usize> {
        self.by_record.get(key).copied()
    }

    #[must_use]
    pub fn by_composite(&self, key: &IdentityKey) -> Option<usize> {
        self.by_composite.get(key).copied()
    }
}

/// Values available for filtering, derived from the room list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub buildings: Vec<String>,
    /// Numeric floors first in numeric order, then other labels
    pub floors: Vec<String>,
    pub categories: Vec<String>,
}

impl Facets {
    #[must_use]
    pub fn collect(rooms: &[Room]) -> Self {
        let mut buildings = BTreeSet::new();
        let mut floors = BTreeSet::new();
        let mut categories = BTreeSet::new();

        for room in rooms {
            buildings.insert(room.building.clone());
            floors.insert(room.floor.clone());
            categories.extend(room.category_tags.iter().cloned());
        }

        let mut floors: Vec<String> = floors.into_iter().collect();
        floors.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });

        Self {
            buildings: buildings.into_iter().collect(),
            floors,
            categories: categories.into_iter().collect(),
        }
    }
}
