use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::core::annotation::CustomTag;
use crate::core::room::{OccupantRow, Room, RoomRow};
use crate::core::types::{IdentityKey, RoomId};
use crate::directory::store::DirectoryStore;
use crate::vocab::{UnresolvedCodes, Vocabulary};

/// Default map link, `{record_key}` is substituted
pub const DEFAULT_MAP_LINK_TEMPLATE: &str =
    "https://mgis.med.umich.edu/#feature=search&rmrecnbr={record_key}";

/// Configuration for ingestion
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Template for a room's map link; `None` disables links
    pub map_link_template: Option<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            map_link_template: Some(DEFAULT_MAP_LINK_TEMPLATE.to_string()),
        }
    }
}

/// Outcome of one ingested batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub created: usize,
    pub updated: usize,
    /// Rows whose identity was already seen earlier in the same batch
    pub skipped_duplicates: usize,
    /// Rows without a room number or floor
    pub skipped_malformed: usize,
    /// Codes no vocabulary table could expand in this batch
    pub unresolved: UnresolvedCodes,
}

/// Outcome of one occupant roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccupantReport {
    pub attached: usize,
    /// Name already present on the room
    pub already_present: usize,
    /// No room carries the row's record key
    pub unmatched: usize,
    pub skipped_malformed: usize,
}

/// Merges raw extract rows into a [`DirectoryStore`]
pub struct Reconciler<'a> {
    store: &'a mut DirectoryStore,
    vocab: &'a Vocabulary,
    config: ReconcileConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a mut DirectoryStore, vocab: &'a Vocabulary) -> Self {
        Self {
            store,
            vocab,
            config: ReconcileConfig::default(),
        }
    }

    pub fn with_config(
        store: &'a mut DirectoryStore,
        vocab: &'a Vocabulary,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            store,
            vocab,
            config,
        }
    }

    /// Ingest one batch of room rows.
    ///
    /// Each row is matched against the rooms that existed before the batch, by
    /// record key and then by composite key, as they stand after the rows
    /// already applied. A match is overwritten in place and keeps its id; a row
    /// whose key was already handled earlier in the batch is skipped; anything
    /// else becomes a new room.
    pub fn ingest(&mut self, rows: &[RoomRow]) -> IngestReport {
        let mut report = IngestReport::default();
        let existing = self.store.len();
        let mut seen_records: HashSet<String> = HashSet::new();
        let mut seen_composites: HashSet<IdentityKey> = HashSet::new();

        for (line, row) in rows.iter().enumerate() {
            let Some((room_number, floor)) = row.location() else {
                warn!(
                    "Skipping row {}: missing room number or floor",
                    line + 1
                );
                report.skipped_malformed += 1;
                continue;
            };

            let record_key = row.record_key();
            let building_short = row.building_short_name();
            let composite = IdentityKey::composite(&room_number, &floor, &building_short);

            let matched = self.find_existing(record_key.as_deref(), &composite, existing);

            let already_seen = record_key
                .as_ref()
                .is_some_and(|key| seen_records.contains(key))
                || seen_composites.contains(&composite);
            if already_seen {
                debug!("Skipping duplicate row {} ({})", line + 1, composite);
                report.skipped_duplicates += 1;
                continue;
            }

            let room = self.build_room(row, room_number, floor, &mut report.unresolved);

            match matched {
                Some(position) => {
                    let current = &self.store.rooms[position];
                    let mut updated = Room {
                        id: current.id,
                        ..room
                    };
                    // A row matched by composite key must not erase a known record key
                    if updated.record_key.is_none() {
                        updated.record_key = current.record_key.clone();
                        updated.map_link = self.map_link(updated.record_key.as_deref());
                    }
                    self.store.replace_room(position, updated);
                    report.updated += 1;
                }
                None => {
                    let id = self.store.allocate_id();
                    self.store.push_room(Room { id, ..room });
                    report.created += 1;
                }
            }

            if let Some(key) = record_key {
                seen_records.insert(key);
            }
            seen_composites.insert(composite);
        }

        self.store.record_unresolved(report.unresolved.clone());
        self.store.rebuild_indexes();

        info!(
            "Ingested batch: {} created, {} updated, {} duplicates skipped, {} malformed rows skipped",
            report.created, report.updated, report.skipped_duplicates, report.skipped_malformed
        );
        if !report.unresolved.is_empty() {
            info!("{} codes could not be expanded", report.unresolved.len());
        }

        report
    }

    /// Position of a pre-batch room matching the row, record key first
    fn find_existing(
        &self,
        record_key: Option<&str>,
        composite: &IdentityKey,
        existing: usize,
    ) -> Option<usize> {
        let index = self.store.index();
        record_key
            .and_then(|key| index.by_record_key(key))
            .filter(|&p| p < existing)
            .or_else(|| index.by_composite(composite).filter(|&p| p < existing))
    }

    fn build_room(
        &self,
        row: &RoomRow,
        room_number: String,
        floor: String,
        unresolved: &mut UnresolvedCodes,
    ) -> Room {
        let abbreviations = &self.vocab.abbreviations;
        let type_full = abbreviations.compose_type(
            row.room_type.as_deref(),
            row.room_subtype.as_deref(),
            unresolved,
        );
        let department = abbreviations.resolve(row.department.as_deref().unwrap_or(""), unresolved);
        let category_tags = self.vocab.categories.classify(&type_full, &department);
        let record_key = row.record_key();
        let map_link = self.map_link(record_key.as_deref());

        Room {
            id: RoomId::default(),
            record_key,
            room_number,
            floor,
            building: row.building_name(),
            building_short: row.building_short_name(),
            type_full,
            department,
            category_tags,
            map_link,
            extra: row.extra.clone(),
        }
    }

    fn map_link(&self, record_key: Option<&str>) -> Option<String> {
        let template = self.config.map_link_template.as_deref()?;
        let key = record_key?;
        Some(template.replace("{record_key}", key))
    }

    /// Attach occupant names as staff tags on rooms matched by record key
    pub fn ingest_occupants(&mut self, rows: &[OccupantRow]) -> OccupantReport {
        let mut report = OccupantReport::default();

        for (line, row) in rows.iter().enumerate() {
            let key = row.record_key.as_deref().map(str::trim).unwrap_or("");
            let name = row.person_name.as_deref().map(str::trim).unwrap_or("");
            if key.is_empty() || name.is_empty() {
                warn!("Skipping occupant row {}: missing record key or name", line + 1);
                report.skipped_malformed += 1;
                continue;
            }

            let Some(id) = self.store.find_by_record_key(key).map(|r| r.id) else {
                debug!("No room with record key {} for occupant {}", key, name);
                report.unmatched += 1;
                continue;
            };

            if self.store.add_staff_tag(id, name).is_ok() {
                report.attached += 1;
            } else {
                report.already_present += 1;
            }
        }

        info!(
            "Ingested occupants: {} attached, {} already present, {} unmatched",
            report.attached, report.already_present, report.unmatched
        );

        report
    }

    /// Merge rooms sharing an identity key and renumber ids densely.
    ///
    /// The first room with a key survives and inherits the annotations of
    /// every later room with the same key. Returns the number of rooms removed.
    pub fn reconcile_all(&mut self) -> usize {
        let store = &mut *self.store;

        let mut survivors: HashMap<IdentityKey, RoomId> = HashMap::new();
        let mut merged_into: BTreeMap<RoomId, RoomId> = BTreeMap::new();

        for room in &store.rooms {
            match survivors.get(&room.identity_key()) {
                Some(&keeper) => {
                    debug!("Room {} duplicates room {} ({})", room.id, keeper, room.identity_key());
                    merged_into.insert(room.id, keeper);
                }
                None => {
                    survivors.insert(room.identity_key(), room.id);
                }
            }
        }

        for (&removed, &keeper) in &merged_into {
            if let Some(tags) = store.custom_tags.remove(&removed) {
                let kept = store.custom_tags.entry(keeper).or_default();
                merge_custom_tags(kept, tags);
            }
            if let Some(names) = store.staff_tags.remove(&removed) {
                let kept = store.staff_tags.entry(keeper).or_default();
                for name in names {
                    if !kept.contains(&name) {
                        kept.push(name);
                    }
                }
            }
        }

        store.rooms.retain(|room| !merged_into.contains_key(&room.id));
        let removed = merged_into.len();

        drop_orphans(store);
        renumber(store);

        if removed > 0 {
            info!("Cleanup removed {} duplicate rooms, annotations preserved", removed);
        }

        removed
    }
}

/// Union tags into `kept`, skipping names already present (case-insensitive)
fn merge_custom_tags(kept: &mut Vec<CustomTag>, incoming: Vec<CustomTag>) {
    for tag in incoming {
        if !kept.iter().any(|t| t.same_name(&tag.name)) {
            kept.push(tag);
        }
    }
}

fn drop_orphans(store: &mut DirectoryStore) {
    let live: HashSet<RoomId> = store.rooms.iter().map(|r| r.id).collect();

    let before = store.custom_tags.len() + store.staff_tags.len();
    store.custom_tags.retain(|id, tags| live.contains(id) && !tags.is_empty());
    store.staff_tags.retain(|id, names| live.contains(id) && !names.is_empty());
    let dropped = before - store.custom_tags.len() - store.staff_tags.len();

    if dropped > 0 {
        warn!("Dropped annotations for {} rooms that no longer exist", dropped);
    }
}

/// Reassign ids `0..n` in store order and re-key annotation maps to match
fn renumber(store: &mut DirectoryStore) {
    let mut mapping: HashMap<RoomId, RoomId> = HashMap::new();
    for (position, room) in store.rooms.iter_mut().enumerate() {
        let new_id = RoomId(u32::try_from(position).unwrap_or(u32::MAX));
        mapping.insert(room.id, new_id);
        room.id = new_id;
    }

    store.custom_tags = std::mem::take(&mut store.custom_tags)
        .into_iter()
        .filter_map(|(id, tags)| mapping.get(&id).map(|&new_id| (new_id, tags)))
        .collect();
    store.staff_tags = std::mem::take(&mut store.staff_tags)
        .into_iter()
        .filter_map(|(id, names)| mapping.get(&id).map(|&new_id| (new_id, names)))
        .collect();

    store.next_id = u32::try_from(store.rooms.len()).unwrap_or(u32::MAX);
    store.rebuild_indexes();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::load_embedded().unwrap()
    }

    #[test]
    fn test_ingest_creates_rooms() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        let report = Reconciler::new(&mut store, &vocab).ingest(&[
            RoomRow::new("204", "2").with_building("Mott").with_record_key("R1"),
            RoomRow::new("205", "2").with_building("Mott"),
        ]);

        assert_eq!(report.created, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.rooms()[0].id, RoomId(0));
        assert_eq!(store.rooms()[1].id, RoomId(1));
        assert_eq!(
            store.rooms()[0].map_link.as_deref(),
            Some("https://mgis.med.umich.edu/#feature=search&rmrecnbr=R1")
        );
        assert!(store.rooms()[1].map_link.is_none());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        let mut missing_floor = RoomRow::new("204", "2");
        missing_floor.floor = None;
        let report = Reconciler::new(&mut store, &vocab).ingest(&[
            missing_floor,
            RoomRow::default(),
            RoomRow::new("1", "1"),
        ]);
        assert_eq!(report.skipped_malformed, 2);
        assert_eq!(report.created, 1);
        assert_eq!(store.rooms()[0].building, "Unknown Building");
    }

    #[test]
    fn test_batch_duplicates_skipped() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        let report = Reconciler::new(&mut store, &vocab).ingest(&[
            RoomRow::new("204", "2").with_building("Mott"),
            RoomRow::new("204", "02").with_building("MOTT"),
            RoomRow::new("300", "3").with_record_key("R9"),
            RoomRow::new("301", "3").with_record_key("R9"),
        ]);
        assert_eq!(report.created, 2);
        assert_eq!(report.skipped_duplicates, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_keeps_id_and_annotations() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        Reconciler::new(&mut store, &vocab).ingest(&[
            RoomRow::new("100", "1"),
            RoomRow::new("204", "2").with_building("Mott").with_record_key("R1"),
        ]);
        store.add_staff_tag(RoomId(1), "Jane Doe").unwrap();

        let report = Reconciler::new(&mut store, &vocab).ingest(&[RoomRow::new("204", "2")
            .with_building("Mott")
            .with_record_key("R1")
            .with_department("CARDIO")]);

        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
        let room = store.find_by_record_key("R1").unwrap();
        assert_eq!(room.id, RoomId(1));
        assert_eq!(room.department, "Cardiology");
        assert_eq!(store.staff_tags(RoomId(1)), ["Jane Doe"]);
    }

    #[test]
    fn test_composite_match_keeps_record_key() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        Reconciler::new(&mut store, &vocab)
            .ingest(&[RoomRow::new("204", "2").with_building("Mott").with_record_key("R1")]);
        let report = Reconciler::new(&mut store, &vocab)
            .ingest(&[RoomRow::new("204", "2").with_building("Mott").with_room_type("Off")]);

        assert_eq!(report.updated, 1);
        let room = &store.rooms()[0];
        assert_eq!(room.record_key.as_deref(), Some("R1"));
        assert_eq!(room.type_full, "Office");
    }

    #[test]
    fn test_moved_room_frees_old_location() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        Reconciler::new(&mut store, &vocab)
            .ingest(&[RoomRow::new("204", "2").with_building("Mott").with_record_key("R1")]);

        let report = Reconciler::new(&mut store, &vocab).ingest(&[
            RoomRow::new("204", "2").with_building("Taubman").with_record_key("R1"),
            RoomRow::new("204", "2").with_building("Mott").with_room_type("Off"),
        ]);

        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 1);
        let moved = store.find_by_record_key("R1").unwrap();
        assert_eq!(moved.id, RoomId(0));
        assert_eq!(moved.building, "Taubman");
        let fresh = store
            .find_by_composite(&IdentityKey::composite("204", "2", "Mott"))
            .unwrap();
        assert_eq!(fresh.id, RoomId(1));
        assert!(fresh.record_key.is_none());
        assert_eq!(fresh.type_full, "Office");
    }

    #[test]
    fn test_unresolved_accumulates() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        Reconciler::new(&mut store, &vocab)
            .ingest(&[RoomRow::new("1", "1").with_department("ZZQX")]);
        Reconciler::new(&mut store, &vocab)
            .ingest(&[RoomRow::new("2", "1").with_department("ZZQX")]);
        assert_eq!(store.unresolved().get("ZZQX"), Some(&2));
    }

    #[test]
    fn test_ingest_occupants() {
        let vocab = vocab();
        let mut store = DirectoryStore::new();
        let mut reconciler = Reconciler::new(&mut store, &vocab);
        reconciler.ingest(&[RoomRow::new("204", "2").with_record_key("R1")]);
        let report = reconciler.ingest_occupants(&[
            OccupantRow::new("R1", "Jane Doe"),
            OccupantRow::new("R1", " Jane Doe "),
            OccupantRow::new("R2", "John Roe"),
            OccupantRow::default(),
        ]);

        assert_eq!(report.attached, 1);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.skipped_malformed, 1);
        assert_eq!(store.staff_tags(RoomId(0)), ["Jane Doe"]);
    }

    #[test]
    fn test_reconcile_all_merges_annotations() {
        let vocab = vocab();
        let mut store = DirectoryStore::from_rooms(vec![
            Room::new(RoomId(3), "204", "2", "Mott"),
            Room::new(RoomId(5), "100", "1", "Mott"),
            Room::new(RoomId(8), "204", "2", "mott"),
        ]);
        store.add_custom_tag(RoomId(3), CustomTag::new("Scope")).unwrap();
        store.add_custom_tag(RoomId(8), CustomTag::new("scope")).unwrap();
        store.add_custom_tag(RoomId(8), CustomTag::new("X")).unwrap();
        store.add_staff_tag(RoomId(8), "Jane Doe").unwrap();

        let removed = Reconciler::new(&mut store, &vocab).reconcile_all();

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        let ids: Vec<u32> = store.rooms().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![0, 1]);
        let names: Vec<&str> = store
            .custom_tags(RoomId(0))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Scope", "X"]);
        assert_eq!(store.staff_tags(RoomId(0)), ["Jane Doe"]);
        assert!(store.custom_tags(RoomId(1)).is_empty());
        assert_eq!(store.allocate_id(), RoomId(2));
    }

    #[test]
    fn test_reconcile_all_idempotent() {
        let vocab = vocab();
        let mut store = DirectoryStore::from_rooms(vec![
            Room::new(RoomId(0), "1", "1", "A").with_record_key("R1"),
            Room::new(RoomId(1), "2", "1", "A").with_record_key("R1"),
            Room::new(RoomId(2), "3", "1", "A"),
        ]);
        let mut reconciler = Reconciler::new(&mut store, &vocab);
        assert_eq!(reconciler.reconcile_all(), 1);
        assert_eq!(reconciler.reconcile_all(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reconcile_all_drops_orphan_annotations() {
        let vocab = vocab();
        let mut store = DirectoryStore::from_rooms(vec![Room::new(RoomId(4), "1", "1", "A")]);
        store.add_staff_tag(RoomId(4), "Jane Doe").unwrap();
        store.staff_tags.insert(RoomId(99), vec!["Ghost".to_string()]);

        Reconciler::new(&mut store, &vocab).reconcile_all();

        assert_eq!(store.all_staff_tags().len(), 1);
        assert_eq!(store.staff_tags(RoomId(0)), ["Jane Doe"]);
    }
}
