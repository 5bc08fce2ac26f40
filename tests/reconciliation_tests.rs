//! Reconciliation Test Suite
//!
//! Exercises incremental ingestion across several extracts: identity
//! matching, duplicate cleanup and the survival of user annotations.

use room_finder::{
    CustomTag, DirectoryStore, OccupantRow, Reconciler, Room, RoomId, RoomRow, Vocabulary,
};

fn vocab() -> Vocabulary {
    Vocabulary::load_embedded().expect("embedded vocabulary loads")
}

/// Re-importing the same extract leaves the directory unchanged
#[test]
fn test_reimport_is_stable() {
    let vocab = vocab();
    let rows = vec![
        RoomRow::new("3120", "3")
            .with_record_key("1001")
            .with_building("Mott")
            .with_department("CARDIO"),
        RoomRow::new("3121", "3").with_building("Mott"),
    ];

    let mut store = DirectoryStore::new();
    let first = Reconciler::new(&mut store, &vocab).ingest(&rows);
    let snapshot: Vec<Room> = store.rooms().to_vec();

    let second = Reconciler::new(&mut store, &vocab).ingest(&rows);

    assert_eq!(first.created, 2);
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 2);
    assert_eq!(store.rooms(), snapshot.as_slice());
}

/// A room keeps its id and annotations when a later extract changes it
#[test]
fn test_code_expansion_preserves_id_and_tags() {
    let vocab = vocab();
    let mut store = DirectoryStore::new();
    Reconciler::new(&mut store, &vocab).ingest(&[
        RoomRow::new("1200", "1").with_building("Taubman"),
        RoomRow::new("3120", "3")
            .with_record_key("1001")
            .with_building("Mott")
            .with_department("CARDIO PREV"),
    ]);
    let id = store.find_by_record_key("1001").expect("room exists").id;
    store
        .add_custom_tag(id, CustomTag::new("Crash Cart").with_kind("equipment"))
        .expect("tag added");

    Reconciler::new(&mut store, &vocab).ingest(&[RoomRow::new("3120", "3")
        .with_record_key("1001")
        .with_building("Mott")
        .with_department("CARDIO")]);

    let room = store.find_by_record_key("1001").expect("room still exists");
    assert_eq!(room.id, id);
    assert_eq!(room.department, "Cardiology");
    assert_eq!(store.custom_tags(id).len(), 1);
    assert_eq!(store.custom_tags(id)[0].kind, "equipment");
}

/// Rooms sharing a record key collapse into the first one
#[test]
fn test_cleanup_merges_by_record_key() {
    let vocab = vocab();
    let mut store = DirectoryStore::from_rooms(vec![
        Room::new(RoomId(0), "204", "2", "Mott").with_record_key("R1"),
        Room::new(RoomId(1), "999", "9", "Elsewhere"),
        Room::new(RoomId(2), "204", "2", "Mott").with_record_key("R1"),
    ]);
    store
        .add_custom_tag(RoomId(2), CustomTag::new("Whiteboard"))
        .expect("tag added");
    store.add_staff_tag(RoomId(2), "Dr. Smith").expect("staff added");

    let removed = Reconciler::new(&mut store, &vocab).reconcile_all();

    assert_eq!(removed, 1);
    assert_eq!(store.len(), 2);
    let ids: Vec<RoomId> = store.rooms().iter().map(|r| r.id).collect();
    assert_eq!(ids, [RoomId(0), RoomId(1)]);
    assert_eq!(store.custom_tags(RoomId(0))[0].name, "Whiteboard");
    assert_eq!(store.staff_tags(RoomId(0)), ["Dr. Smith"]);
    assert!(store.custom_tags(RoomId(1)).is_empty());
}

/// Rooms without record keys collapse on number, floor and building
#[test]
fn test_cleanup_merges_by_composite_key() {
    let vocab = vocab();
    let mut store = DirectoryStore::from_rooms(vec![
        Room::new(RoomId(0), "204", "2", "Mott"),
        Room::new(RoomId(1), "204", "02", "MOTT"),
        Room::new(RoomId(2), "204", "3", "Mott"),
    ]);

    let removed = Reconciler::new(&mut store, &vocab).reconcile_all();

    assert_eq!(removed, 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.rooms()[1].floor, "3");
}

/// A second cleanup pass finds nothing to do
#[test]
fn test_cleanup_is_idempotent() {
    let vocab = vocab();
    let mut store = DirectoryStore::from_rooms(vec![
        Room::new(RoomId(4), "204", "2", "Mott"),
        Room::new(RoomId(7), "204", "2", "Mott"),
        Room::new(RoomId(9), "100", "1", "Mott"),
    ]);

    assert_eq!(Reconciler::new(&mut store, &vocab).reconcile_all(), 1);
    let after_first: Vec<Room> = store.rooms().to_vec();

    assert_eq!(Reconciler::new(&mut store, &vocab).reconcile_all(), 0);
    assert_eq!(store.rooms(), after_first.as_slice());
}

/// Occupant rosters attach staff names by record key only
#[test]
fn test_occupants_attach_by_record_key() {
    let vocab = vocab();
    let mut store = DirectoryStore::new();
    Reconciler::new(&mut store, &vocab).ingest(&[
        RoomRow::new("3120", "3").with_record_key("1001").with_building("Mott"),
        RoomRow::new("3121", "3").with_building("Mott"),
    ]);

    let report = Reconciler::new(&mut store, &vocab).ingest_occupants(&[
        OccupantRow::new("1001", "Jane Doe"),
        OccupantRow::new("1001", "Jane Doe"),
        OccupantRow::new("4040", "John Roe"),
        OccupantRow::default(),
    ]);

    assert_eq!(report.attached, 1);
    assert_eq!(report.already_present, 1);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.skipped_malformed, 1);
    assert_eq!(store.staff_tags(RoomId(0)), ["Jane Doe"]);
}

/// Unknown codes are kept verbatim and counted across batches
#[test]
fn test_unresolved_codes_are_counted() {
    let vocab = vocab();
    let mut store = DirectoryStore::new();
    Reconciler::new(&mut store, &vocab)
        .ingest(&[RoomRow::new("1", "1").with_department("QQXZ")]);
    Reconciler::new(&mut store, &vocab)
        .ingest(&[RoomRow::new("2", "1").with_department("QQXZ")]);

    assert_eq!(store.rooms()[0].department, "QQXZ");
    assert_eq!(store.unresolved().get("QQXZ"), Some(&2));
}

/// Abbreviated type codes map to their friendly full-replacement names
#[test]
fn test_type_codes_use_full_replacements() {
    let vocab = vocab();
    let mut store = DirectoryStore::new();
    Reconciler::new(&mut store, &vocab).ingest(&[RoomRow::new("1100", "1")
        .with_building("Mott")
        .with_room_type("Circulat'n")
        .with_room_subtype("PubCorr")]);

    let room = &store.rooms()[0];
    assert_eq!(room.type_full, "Corridor");
    assert!(room.category_tags.iter().any(|t| t == "circulation"));
    assert!(store.unresolved().is_empty());
}
