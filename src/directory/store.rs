use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::annotation::{Annotation, CustomTag};
use crate::core::room::Room;
use crate::core::types::{IdentityKey, RoomId};
use crate::directory::index::{Facets, IdentityIndex};
use crate::vocab::UnresolvedCodes;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Tag name cannot be empty")]
    EmptyName,

    #[error("Room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("Room {room} already has a tag named '{name}'")]
    Duplicate { room: RoomId, name: String },

    #[error("Room {room} has no tag named '{name}'")]
    NotFound { room: RoomId, name: String },
}

/// The room directory: canonical rooms plus the annotations keyed by room id
#[derive(Debug, Clone, Default)]
pub struct DirectoryStore {
    pub(crate) rooms: Vec<Room>,

    pub(crate) custom_tags: BTreeMap<RoomId, Vec<CustomTag>>,

    pub(crate) staff_tags: BTreeMap<RoomId, Vec<String>>,

    /// Codes no vocabulary table could expand, accumulated across batches
    pub(crate) unresolved: UnresolvedCodes,

    /// Next id handed to a newly created room
    pub(crate) next_id: u32,

    index: IdentityIndex,

    facets: Facets,
}

impl DirectoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store around existing rooms (ids are kept as given)
    #[must_use]
    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        let mut store = Self {
            rooms,
            ..Self::default()
        };
        store.rebuild_indexes();
        store
    }

    /// Recompute identity indexes, facets and the id allocator from the room list
    pub fn rebuild_indexes(&mut self) {
        self.index = IdentityIndex::build(&self.rooms);
        self.facets = Facets::collect(&self.rooms);
        let floor = self
            .rooms
            .iter()
            .map(|r| r.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(floor);
    }

    pub(crate) fn allocate_id(&mut self) -> RoomId {
        let id = RoomId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Overwrite the room at `position`, re-indexing when its identity moved
    pub(crate) fn replace_room(&mut self, position: usize, room: Room) {
        let Some(slot) = self.rooms.get_mut(position) else {
            return;
        };
        let moved =
            slot.record_key != room.record_key || slot.composite_key() != room.composite_key();
        *slot = room;
        if moved {
            self.index = IdentityIndex::build(&self.rooms);
        }
    }

    /// Append a room, keeping the identity index current
    pub(crate) fn push_room(&mut self, room: Room) {
        self.index.insert(&room, self.rooms.len());
        self.rooms.push(room);
    }

    /// Rooms in store order
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.index.position(id).map(|i| &self.rooms[i])
    }

    #[must_use]
    pub fn contains(&self, id: RoomId) -> bool {
        self.index.position(id).is_some()
    }

    #[must_use]
    pub fn find_by_record_key(&self, key: &str) -> Option<&Room> {
        self.index.by_record_key(key.trim()).map(|i| &self.rooms[i])
    }

    #[must_use]
    pub fn find_by_composite(&self, key: &IdentityKey) -> Option<&Room> {
        self.index.by_composite(key).map(|i| &self.rooms[i])
    }

    pub(crate) fn index(&self) -> &IdentityIndex {
        &self.index
    }

    /// Resolve an external room identifier: record key, then room id, then room number
    #[must_use]
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&Room> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }
        self.find_by_record_key(identifier)
            .or_else(|| RoomId::parse(identifier).and_then(|id| self.get(id)))
            .or_else(|| self.rooms.iter().find(|r| r.room_number == identifier))
    }

    /// Available buildings, floors and category tags
    #[must_use]
    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    #[must_use]
    pub fn unresolved(&self) -> &UnresolvedCodes {
        &self.unresolved
    }

    pub(crate) fn record_unresolved(&mut self, codes: UnresolvedCodes) {
        for (code, count) in codes {
            *self.unresolved.entry(code).or_default() += count;
        }
    }

    #[must_use]
    pub fn custom_tags(&self, id: RoomId) -> &[CustomTag] {
        self.custom_tags.get(&id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn staff_tags(&self, id: RoomId) -> &[String] {
        self.staff_tags.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Every custom tag by room
    #[must_use]
    pub fn all_custom_tags(&self) -> &BTreeMap<RoomId, Vec<CustomTag>> {
        &self.custom_tags
    }

    #[must_use]
    pub fn all_staff_tags(&self) -> &BTreeMap<RoomId, Vec<String>> {
        &self.staff_tags
    }

    /// Both annotation kinds for a room, staff names first
    #[must_use]
    pub fn annotations(&self, id: RoomId) -> Vec<Annotation> {
        self.staff_tags(id)
            .iter()
            .map(|name| Annotation::Staff { name: name.clone() })
            .chain(self.custom_tags(id).iter().cloned().map(Annotation::Custom))
            .collect()
    }

    /// Attach a custom tag. Names are unique per room, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName`, `TagError::UnknownRoom` or `TagError::Duplicate`.
    pub fn add_custom_tag(&mut self, id: RoomId, tag: CustomTag) -> Result<(), TagError> {
        if tag.name.trim().is_empty() {
            return Err(TagError::EmptyName);
        }
        if !self.contains(id) {
            return Err(TagError::UnknownRoom(id));
        }

        let tags = self.custom_tags.entry(id).or_default();
        if tags.iter().any(|t| t.same_name(&tag.name)) {
            return Err(TagError::Duplicate {
                room: id,
                name: tag.name,
            });
        }
        tags.push(tag);
        Ok(())
    }

    /// Detach a custom tag by name (case-insensitive), returning it
    ///
    /// # Errors
    ///
    /// Returns `TagError::NotFound` if the room has no such tag.
    pub fn remove_custom_tag(&mut self, id: RoomId, name: &str) -> Result<CustomTag, TagError> {
        let not_found = || TagError::NotFound {
            room: id,
            name: name.trim().to_string(),
        };
        let tags = self.custom_tags.get_mut(&id).ok_or_else(not_found)?;
        let position = tags
            .iter()
            .position(|t| t.same_name(name))
            .ok_or_else(not_found)?;
        let removed = tags.remove(position);
        if tags.is_empty() {
            self.custom_tags.remove(&id);
        }
        Ok(removed)
    }

    pub(crate) fn custom_tag_mut(&mut self, id: RoomId, name: &str) -> Option<&mut CustomTag> {
        self.custom_tags
            .get_mut(&id)?
            .iter_mut()
            .find(|t| t.same_name(name))
    }

    /// Keep only the custom tags `keep` accepts, returning how many were dropped
    pub(crate) fn retain_custom_tags(&mut self, mut keep: impl FnMut(&CustomTag) -> bool) -> usize {
        let mut dropped = 0;
        for tags in self.custom_tags.values_mut() {
            let before = tags.len();
            tags.retain(|t| keep(t));
            dropped += before - tags.len();
        }
        self.custom_tags.retain(|_, tags| !tags.is_empty());
        dropped
    }

    /// Attach a staff name. Names are unique per room.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName`, `TagError::UnknownRoom` or `TagError::Duplicate`.
    pub fn add_staff_tag(&mut self, id: RoomId, name: &str) -> Result<(), TagError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::EmptyName);
        }
        if !self.contains(id) {
            return Err(TagError::UnknownRoom(id));
        }

        let names = self.staff_tags.entry(id).or_default();
        if names.iter().any(|n| n == name) {
            return Err(TagError::Duplicate {
                room: id,
                name: name.to_string(),
            });
        }
        names.push(name.to_string());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `TagError::NotFound` if the room has no such staff name.
    pub fn remove_staff_tag(&mut self, id: RoomId, name: &str) -> Result<(), TagError> {
        let name = name.trim();
        let not_found = || TagError::NotFound {
            room: id,
            name: name.to_string(),
        };
        let names = self.staff_tags.get_mut(&id).ok_or_else(not_found)?;
        let position = names.iter().position(|n| n == name).ok_or_else(not_found)?;
        names.remove(position);
        if names.is_empty() {
            self.staff_tags.remove(&id);
        }
        Ok(())
    }

    /// Replace every collection at once (session restore)
    pub(crate) fn replace_all(
        &mut self,
        rooms: Vec<Room>,
        custom_tags: BTreeMap<RoomId, Vec<CustomTag>>,
        staff_tags: BTreeMap<RoomId, Vec<String>>,
        unresolved: UnresolvedCodes,
    ) {
        self.rooms = rooms;
        self.custom_tags = custom_tags;
        self.staff_tags = staff_tags;
        self.unresolved = unresolved;
        self.next_id = 0;
        self.rebuild_indexes();
    }
}
