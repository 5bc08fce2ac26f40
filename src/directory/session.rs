//! Whole-directory session snapshots.
//!
//! A snapshot is JSON, gzip-compressed, then base64-encoded so it survives
//! being pasted or stored as text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::core::annotation::CustomTag;
use crate::core::room::Room;
use crate::core::types::RoomId;
use crate::directory::store::DirectoryStore;
use crate::vocab::UnresolvedCodes;

pub const SESSION_VERSION: &str = "1.1";
pub const SESSION_TYPE: &str = "um_session";
pub const DEFAULT_RESULTS_PER_PAGE: usize = 10;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not a session file (type marker is '{0}')")]
    NotASession(String),

    #[error("Session is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Session I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session room id {0} is out of range")]
    IdOutOfRange(u32),
}

/// Filters the user had applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilters {
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Search and paging state carried alongside the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub active_filters: ActiveFilters,
    #[serde(default = "default_view_mode")]
    pub view_mode: String,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: usize,
}

fn default_view_mode() -> String {
    "desktop".to_string()
}

fn default_results_per_page() -> usize {
    DEFAULT_RESULTS_PER_PAGE
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            active_filters: ActiveFilters::default(),
            view_mode: default_view_mode(),
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub custom_tags: BTreeMap<RoomId, Vec<CustomTag>>,
    #[serde(default)]
    pub staff_tags: BTreeMap<RoomId, Vec<String>>,
    #[serde(default)]
    pub unresolved: UnresolvedCodes,
    #[serde(default)]
    pub view: ViewState,
}

/// A complete snapshot of the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: SessionData,
}

impl SessionSnapshot {
    /// Capture every collection of `store` together with the view state
    #[must_use]
    pub fn capture(store: &DirectoryStore, view: ViewState) -> Self {
        Self {
            version: SESSION_VERSION.to_string(),
            timestamp: Utc::now(),
            kind: SESSION_TYPE.to_string(),
            data: SessionData {
                rooms: store.rooms().to_vec(),
                custom_tags: store.all_custom_tags().clone(),
                staff_tags: store.all_staff_tags().clone(),
                unresolved: store.unresolved().clone(),
                view,
            },
        }
    }

    /// JSON, gzip, base64
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if serialization or compression fails.
    pub fn encode(&self) -> Result<String, SessionError> {
        let json = serde_json::to_vec(self)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;
        Ok(STANDARD.encode(compressed))
    }

    /// Inverse of [`encode`](Self::encode); rejects documents of another type
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotASession` on a wrong type marker,
    /// `SessionError::IdOutOfRange` when a room id leaves no room for the next
    /// allocation, or a decoding error for corrupt input.
    pub fn decode(text: &str) -> Result<Self, SessionError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let compressed = STANDARD.decode(compact)?;

        let mut json = Vec::new();
        GzDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;

        let value: serde_json::Value = serde_json::from_slice(&json)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if kind != SESSION_TYPE {
            return Err(SessionError::NotASession(kind.to_string()));
        }

        let snapshot: Self = serde_json::from_value(value)?;
        if let Some(room) = snapshot.data.rooms.iter().find(|r| r.id.0 == u32::MAX) {
            return Err(SessionError::IdOutOfRange(room.id.0));
        }
        Ok(snapshot)
    }

    /// # Errors
    ///
    /// Returns `SessionError` if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path)?;
        Self::decode(&text)
    }

    /// # Errors
    ///
    /// Returns `SessionError` if encoding or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    /// Replace every collection of `store`; derived indexes and facets are
    /// recomputed from the restored rooms. Returns the view state.
    pub fn restore(self, store: &mut DirectoryStore) -> ViewState {
        let SessionData {
            rooms,
            custom_tags,
            staff_tags,
            unresolved,
            view,
        } = self.data;

        tracing::info!(
            "Restored session from {} with {} rooms",
            self.timestamp.to_rfc3339(),
            rooms.len()
        );

        store.replace_all(rooms, custom_tags, staff_tags, unresolved);
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DirectoryStore {
        let mut room = Room::new(RoomId(4), "204", "2", "Mott").with_record_key("R1");
        room.category_tags = vec!["surgery".to_string()];
        let mut store = DirectoryStore::from_rooms(vec![room, Room::new(RoomId(9), "3", "B", "Taubman")]);
        store.add_custom_tag(RoomId(4), CustomTag::new("Scope")).unwrap();
        store.add_staff_tag(RoomId(9), "Jane Doe").unwrap();
        store
    }

    #[test]
    fn test_snapshot_restores_store() {
        let view = ViewState {
            search_query: "mott".to_string(),
            results_per_page: 25,
            ..ViewState::default()
        };
        let encoded = SessionSnapshot::capture(&store(), view.clone())
            .encode()
            .unwrap();

        let mut restored = DirectoryStore::new();
        let restored_view = SessionSnapshot::decode(&encoded)
            .unwrap()
            .restore(&mut restored);

        assert_eq!(restored_view, view);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.custom_tags(RoomId(4))[0].name, "Scope");
        assert_eq!(restored.staff_tags(RoomId(9)), ["Jane Doe"]);
        assert_eq!(restored.find_by_record_key("R1").unwrap().id, RoomId(4));
        assert_eq!(restored.facets().buildings, vec!["Mott", "Taubman"]);
        assert_eq!(restored.facets().categories, vec!["surgery"]);
    }

    #[test]
    fn test_restore_sets_id_allocator() {
        let encoded = SessionSnapshot::capture(&store(), ViewState::default())
            .encode()
            .unwrap();
        let mut restored = DirectoryStore::new();
        SessionSnapshot::decode(&encoded)
            .unwrap()
            .restore(&mut restored);
        assert_eq!(restored.allocate_id(), RoomId(10));
    }

    #[test]
    fn test_decode_rejects_other_documents() {
        let json = br#"{"type": "something_else", "version": "1.1"}"#;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json).unwrap();
        let encoded = STANDARD.encode(encoder.finish().unwrap());

        assert!(matches!(
            SessionSnapshot::decode(&encoded),
            Err(SessionError::NotASession(kind)) if kind == "something_else"
        ));
    }

    #[test]
    fn test_decode_rejects_max_room_id() {
        let store = DirectoryStore::from_rooms(vec![Room::new(RoomId(u32::MAX), "1", "1", "Mott")]);
        let encoded = SessionSnapshot::capture(&store, ViewState::default())
            .encode()
            .unwrap();

        assert!(matches!(
            SessionSnapshot::decode(&encoded),
            Err(SessionError::IdOutOfRange(id)) if id == u32::MAX
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(SessionSnapshot::decode("not base64 at all!").is_err());
    }
}
