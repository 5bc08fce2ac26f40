//! Export and import of custom tags.
//!
//! Tags are keyed by the room id they had at export time, together with
//! enough identity hints to find the same room again after a fresh
//! ingestion has handed out different ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::annotation::CustomTag;
use crate::core::room::Room;
use crate::core::types::RoomId;
use crate::directory::store::{DirectoryStore, TagError};

pub const TAG_EXPORT_VERSION: &str = "1.2";

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("No custom tags on loaded rooms to export")]
    NothingToExport,

    #[error("Invalid tags file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read tags file: {0}")]
    Io(#[from] std::io::Error),
}

/// Identity hints for re-targeting a room's tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomReference {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rmnbr: Option<String>,

    #[serde(rename = "typeFull", default)]
    pub type_full: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub rmrecnbr: Option<String>,

    #[serde(default)]
    pub building: Option<String>,
}

impl RoomReference {
    fn of(room: &Room) -> Self {
        Self {
            rmnbr: Some(room.room_number.clone()),
            type_full: Some(room.type_full.clone()),
            rmrecnbr: room.record_key.clone(),
            building: Some(room.building_short.clone()),
        }
    }
}

/// A tag as found in an export file: a bare name or a full object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportedTag {
    Name(String),
    Full(TagFields),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFields {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ExportedTag {
    /// Rebuild a fresh local tag (new timestamp, not shared)
    fn to_custom_tag(&self) -> CustomTag {
        match self {
            Self::Name(name) => CustomTag::new(name.as_str()),
            Self::Full(fields) => CustomTag::new(fields.name.as_str())
                .with_kind(fields.kind.clone().unwrap_or_default())
                .with_color(fields.color.clone().unwrap_or_default())
                .with_description(fields.description.clone())
                .with_link(fields.link.clone())
                .with_contact(fields.contact.clone())
                .with_image_url(fields.image_url.clone()),
        }
    }
}

impl From<&CustomTag> for ExportedTag {
    fn from(tag: &CustomTag) -> Self {
        Self::Full(TagFields {
            name: tag.name.clone(),
            kind: Some(tag.kind.clone()),
            description: tag.description.clone(),
            link: tag.link.clone(),
            contact: tag.contact.clone(),
            image_url: tag.image_url.clone(),
            color: Some(tag.color.clone()),
        })
    }
}

/// The custom tag export document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagExport {
    #[serde(default)]
    pub version: String,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Room id at export time -> tags
    pub custom_tags: BTreeMap<String, Vec<ExportedTag>>,

    #[serde(default)]
    pub room_reference: BTreeMap<String, RoomReference>,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Tags already present on the target room
    pub duplicates: usize,
    /// Exported rooms with no counterpart in the store
    pub unmatched_rooms: usize,
}

impl TagExport {
    /// Collect custom tags of every loaded room that has some.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::NothingToExport` if no loaded room has tags.
    pub fn from_store(store: &DirectoryStore) -> Result<Self, TransferError> {
        let mut custom_tags = BTreeMap::new();
        let mut room_reference = BTreeMap::new();

        for (id, tags) in store.all_custom_tags() {
            let Some(room) = store.get(*id) else {
                continue;
            };
            if tags.is_empty() {
                continue;
            }
            custom_tags.insert(id.to_string(), tags.iter().map(ExportedTag::from).collect());
            room_reference.insert(id.to_string(), RoomReference::of(room));
        }

        if custom_tags.is_empty() {
            return Err(TransferError::NothingToExport);
        }

        Ok(Self {
            version: TAG_EXPORT_VERSION.to_string(),
            timestamp: Utc::now(),
            custom_tags,
            room_reference,
        })
    }

    /// # Errors
    ///
    /// Returns `TransferError::Json` if the document is malformed or lacks `customTags`.
    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns `TransferError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Attach the exported tags to matching rooms in `store`.
    pub fn apply(&self, store: &mut DirectoryStore) -> ImportReport {
        let mut report = ImportReport::default();

        for (exported_id, tags) in &self.custom_tags {
            if tags.is_empty() {
                continue;
            }

            let reference = self.room_reference.get(exported_id);
            let Some(target) = resolve_target(store, exported_id, reference) else {
                debug!("No room matches exported room {}", exported_id);
                report.unmatched_rooms += 1;
                continue;
            };

            for tag in tags {
                match store.add_custom_tag(target, tag.to_custom_tag()) {
                    Ok(()) => report.imported += 1,
                    Err(TagError::Duplicate { .. } | TagError::EmptyName) => report.duplicates += 1,
                    Err(TagError::UnknownRoom(_) | TagError::NotFound { .. }) => {}
                }
            }
        }

        info!(
            "Imported {} custom tags ({} duplicates, {} rooms unmatched)",
            report.imported, report.duplicates, report.unmatched_rooms
        );

        report
    }
}

/// Record key, then room number plus building, then original id, then room number alone
fn resolve_target(
    store: &DirectoryStore,
    exported_id: &str,
    reference: Option<&RoomReference>,
) -> Option<RoomId> {
    let record_key = reference.and_then(|r| r.rmrecnbr.as_deref());
    let number = reference.and_then(|r| r.rmnbr.as_deref()).map(str::trim);
    let building = reference.and_then(|r| r.building.as_deref()).map(str::trim);

    if let Some(room) = record_key.and_then(|key| store.find_by_record_key(key)) {
        return Some(room.id);
    }

    if let (Some(number), Some(building)) = (number, building) {
        let found = store.rooms().iter().find(|r| {
            r.room_number == number && r.building_names().any(|b| b.eq_ignore_ascii_case(building))
        });
        if let Some(room) = found {
            return Some(room.id);
        }
    }

    if let Some(room) = RoomId::parse(exported_id).and_then(|id| store.get(id)) {
        return Some(room.id);
    }

    number.and_then(|number| {
        store
            .rooms()
            .iter()
            .find(|r| r.room_number == number)
            .map(|r| r.id)
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

/// Accept identifiers written either as strings or as numbers
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value
        .map(|v| match v {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
        })
        .filter(|s| !s.is_empty()))
}
