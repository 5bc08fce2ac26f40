use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::types::{IdentityKey, RoomId};

/// Building name stored when a row carries neither building field
pub const UNKNOWN_BUILDING: &str = "Unknown Building";

const RECORD_KEY_COLUMNS: &[&str] = &["rmrecnbr", "record_key", "recordkey", "record_number"];
const ROOM_NUMBER_COLUMNS: &[&str] = &["rmnbr", "room_number", "roomnumber", "room_no"];
const FLOOR_COLUMNS: &[&str] = &["floor", "flr", "floor_number"];
const BUILDING_COLUMNS: &[&str] = &["bld_descr", "building", "building_name", "bldg"];
const BUILDING_SHORT_COLUMNS: &[&str] = &["bld_descrshort", "building_short", "bldg_short"];
const ROOM_TYPE_COLUMNS: &[&str] = &["rmtyp_descrshort", "room_type", "type"];
const ROOM_SUBTYPE_COLUMNS: &[&str] = &["rmsubtyp_descrshort", "room_subtype", "subtype"];
const DEPARTMENT_COLUMNS: &[&str] = &["dept_descr", "department", "dept"];
const PERSON_COLUMNS: &[&str] = &["person_name", "name", "occupant", "staff"];

/// Normalize a column header for alias lookup ("Room Number" -> "room_number")
fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Non-blank trimmed value
fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

const ROOM_COLUMNS: [&[&str]; 8] = [
    RECORD_KEY_COLUMNS,
    ROOM_NUMBER_COLUMNS,
    FLOOR_COLUMNS,
    BUILDING_COLUMNS,
    BUILDING_SHORT_COLUMNS,
    ROOM_TYPE_COLUMNS,
    ROOM_SUBTYPE_COLUMNS,
    DEPARTMENT_COLUMNS,
];

fn is_room_column(key: &str) -> bool {
    ROOM_COLUMNS.iter().any(|aliases| aliases.contains(&key))
}

/// Non-blank values keyed by normalized column name
fn normalized_columns(fields: &BTreeMap<String, String>) -> HashMap<String, String> {
    let mut columns = HashMap::new();
    for (column, value) in fields {
        if let Some(value) = present(value) {
            columns.entry(normalize_column(column)).or_insert(value);
        }
    }
    columns
}

/// Value of the highest-priority alias present
fn pick(columns: &HashMap<String, String>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| columns.get(*alias).cloned())
}

/// Normalize a floor label so that "02" and "2" key the same room.
///
/// Non-numeric labels (e.g. "B", "G1") are kept as trimmed text.
#[must_use]
pub fn normalize_floor(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// One raw room row as delivered by an extract, before reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRow {
    pub record_key: Option<String>,
    pub room_number: Option<String>,
    pub floor: Option<String>,
    pub building: Option<String>,
    pub building_short: Option<String>,
    pub room_type: Option<String>,
    pub room_subtype: Option<String>,
    pub department: Option<String>,
    /// Columns with no dedicated field, kept verbatim
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl RoomRow {
    pub fn new(room_number: impl Into<String>, floor: impl Into<String>) -> Self {
        Self {
            room_number: Some(room_number.into()),
            floor: Some(floor.into()),
            ..Self::default()
        }
    }

    /// Map raw column names onto row fields. Blank values count as absent.
    ///
    /// When an extract carries several aliases for one field, the alias listed
    /// first wins (`rmrecnbr` over `record_key`, `bld_descr` over `building`),
    /// whatever order the columns appear in.
    #[must_use]
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let columns = normalized_columns(fields);

        let extra = fields
            .iter()
            .filter(|(column, _)| !is_room_column(&normalize_column(column)))
            .filter_map(|(column, value)| {
                present(value).map(|value| (column.trim().to_string(), value))
            })
            .collect();

        Self {
            record_key: pick(&columns, RECORD_KEY_COLUMNS),
            room_number: pick(&columns, ROOM_NUMBER_COLUMNS),
            floor: pick(&columns, FLOOR_COLUMNS),
            building: pick(&columns, BUILDING_COLUMNS),
            building_short: pick(&columns, BUILDING_SHORT_COLUMNS),
            room_type: pick(&columns, ROOM_TYPE_COLUMNS),
            room_subtype: pick(&columns, ROOM_SUBTYPE_COLUMNS),
            department: pick(&columns, DEPARTMENT_COLUMNS),
            extra,
        }
    }

    #[must_use]
    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    #[must_use]
    pub fn with_building_short(mut self, short: impl Into<String>) -> Self {
        self.building_short = Some(short.into());
        self
    }

    #[must_use]
    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = Some(room_type.into());
        self
    }

    #[must_use]
    pub fn with_room_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.room_subtype = Some(subtype.into());
        self
    }

    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Room number and floor, if both are present
    #[must_use]
    pub fn location(&self) -> Option<(String, String)> {
        let number = self.room_number.as_deref().and_then(present)?;
        let floor = self.floor.as_deref().and_then(present)?;
        Some((number, normalize_floor(&floor)))
    }

    /// Full building name, falling back to the short name, then [`UNKNOWN_BUILDING`]
    #[must_use]
    pub fn building_name(&self) -> String {
        self.building
            .as_deref()
            .or(self.building_short.as_deref())
            .and_then(present)
            .unwrap_or_else(|| UNKNOWN_BUILDING.to_string())
    }

    /// Short building name, falling back to the full name
    #[must_use]
    pub fn building_short_name(&self) -> String {
        self.building_short
            .as_deref()
            .and_then(present)
            .unwrap_or_else(|| self.building_name())
    }

    #[must_use]
    pub fn record_key(&self) -> Option<String> {
        self.record_key.as_deref().and_then(present)
    }
}

/// One occupant roster row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantRow {
    pub record_key: Option<String>,
    pub person_name: Option<String>,
}

impl OccupantRow {
    pub fn new(record_key: impl Into<String>, person_name: impl Into<String>) -> Self {
        Self {
            record_key: Some(record_key.into()),
            person_name: Some(person_name.into()),
        }
    }

    /// Same alias priority as [`RoomRow::from_fields`]
    #[must_use]
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let columns = normalized_columns(fields);
        Self {
            record_key: pick(&columns, RECORD_KEY_COLUMNS),
            person_name: pick(&columns, PERSON_COLUMNS),
        }
    }
}

/// A canonical room in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Stable id; reassigned only by the cleanup pass
    pub id: RoomId,

    /// Facilities record number, the most reliable identity key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_key: Option<String>,

    pub room_number: String,

    /// Normalized floor label
    pub floor: String,

    pub building: String,

    pub building_short: String,

    /// Room type with abbreviations expanded
    #[serde(default)]
    pub type_full: String,

    /// Department with abbreviations expanded
    #[serde(default)]
    pub department: String,

    /// System-derived classification tags, in rule order
    #[serde(default)]
    pub category_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_link: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Room {
    pub fn new(
        id: RoomId,
        room_number: impl Into<String>,
        floor: impl Into<String>,
        building: impl Into<String>,
    ) -> Self {
        let building = building.into();
        Self {
            id,
            record_key: None,
            room_number: room_number.into(),
            floor: normalize_floor(&floor.into()),
            building_short: building.clone(),
            building,
            type_full: String::new(),
            department: String::new(),
            category_tags: Vec::new(),
            map_link: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = Some(key.into());
        self
    }

    /// Key used to decide whether two rooms are the same room
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        match &self.record_key {
            Some(key) => IdentityKey::Record(key.clone()),
            None => self.composite_key(),
        }
    }

    #[must_use]
    pub fn composite_key(&self) -> IdentityKey {
        IdentityKey::composite(&self.room_number, &self.floor, &self.building_short)
    }

    /// Floor as a number, when the label is numeric
    #[must_use]
    pub fn floor_number(&self) -> Option<u32> {
        self.floor.parse().ok()
    }

    /// Identifier sent to the collaboration backend: record key, else id
    #[must_use]
    pub fn shared_identifier(&self) -> String {
        self.record_key
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Both building names, skipping the short name when it repeats the full one
    pub fn building_names(&self) -> impl Iterator<Item = &str> {
        let short = (self.building_short != self.building).then_some(self.building_short.as_str());
        std::iter::once(self.building.as_str())
            .chain(short)
            .filter(|b| !b.is_empty())
    }
}
