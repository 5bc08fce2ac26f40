use std::collections::HashSet;

use crate::core::annotation::CustomTag;
use crate::core::room::Room;
use crate::core::types::{ordinal_suffix, ordinal_word};

/// Prefix some extracts put in front of occupant names
const STAFF_PREFIX: &str = "Staff: ";

/// Normalized, de-duplicated search tokens for one room.
///
/// Tags keep the order they were derived in, which makes suggestion output
/// and debugging stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedTags {
    tags: Vec<String>,
    seen: HashSet<String>,
}

impl UnifiedTags {
    /// Derive the tag set for `room` from its attributes and current annotations
    #[must_use]
    pub fn unify(room: &Room, custom_tags: &[CustomTag], staff_tags: &[String]) -> Self {
        let mut tags = Self::default();

        for building in room.building_names() {
            let building = building.to_lowercase();
            tags.push(&building);
            tags.push(&format!("building:{building}"));
            tags.push(&format!("bldg:{building}"));
            tags.push_words(&building, &[' ', '-'], 1);
        }

        tags.push_floor(&room.floor);

        if !room.department.is_empty() {
            let department = room.department.to_lowercase();
            tags.push(&department);
            tags.push(&format!("department:{department}"));
            tags.push(&format!("dept:{department}"));
            tags.push_words(&department, &[' ', '-', '/'], 2);
        }

        if !room.type_full.is_empty() {
            let room_type = room.type_full.to_lowercase();
            tags.push(&room_type);
            tags.push(&format!("type:{room_type}"));
            tags.push(&format!("room:{room_type}"));
            tags.push_words(&room_type, &[' ', '-', '/'], 2);
        }

        for category in &room.category_tags {
            let category = category.to_lowercase();
            tags.push(&category);
            tags.push(&format!("category:{category}"));
            tags.push_words(&category, &[' ', '-'], 2);
        }

        for tag in custom_tags {
            let name = tag.name.trim().to_lowercase();
            if !name.is_empty() {
                tags.push(&name);
                tags.push(&format!("custom:{name}"));
                tags.push_words(&name, &[' '], 1);
            }
            if !tag.kind.is_empty() {
                tags.push(&format!("tagtype:{}", tag.kind.to_lowercase()));
            }
            if !tag.color.is_empty() {
                tags.push(&format!("color:{}", tag.color.to_lowercase()));
            }
        }

        for staff in staff_tags {
            let name = staff_name(staff).to_lowercase();
            if name.is_empty() {
                continue;
            }
            tags.push(&name);
            tags.push(&format!("staff:{name}"));
            tags.push(&format!("person:{name}"));
            tags.push(&format!("occupant:{name}"));
            tags.push_words(&name, &[' '], 1);
        }

        tags.push_room_number(&room.room_number);

        tags
    }

    fn push(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && self.seen.insert(tag.to_string()) {
            self.tags.push(tag.to_string());
        }
    }

    /// Push the words of `value` longer than `min_len` characters
    fn push_words(&mut self, value: &str, separators: &[char], min_len: usize) {
        for word in value
            .split(|c: char| separators.contains(&c) || c.is_whitespace())
            .filter(|w| w.chars().count() > min_len)
        {
            self.push(word);
        }
    }

    fn push_floor(&mut self, floor: &str) {
        if floor.is_empty() {
            return;
        }
        self.push(floor);
        self.push(&format!("floor:{floor}"));
        self.push(&format!("f{floor}"));
        self.push(&format!("level:{floor}"));
        self.push(&format!("floor {floor}"));
        self.push(&format!("level {floor}"));

        if let Ok(n) = floor.parse::<u32>() {
            self.push(&format!("{n}{} floor", ordinal_suffix(n)));
            if let Some(word) = ordinal_word(n) {
                self.push(&format!("{word} floor"));
                self.push(&format!("{word} level"));
            }
        }
    }

    /// Full number, namespaced forms and every prefix of two or more characters
    fn push_room_number(&mut self, number: &str) {
        let number = number.trim().to_lowercase();
        if number.is_empty() {
            return;
        }
        self.push(&number);
        self.push(&format!("room:{number}"));
        self.push(&format!("number:{number}"));

        let chars: Vec<char> = number.chars().collect();
        if chars.len() > 2 {
            for end in 2..=chars.len() {
                self.push(&chars[..end].iter().collect::<String>());
            }
        }
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.seen.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}

/// Display name of a staff tag without any "Staff: " prefix
#[must_use]
pub fn staff_name(tag: &str) -> &str {
    tag.trim().strip_prefix(STAFF_PREFIX).unwrap_or(tag.trim()).trim()
}
