use serde::{Deserialize, Serialize};

/// Stable identifier for a room within a directory store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl RoomId {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Parse an id from its decimal form (as used in exported documents)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok().map(Self)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key under which two rows are considered to describe the same room.
///
/// The record key is preferred whenever the row carries one; the composite
/// key `roomNumber|floor|building` is the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Record(String),
    Composite(String),
}

impl IdentityKey {
    /// Build the composite key. Building is compared case-insensitively.
    #[must_use]
    pub fn composite(room_number: &str, floor: &str, building: &str) -> Self {
        Self::Composite(format!(
            "{}|{}|{}",
            room_number.trim(),
            floor.trim(),
            building.trim().to_lowercase()
        ))
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(key) => write!(f, "rec:{key}"),
            Self::Composite(key) => write!(f, "comp:{key}"),
        }
    }
}

/// Ordinal suffix for a floor number ("st", "nd", "rd", "th")
#[must_use]
pub fn ordinal_suffix(n: u32) -> &'static str {
    let remainder = n % 100;
    if (11..=13).contains(&remainder) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

const ORDINAL_WORDS: [&str; 15] = [
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
];

/// Word form of floors 1 through 15
#[must_use]
pub fn ordinal_word(n: u32) -> Option<&'static str> {
    let index = usize::try_from(n).ok()?.checked_sub(1)?;
    ORDINAL_WORDS.get(index).copied()
}

/// Inverse of [`ordinal_word`]
#[must_use]
pub fn ordinal_word_value(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    ORDINAL_WORDS
        .iter()
        .position(|w| *w == lower)
        .and_then(|i| u32::try_from(i + 1).ok())
}
