use crate::core::room::Room;
use crate::matching::query::{ParsedTerm, TermKind};
use crate::matching::tags::{staff_name, UnifiedTags};

/// Points for each kind of match
pub mod points {
    pub const FLOOR_EXACT: f64 = 10.0;

    pub const BUILDING_EXACT: f64 = 10.0;
    pub const BUILDING_CONTAINS_TERM: f64 = 7.0;
    pub const TERM_CONTAINS_BUILDING: f64 = 6.0;

    pub const FIELD_EXACT: f64 = 10.0;
    pub const FIELD_PARTIAL: f64 = 6.0;

    pub const ROOM_NUMBER_EXACT: f64 = 15.0;
    pub const ROOM_NUMBER_PARTIAL: f64 = 8.0;

    pub const STAFF_EXACT: f64 = 10.0;
    pub const STAFF_PARTIAL: f64 = 6.0;

    pub const TAG_EXACT: f64 = 8.0;
    pub const TAG_CONTAINS_TERM: f64 = 4.0;
    pub const TERM_CONTAINS_TAG: f64 = 3.0;
    pub const TAG_PREFIX: f64 = 3.0;
}

/// Partial matches need at least this many characters on the contained side
const MIN_PARTIAL_LEN: usize = 2;

fn long_enough(s: &str) -> bool {
    s.chars().count() >= MIN_PARTIAL_LEN
}

/// Everything about one room the scorer looks at
#[derive(Debug, Clone, Copy)]
pub struct RoomView<'a> {
    pub room: &'a Room,
    pub tags: &'a UnifiedTags,
    pub staff: &'a [String],
}

/// Score of `term` against a room; 0 means no match.
///
/// The term's value and each of its expansions are scored and the best wins.
#[must_use]
pub fn score_term(term: &ParsedTerm, view: RoomView<'_>) -> f64 {
    term.candidates()
        .map(|value| score_value(term.kind, &value.to_lowercase(), view))
        .fold(0.0, f64::max)
}

fn score_value(kind: TermKind, value: &str, view: RoomView<'_>) -> f64 {
    if value.is_empty() {
        return 0.0;
    }
    let room = view.room;
    match kind {
        TermKind::Floor => score_floor(&room.floor, value),
        TermKind::Building => room
            .building_names()
            .map(|b| score_building(&b.to_lowercase(), value))
            .fold(0.0, f64::max),
        TermKind::Department => score_field(&room.department.to_lowercase(), value),
        TermKind::RoomType => score_field(&room.type_full.to_lowercase(), value),
        TermKind::RoomNumber => score_room_number(&room.room_number.to_lowercase(), value),
        TermKind::StaffName => view
            .staff
            .iter()
            .map(|s| score_staff(&staff_name(s).to_lowercase(), value))
            .fold(0.0, f64::max),
        TermKind::General => score_general(view.tags, value),
    }
}

/// Equality, numerically when both sides are numbers ("03" == "3")
fn score_floor(floor: &str, value: &str) -> f64 {
    let equal = match (floor.trim().parse::<i64>(), value.parse::<i64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => floor.trim().eq_ignore_ascii_case(value),
    };
    if equal {
        points::FLOOR_EXACT
    } else {
        0.0
    }
}

fn score_building(building: &str, value: &str) -> f64 {
    if building.is_empty() {
        0.0
    } else if building == value {
        points::BUILDING_EXACT
    } else if building.contains(value) && long_enough(value) {
        points::BUILDING_CONTAINS_TERM
    } else if value.contains(building) && long_enough(building) {
        points::TERM_CONTAINS_BUILDING
    } else {
        0.0
    }
}

/// Department and room type: exact, or substring in either direction
fn score_field(field: &str, value: &str) -> f64 {
    if field.is_empty() {
        0.0
    } else if field == value {
        points::FIELD_EXACT
    } else if (field.contains(value) && long_enough(value))
        || (value.contains(field) && long_enough(field))
    {
        points::FIELD_PARTIAL
    } else {
        0.0
    }
}

fn score_room_number(number: &str, value: &str) -> f64 {
    if number.is_empty() {
        0.0
    } else if number == value {
        points::ROOM_NUMBER_EXACT
    } else if number.contains(value) && long_enough(value) {
        points::ROOM_NUMBER_PARTIAL
    } else {
        0.0
    }
}

fn score_staff(name: &str, value: &str) -> f64 {
    if name.is_empty() {
        0.0
    } else if name == value {
        points::STAFF_EXACT
    } else if name.contains(value) && long_enough(value) {
        points::STAFF_PARTIAL
    } else {
        0.0
    }
}

fn score_general(tags: &UnifiedTags, value: &str) -> f64 {
    if tags.contains(value) {
        return points::TAG_EXACT;
    }
    if !long_enough(value) {
        // Only reverse containment can still match a one-character term
        return tags
            .iter()
            .any(|tag| value.contains(tag) && long_enough(tag))
            .then_some(points::TERM_CONTAINS_TAG)
            .unwrap_or(0.0);
    }

    let mut best: f64 = 0.0;
    for tag in tags.iter() {
        let score = if tag.contains(value) {
            points::TAG_CONTAINS_TERM
        } else if value.contains(tag) && long_enough(tag) {
            points::TERM_CONTAINS_TAG
        } else if tag.starts_with(value) {
            points::TAG_PREFIX
        } else {
            0.0
        };
        best = best.max(score);
        if best >= points::TAG_CONTAINS_TERM {
            break;
        }
    }
    best
}

/// True when some room-number term equals the room's number exactly
#[must_use]
pub fn exact_room_number_match(terms: &[ParsedTerm], room: &Room) -> bool {
    let number = room.room_number.to_lowercase();
    !number.is_empty()
        && terms
            .iter()
            .any(|t| t.kind == TermKind::RoomNumber && t.value.to_lowercase() == number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RoomId;

    fn room() -> Room {
        let mut room = Room::new(RoomId(0), "2204", "3", "University Hospital");
        room.building_short = "UH".to_string();
        room.department = "Pediatric Cardiology".to_string();
        room.type_full = "Exam Room".to_string();
        room
    }

    fn score(kind: TermKind, value: &str, room: &Room, staff: &[String]) -> f64 {
        let tags = UnifiedTags::unify(room, &[], staff);
        let term = ParsedTerm::new(kind, value, value);
        score_term(
            &term,
            RoomView {
                room,
                tags: &tags,
                staff,
            },
        )
    }

    #[test]
    fn test_floor_score() {
        let r = room();
        assert!((score(TermKind::Floor, "3", &r, &[]) - 10.0).abs() < f64::EPSILON);
        assert!((score(TermKind::Floor, "03", &r, &[]) - 10.0).abs() < f64::EPSILON);
        assert!(score(TermKind::Floor, "4", &r, &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_building_score() {
        let r = room();
        assert!((score(TermKind::Building, "uh", &r, &[]) - 10.0).abs() < f64::EPSILON);
        assert!((score(TermKind::Building, "university", &r, &[]) - 7.0).abs() < f64::EPSILON);
        assert!(
            (score(TermKind::Building, "uh main campus", &r, &[]) - 6.0).abs() < f64::EPSILON
        );
        assert!(score(TermKind::Building, "mott", &r, &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_field_scores() {
        let r = room();
        assert!(
            (score(TermKind::Department, "pediatric cardiology", &r, &[]) - 10.0).abs()
                < f64::EPSILON
        );
        assert!((score(TermKind::Department, "cardiology", &r, &[]) - 6.0).abs() < f64::EPSILON);
        assert!((score(TermKind::RoomType, "exam", &r, &[]) - 6.0).abs() < f64::EPSILON);
        assert!(
            (score(TermKind::RoomType, "large exam room", &r, &[]) - 6.0).abs() < f64::EPSILON
        );
    }

    #[test]
    fn test_room_number_score() {
        let r = room();
        assert!((score(TermKind::RoomNumber, "2204", &r, &[]) - 15.0).abs() < f64::EPSILON);
        assert!((score(TermKind::RoomNumber, "204", &r, &[]) - 8.0).abs() < f64::EPSILON);
        assert!(score(TermKind::RoomNumber, "2", &r, &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_staff_score() {
        let r = room();
        let staff = vec!["Staff: Jane Doe".to_string()];
        assert!((score(TermKind::StaffName, "jane doe", &r, &staff) - 10.0).abs() < f64::EPSILON);
        assert!((score(TermKind::StaffName, "doe", &r, &staff) - 6.0).abs() < f64::EPSILON);
        assert!(score(TermKind::StaffName, "smith", &r, &staff).abs() < f64::EPSILON);
    }

    #[test]
    fn test_general_score_ordering() {
        let r = room();
        let exact = score(TermKind::General, "cardiology", &r, &[]);
        let prefix = score(TermKind::General, "cardio", &r, &[]);
        let substring = score(TermKind::General, "ardiol", &r, &[]);
        assert!((exact - 8.0).abs() < f64::EPSILON);
        assert!(exact >= prefix);
        assert!(prefix >= substring);
        assert!(substring > 0.0);
        assert!(score(TermKind::General, "zzz", &r, &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expansion_scores() {
        let r = room();
        let tags = UnifiedTags::unify(&r, &[], &[]);
        let mut term = ParsedTerm::new(TermKind::General, "peds", "peds");
        let view = RoomView {
            room: &r,
            tags: &tags,
            staff: &[],
        };
        assert!(score_term(&term, view).abs() < f64::EPSILON);
        term.expansions.push("pediatric".to_string());
        assert!((score_term(&term, view) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exact_room_number_match() {
        let r = room();
        let terms = vec![ParsedTerm::new(TermKind::RoomNumber, "2204", "2204")];
        assert!(exact_room_number_match(&terms, &r));
        let terms = vec![ParsedTerm::new(TermKind::General, "2204", "2204")];
        assert!(!exact_room_number_match(&terms, &r));
    }
}
