//! Free-text query parsing.
//!
//! The query is lowercased and split into tokens on whitespace and commas.
//! Ordered rules then claim tokens: floor phrases first, then building,
//! department/type and staff phrases. A claimed token is invisible to later
//! rules. Whatever is left, minus stop words, becomes room-number or general
//! terms.
//!
//! ```rust
//! use room_finder::matching::query::{QueryProcessor, TermKind};
//!
//! let terms = QueryProcessor::new().parse("3rd floor mott cardiology");
//! assert_eq!(terms[0].kind, TermKind::Floor);
//! assert_eq!(terms[0].value, "3");
//! assert_eq!(terms.len(), 3);
//! ```

use serde::Serialize;
use std::fmt;

use crate::core::types::ordinal_word_value;
use crate::vocab::AbbreviationResolver;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "in", "at", "on", "of", "for", "to", "with", "by",
];

const BUILDING_WORDS: &[&str] = &["building", "bldg"];

/// What a parsed term is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TermKind {
    Floor,
    Building,
    Department,
    RoomType,
    StaffName,
    RoomNumber,
    General,
}

impl TermKind {
    /// Multiplier applied to this kind's match score
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Self::Floor => 2.0,
            Self::Building => 1.5,
            Self::Department | Self::RoomType => 1.3,
            Self::StaffName => 1.2,
            Self::RoomNumber => 3.0,
            Self::General => 1.0,
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Floor => "floor",
            Self::Building => "building",
            Self::Department => "department",
            Self::RoomType => "roomType",
            Self::StaffName => "staffName",
            Self::RoomNumber => "roomNumber",
            Self::General => "general",
        };
        write!(f, "{name}")
    }
}

/// One typed, weighted piece of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTerm {
    pub kind: TermKind,
    /// Lowercased value to match
    pub value: String,
    /// Query text the term was parsed from
    pub raw_text: String,
    pub weight: f64,
    /// Abbreviation expansions also tried when scoring
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expansions: Vec<String>,
}

impl ParsedTerm {
    pub fn new(kind: TermKind, value: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            raw_text: raw_text.into(),
            weight: kind.weight(),
            expansions: Vec::new(),
        }
    }

    /// The value followed by its expansions
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.value.as_str()).chain(self.expansions.iter().map(String::as_str))
    }
}

/// Query tokens with a claimed flag per token
struct Tokens {
    items: Vec<String>,
    claimed: Vec<bool>,
}

impl Tokens {
    fn new(query: &str) -> Self {
        let items: Vec<String> = query
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let claimed = vec![false; items.len()];
        Self { items, claimed }
    }

    /// Token at `i` if it exists and is unclaimed
    fn free(&self, i: usize) -> Option<&str> {
        match self.claimed.get(i) {
            Some(false) => self.items.get(i).map(String::as_str),
            _ => None,
        }
    }

    fn claim(&mut self, start: usize, len: usize) -> String {
        for flag in &mut self.claimed[start..start + len] {
            *flag = true;
        }
        self.items[start..start + len].join(" ")
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn unclaimed(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .zip(&self.claimed)
            .filter(|(_, claimed)| !**claimed)
            .map(|(t, _)| t.as_str())
    }
}

/// A rule inspects the tokens at a position and returns `(span, value)`
type Rule = fn(&Tokens, usize) -> Option<(usize, String)>;

const FLOOR_RULES: &[Rule] = &[
    floor_keyword,
    numbered_floor,
    level_keyword,
    f_prefix,
    ordinal_word_floor,
];
const BUILDING_RULES: &[Rule] = &[building_keyword, in_at_building];
const DEPARTMENT_RULES: &[Rule] = &[department_keyword];
const ROOM_TYPE_RULES: &[Rule] = &[room_type_keyword];
const STAFF_RULES: &[Rule] = &[staff_keyword, title_keyword];

enum Keyword<'s> {
    /// The keyword alone; its value is the next token
    Bare,
    /// Value glued on: "building:mott", "floor3"
    Attached(&'s str),
}

fn match_keyword<'s>(token: &'s str, keywords: &[&str], glued_digits: bool) -> Option<Keyword<'s>> {
    for keyword in keywords {
        let Some(rest) = token.strip_prefix(keyword) else {
            continue;
        };
        if rest.is_empty() {
            return Some(Keyword::Bare);
        }
        if let Some(value) = rest.strip_prefix([':', '-', '.']) {
            return Some(if value.is_empty() {
                Keyword::Bare
            } else {
                Keyword::Attached(value)
            });
        }
        if glued_digits && rest.chars().all(|c| c.is_ascii_digit()) {
            return Some(Keyword::Attached(rest));
        }
    }
    None
}

/// Canonical decimal form of an all-digit string ("03" -> "3")
fn number(s: &str) -> Option<String> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok().map(|n| n.to_string())
}

/// "3", "3rd", "21st"
fn ordinal_number(s: &str) -> Option<String> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .unwrap_or(s);
    number(digits)
}

/// Keyword followed by a number, glued or as the next token
fn numeric_keyword(tokens: &Tokens, i: usize, keywords: &[&str]) -> Option<(usize, String)> {
    match match_keyword(tokens.free(i)?, keywords, true)? {
        Keyword::Attached(value) => number(value).map(|n| (1, n)),
        Keyword::Bare => number(tokens.free(i + 1)?).map(|n| (2, n)),
    }
}

/// Keyword followed by a word, glued with a separator or as the next token
fn text_keyword(tokens: &Tokens, i: usize, keywords: &[&str]) -> Option<(usize, String)> {
    match match_keyword(tokens.free(i)?, keywords, false)? {
        Keyword::Attached(value) => Some((1, value.to_string())),
        Keyword::Bare => tokens.free(i + 1).map(|v| (2, v.to_string())),
    }
}

fn floor_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    numeric_keyword(tokens, i, &["floor"])
}

/// "3rd floor", "3 floor", "3rdfloor"
fn numbered_floor(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    let token = tokens.free(i)?;
    if let Some(n) = token.strip_suffix("floor").and_then(ordinal_number) {
        return Some((1, n));
    }
    let n = ordinal_number(token)?;
    (tokens.free(i + 1)? == "floor").then_some((2, n))
}

fn level_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    numeric_keyword(tokens, i, &["level", "lv"])
}

fn f_prefix(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    numeric_keyword(tokens, i, &["f"])
}

/// "third floor", "second level"
fn ordinal_word_floor(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    let n = ordinal_word_value(tokens.free(i)?)?;
    matches!(tokens.free(i + 1)?, "floor" | "level").then(|| (2, n.to_string()))
}

fn building_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    text_keyword(tokens, i, BUILDING_WORDS)
}

/// "in mott", "at cancer center building". The value runs until a building
/// word, a claimed token, a room-number-like token or the end of the query.
fn in_at_building(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    if !matches!(tokens.free(i)?, "in" | "at") {
        return None;
    }

    let mut words = Vec::new();
    let mut end = i + 1;
    while let Some(token) = tokens.free(end) {
        if BUILDING_WORDS.contains(&token) {
            if words.is_empty() {
                return None;
            }
            end += 1;
            break;
        }
        if is_room_number(token) {
            break;
        }
        words.push(token);
        end += 1;
    }

    if words.is_empty() {
        return None;
    }
    Some((end - i, words.join(" ")))
}

fn department_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    text_keyword(tokens, i, &["department", "dept"])
}

/// "type office", "type:office", "room type office", "roomtype:office"
fn room_type_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    if tokens.free(i)? == "room" {
        if let Some((span, value)) = text_keyword(tokens, i + 1, &["type"]) {
            return Some((span + 1, value));
        }
    }
    text_keyword(tokens, i, &["roomtype", "type"])
}

fn staff_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    text_keyword(tokens, i, &["staff", "person", "occupant"])
}

fn title_keyword(tokens: &Tokens, i: usize) -> Option<(usize, String)> {
    text_keyword(tokens, i, &["doctor", "dr", "professor", "prof"])
}

/// `^\d+[a-z]?$` or `^[a-z]\d+$`
fn is_room_number(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    let Some((&last, head)) = chars.split_last() else {
        return false;
    };

    let digits_then_letter = if last.is_ascii_alphabetic() {
        !head.is_empty() && head.iter().all(char::is_ascii_digit)
    } else {
        chars.iter().all(char::is_ascii_digit)
    };

    let letter_then_digits = chars.len() > 1
        && chars[0].is_ascii_alphabetic()
        && chars[1..].iter().all(char::is_ascii_digit);

    digits_then_letter || letter_then_digits
}

/// Parses free-text queries into [`ParsedTerm`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryProcessor<'a> {
    abbreviations: Option<&'a AbbreviationResolver>,
}

impl<'a> QueryProcessor<'a> {
    /// A processor without abbreviation expansion
    #[must_use]
    pub fn new() -> Self {
        Self {
            abbreviations: None,
        }
    }

    /// Attach expansions of known codes to general, department and type terms
    #[must_use]
    pub fn with_abbreviations(abbreviations: &'a AbbreviationResolver) -> Self {
        Self {
            abbreviations: Some(abbreviations),
        }
    }

    /// Parse a query. An empty or all-stop-word query yields no terms.
    #[must_use]
    pub fn parse(&self, query: &str) -> Vec<ParsedTerm> {
        let mut tokens = Tokens::new(query);
        let mut terms = Vec::new();

        let passes: [(&[Rule], TermKind); 5] = [
            (FLOOR_RULES, TermKind::Floor),
            (BUILDING_RULES, TermKind::Building),
            (DEPARTMENT_RULES, TermKind::Department),
            (ROOM_TYPE_RULES, TermKind::RoomType),
            (STAFF_RULES, TermKind::StaffName),
        ];

        for (rules, kind) in passes {
            for rule in rules {
                let mut i = 0;
                while i < tokens.len() {
                    match rule(&tokens, i) {
                        Some((span, value)) => {
                            let raw = tokens.claim(i, span);
                            terms.push(self.term(kind, value, raw));
                            i += span;
                        }
                        None => i += 1,
                    }
                }
            }
        }

        let remaining: Vec<String> = tokens
            .unclaimed()
            .filter(|t| !STOP_WORDS.contains(t))
            .map(str::to_string)
            .collect();

        for token in remaining {
            let kind = if is_room_number(&token) {
                TermKind::RoomNumber
            } else {
                TermKind::General
            };
            terms.push(self.term(kind, token.clone(), token));
        }

        terms
    }

    fn term(&self, kind: TermKind, value: String, raw: String) -> ParsedTerm {
        let mut term = ParsedTerm::new(kind, value, raw);
        let expandable = matches!(
            kind,
            TermKind::General | TermKind::Department | TermKind::RoomType
        );
        if let (true, Some(abbreviations)) = (expandable, self.abbreviations) {
            if let Some(expansion) = abbreviations.expand_query_word(&term.value) {
                term.expansions.push(expansion.to_string());
            }
        }
        term
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> Vec<(TermKind, String)> {
        QueryProcessor::new()
            .parse(query)
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    fn term(kind: TermKind, value: &str) -> (TermKind, String) {
        (kind, value.to_string())
    }

    #[test]
    fn test_empty_query() {
        assert!(parse("").is_empty());
        assert!(parse("   , ").is_empty());
        assert!(parse("the and of").is_empty());
    }

    #[test]
    fn test_floor_forms() {
        for query in [
            "floor 3", "floor3", "floor-3", "3rd floor", "3 floor", "level 3", "lv3", "f3",
            "f-3", "f 3", "third floor", "third level", "floor 03",
        ] {
            assert_eq!(parse(query), vec![term(TermKind::Floor, "3")], "query: {query}");
        }
    }

    #[test]
    fn test_floor_weight() {
        let terms = QueryProcessor::new().parse("2nd floor");
        assert!((terms[0].weight - 2.0).abs() < f64::EPSILON);
        assert_eq!(terms[0].raw_text, "2nd floor");
    }

    #[test]
    fn test_building_forms() {
        assert_eq!(parse("building mott"), vec![term(TermKind::Building, "mott")]);
        assert_eq!(parse("bldg:mott"), vec![term(TermKind::Building, "mott")]);
        assert_eq!(parse("in mott building"), vec![term(TermKind::Building, "mott")]);
        assert_eq!(
            parse("at cancer center"),
            vec![term(TermKind::Building, "cancer center")]
        );
    }

    #[test]
    fn test_in_stops_before_room_number() {
        assert_eq!(
            parse("in mott 204"),
            vec![term(TermKind::Building, "mott"), term(TermKind::RoomNumber, "204")]
        );
    }

    #[test]
    fn test_department_and_type() {
        assert_eq!(parse("dept cardiology"), vec![term(TermKind::Department, "cardiology")]);
        assert_eq!(parse("department:radiology"), vec![term(TermKind::Department, "radiology")]);
        assert_eq!(parse("type office"), vec![term(TermKind::RoomType, "office")]);
        assert_eq!(parse("room type lab"), vec![term(TermKind::RoomType, "lab")]);
    }

    #[test]
    fn test_staff_forms() {
        assert_eq!(parse("dr smith"), vec![term(TermKind::StaffName, "smith")]);
        assert_eq!(parse("dr. smith"), vec![term(TermKind::StaffName, "smith")]);
        assert_eq!(parse("staff:jones"), vec![term(TermKind::StaffName, "jones")]);
        assert_eq!(parse("professor lee"), vec![term(TermKind::StaffName, "lee")]);
    }

    #[test]
    fn test_priority_claims_tokens() {
        assert_eq!(
            parse("3rd floor mott cardiology"),
            vec![
                term(TermKind::Floor, "3"),
                term(TermKind::General, "mott"),
                term(TermKind::General, "cardiology"),
            ]
        );
    }

    #[test]
    fn test_room_numbers() {
        assert_eq!(parse("204"), vec![term(TermKind::RoomNumber, "204")]);
        assert_eq!(parse("204A"), vec![term(TermKind::RoomNumber, "204a")]);
        assert_eq!(parse("b12"), vec![term(TermKind::RoomNumber, "b12")]);
        assert_eq!(parse("ab12"), vec![term(TermKind::General, "ab12")]);
        assert_eq!(parse("204, 205"), vec![
            term(TermKind::RoomNumber, "204"),
            term(TermKind::RoomNumber, "205"),
        ]);
    }

    #[test]
    fn test_is_room_number() {
        assert!(is_room_number("1"));
        assert!(is_room_number("12b"));
        assert!(is_room_number("f12"));
        assert!(!is_room_number("a"));
        assert!(!is_room_number("12bc"));
        assert!(!is_room_number(""));
    }

    #[test]
    fn test_expansions_attached() {
        let resolver = AbbreviationResolver::new(
            [("ICU".to_string(), "Intensive Care Unit".to_string())],
            Vec::new(),
        );
        let terms = QueryProcessor::with_abbreviations(&resolver).parse("icu 204");
        assert_eq!(terms[0].expansions, vec!["intensive care unit"]);
        assert!(terms[1].expansions.is_empty());
    }
}
