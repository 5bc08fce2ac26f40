//! Domain vocabulary: abbreviation expansion, spelling correction and
//! category classification.
//!
//! The tables ship in `data/vocabulary.json`, compiled into the binary and
//! validated by `build.rs`. They are loaded once into immutable lookup
//! structures:
//!
//! - [`AbbreviationResolver`]: facilities codes to display names
//! - [`SpellCorrector`]: misspelling table plus edit-distance fallback
//! - [`CategoryRules`]: ordered patterns producing category tags
//!
//! ## Example
//!
//! ```rust
//! use room_finder::vocab::{UnresolvedCodes, Vocabulary};
//!
//! let vocab = Vocabulary::load_embedded().unwrap();
//! let mut unresolved = UnresolvedCodes::new();
//! assert_eq!(vocab.abbreviations.resolve("CARDIO", &mut unresolved), "Cardiology");
//! assert_eq!(vocab.spelling.correct("cardioligy"), "cardiology");
//! ```

pub mod abbreviations;
pub mod categories;
pub mod spelling;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub use abbreviations::{AbbreviationResolver, UnresolvedCodes};
pub use categories::{CategoryRuleData, CategoryRules};
pub use spelling::{edit_distance, SpellCorrector};

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse vocabulary: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid pattern for category '{tag}': {source}")]
    InvalidPattern {
        tag: String,
        #[source]
        source: regex::Error,
    },
}

/// Vocabulary file version for compatibility checking
pub const VOCABULARY_VERSION: &str = "1.0.0";

/// The four misspelling sub-dictionaries, merged at load time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MisspellingTables {
    #[serde(default)]
    pub specialties: BTreeMap<String, String>,
    #[serde(default)]
    pub procedures: BTreeMap<String, String>,
    #[serde(default)]
    pub conditions: BTreeMap<String, String>,
    #[serde(default)]
    pub anatomy: BTreeMap<String, String>,
}

impl MisspellingTables {
    /// All pairs; later dictionaries win on key collisions
    pub fn merged(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.specialties
            .iter()
            .chain(&self.procedures)
            .chain(&self.conditions)
            .chain(&self.anatomy)
            .map(|(k, v)| (k.clone(), v.clone()))
    }
}

/// Serializable vocabulary format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyData {
    pub version: String,
    pub abbreviations: BTreeMap<String, String>,
    #[serde(default)]
    pub full_replacements: BTreeMap<String, String>,
    #[serde(default)]
    pub misspellings: MisspellingTables,
    #[serde(default)]
    pub category_rules: Vec<CategoryRuleData>,
}

/// Loaded, immutable vocabulary
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub abbreviations: AbbreviationResolver,
    pub spelling: SpellCorrector,
    pub categories: CategoryRules,
}

impl Vocabulary {
    /// Load the embedded vocabulary
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded file fails to parse, which `build.rs` prevents.
    pub fn load_embedded() -> Result<Self, VocabularyError> {
        const EMBEDDED_VOCABULARY: &str = include_str!("../../data/vocabulary.json");
        Self::from_json(EMBEDDED_VOCABULARY)
    }

    /// Load a vocabulary from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, VocabularyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a vocabulary from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError` on malformed JSON or an invalid category pattern.
    pub fn from_json(json: &str) -> Result<Self, VocabularyError> {
        let data: VocabularyData = serde_json::from_str(json)?;

        if data.version != VOCABULARY_VERSION {
            tracing::warn!(
                "Vocabulary version mismatch (expected {}, found {})",
                VOCABULARY_VERSION,
                data.version
            );
        }

        Self::from_data(data)
    }

    /// # Errors
    ///
    /// Returns `VocabularyError::InvalidPattern` on an invalid category pattern.
    pub fn from_data(data: VocabularyData) -> Result<Self, VocabularyError> {
        let categories = CategoryRules::compile(&data.category_rules)?;
        let abbreviations =
            AbbreviationResolver::new(data.abbreviations, data.full_replacements);
        let spelling = SpellCorrector::new(
            data.misspellings.merged(),
            known_words(&abbreviations, &categories),
        );

        Ok(Self {
            abbreviations,
            spelling,
            categories,
        })
    }

    /// Replace the abbreviation layer with one carrying user overrides.
    ///
    /// The spelling corrector is rebuilt so override names count as known words.
    #[must_use]
    pub fn with_overrides(self, overrides: BTreeMap<String, String>) -> Self {
        let abbreviations = self.abbreviations.with_overrides(overrides);
        let spelling = self
            .spelling
            .with_known_words(known_words(&abbreviations, &self.categories));
        Self {
            abbreviations,
            spelling,
            categories: self.categories,
        }
    }

    /// Load an override file: a JSON object mapping code to display name
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError` if the file cannot be read or is not a string map.
    pub fn load_overrides(path: &Path) -> Result<BTreeMap<String, String>, VocabularyError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Keywords the query parser recognizes; "level" is one edit from "lever"
const QUERY_KEYWORDS: &[&str] = &[
    "floor",
    "level",
    "building",
    "department",
    "roomtype",
    "staff",
    "person",
    "occupant",
    "doctor",
    "professor",
];

/// Words of expansions, category tags and query keywords, which are spelled
/// correctly by definition
fn known_words(abbreviations: &AbbreviationResolver, categories: &CategoryRules) -> Vec<String> {
    abbreviations
        .expansions()
        .chain(categories.tags())
        .chain(QUERY_KEYWORDS.iter().copied())
        .flat_map(|phrase| {
            phrase
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .collect()
}
