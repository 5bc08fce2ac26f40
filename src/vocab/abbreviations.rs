use std::collections::{BTreeMap, HashMap};

/// Codes that fell through every lookup table, with the number of times seen
pub type UnresolvedCodes = BTreeMap<String, usize>;

/// Expands facilities short codes ("CARDIO", "Off") to display names
#[derive(Debug, Clone, Default)]
pub struct AbbreviationResolver {
    /// Static table, exact-case keys
    table: HashMap<String, String>,

    /// User-supplied overrides, consulted before the static table
    overrides: HashMap<String, String>,

    /// "<type> <subtype>" -> display name
    full_replacements: HashMap<String, String>,

    /// Lowercased view of overrides + table for query-time expansion
    lowercase: HashMap<String, String>,
}

impl AbbreviationResolver {
    pub fn new(
        table: impl IntoIterator<Item = (String, String)>,
        full_replacements: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut resolver = Self {
            table: table.into_iter().collect(),
            overrides: HashMap::new(),
            full_replacements: full_replacements.into_iter().collect(),
            lowercase: HashMap::new(),
        };
        resolver.rebuild_lowercase();
        resolver
    }

    /// Layer a user override map on top of the static table
    #[must_use]
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        self.overrides.extend(
            overrides
                .into_iter()
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty()),
        );
        self.rebuild_lowercase();
        self
    }

    fn rebuild_lowercase(&mut self) {
        self.lowercase.clear();
        // Overrides last so they win on lowercase collisions
        for (code, name) in self.table.iter().chain(self.overrides.iter()) {
            self.lowercase.insert(code.to_lowercase(), name.to_lowercase());
        }
    }

    /// Resolve a code: overrides, then the static table, then the code itself.
    ///
    /// A non-blank code that falls through to itself is counted in `unresolved`.
    pub fn resolve(&self, code: &str, unresolved: &mut UnresolvedCodes) -> String {
        let code = code.trim();
        if let Some(name) = self.lookup(code) {
            return name.to_string();
        }
        if !code.is_empty() {
            *unresolved.entry(code.to_string()).or_default() += 1;
        }
        code.to_string()
    }

    /// Resolve without recording misses
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.overrides
            .get(code)
            .or_else(|| self.table.get(code))
            .map(String::as_str)
    }

    /// Compose the display room type from type and subtype codes.
    ///
    /// Both codes are resolved first. A full-replacement hit on the resolved
    /// `"<type> <subtype>"` wins, then a hit on the raw codes; otherwise the
    /// resolved type, `"type - subtype"` when both differ, or the subtype alone.
    pub fn compose_type(
        &self,
        type_code: Option<&str>,
        subtype_code: Option<&str>,
        unresolved: &mut UnresolvedCodes,
    ) -> String {
        let type_code = type_code.unwrap_or("").trim();
        let subtype_code = subtype_code.unwrap_or("").trim();

        let room_type = self.resolve(type_code, unresolved);
        let subtype = self.resolve(subtype_code, unresolved);

        let resolved_key = format!("{room_type} {subtype}");
        let raw_key = format!("{type_code} {subtype_code}");
        if let Some(name) = self
            .full_replacements
            .get(resolved_key.trim())
            .or_else(|| self.full_replacements.get(raw_key.trim()))
        {
            return name.clone();
        }

        match (room_type.is_empty(), subtype.is_empty()) {
            (_, true) => room_type,
            (true, false) => subtype,
            (false, false) if room_type.eq_ignore_ascii_case(&subtype) => room_type,
            (false, false) => format!("{room_type} - {subtype}"),
        }
    }

    /// Lowercase expansion of a query word, if it is a known code.
    ///
    /// Numeric words and single characters are never expanded.
    #[must_use]
    pub fn expand_query_word(&self, word: &str) -> Option<&str> {
        let word = word.trim();
        if word.chars().count() < 2 || word.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.lowercase
            .get(&word.to_lowercase())
            .map(String::as_str)
            .filter(|expansion| *expansion != word.to_lowercase())
    }

    /// Display names of every code, used to seed the known-word list
    pub fn expansions(&self) -> impl Iterator<Item = &str> {
        self.table
            .values()
            .chain(self.overrides.values())
            .chain(self.full_replacements.values())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
