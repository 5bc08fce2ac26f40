use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::VocabularyError;

/// One classification rule as stored in the vocabulary file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRuleData {
    pub pattern: String,
    pub tag: String,
    #[serde(default)]
    pub priority: u8,
}

#[derive(Debug, Clone)]
struct CategoryRule {
    pattern: Regex,
    tag: String,
}

/// Ordered pattern rules deriving category tags from room type and department
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Compile rules, case-insensitively, in file order.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::InvalidPattern` if a pattern is not a valid regex.
    pub fn compile(rules: &[CategoryRuleData]) -> Result<Self, VocabularyError> {
        let rules = rules
            .iter()
            .map(|rule| {
                let pattern = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| VocabularyError::InvalidPattern {
                        tag: rule.tag.clone(),
                        source,
                    })?;
                Ok(CategoryRule {
                    pattern,
                    tag: rule.tag.clone(),
                })
            })
            .collect::<Result<Vec<_>, VocabularyError>>()?;

        Ok(Self { rules })
    }

    /// Tags whose pattern matches either field, in rule order, without duplicates
    #[must_use]
    pub fn classify(&self, type_full: &str, department: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for rule in &self.rules {
            let hit = rule.pattern.is_match(type_full) || rule.pattern.is_match(department);
            if hit && !tags.contains(&rule.tag) {
                tags.push(rule.tag.clone());
            }
        }
        tags
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.tag.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, tag: &str) -> CategoryRuleData {
        CategoryRuleData {
            pattern: pattern.to_string(),
            tag: tag.to_string(),
            priority: 0,
        }
    }

    fn rules() -> CategoryRules {
        CategoryRules::compile(&[
            rule(r"operating|surgery|\bor\b", "surgery"),
            rule(r"toilet|bathroom|restroom", "restroom"),
            rule(r"office|admin", "administration"),
            rule(r"corridor|stair", "circulation"),
        ])
        .unwrap()
    }

    #[test]
    fn test_classify_in_rule_order() {
        let tags = rules().classify("Office", "Surgery");
        assert_eq!(tags, vec!["surgery", "administration"]);
    }

    #[test]
    fn test_word_boundary_rules() {
        let r = rules();
        assert_eq!(r.classify("Corridor", ""), vec!["circulation"]);
        assert_eq!(r.classify("OR", ""), vec!["surgery"]);
    }

    #[test]
    fn test_no_match() {
        assert!(rules().classify("", "").is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = CategoryRules::compile(&[rule("(unclosed", "bad")]).unwrap_err();
        assert!(matches!(err, VocabularyError::InvalidPattern { ref tag, .. } if tag == "bad"));
    }
}
