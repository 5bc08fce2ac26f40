use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TAG_KIND: &str = "simple";
pub const DEFAULT_TAG_COLOR: &str = "blue";

/// A user-added tag with optional rich metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTag {
    pub name: String,

    /// Free-form tag type ("simple", "equipment", ...)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Persisted to the collaboration backend
    #[serde(default, rename = "isShared")]
    pub shared: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

fn default_kind() -> String {
    DEFAULT_TAG_KIND.to_string()
}

fn default_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CustomTag {
    /// Plain tag with default kind and color
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            kind: default_kind(),
            description: None,
            link: None,
            contact: None,
            image_url: None,
            color: default_color(),
            created_at: Utc::now(),
            shared: false,
            created_by: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        if !kind.trim().is_empty() {
            self.kind = kind.trim().to_string();
        }
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        if !color.trim().is_empty() {
            self.color = color.trim().to_string();
        }
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = non_blank(description);
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = non_blank(link);
        self
    }

    #[must_use]
    pub fn with_contact(mut self, contact: Option<String>) -> Self {
        self.contact = non_blank(contact);
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = non_blank(image_url);
        self
    }

    /// Whether the tag carries anything beyond a name and the defaults
    #[must_use]
    pub fn is_rich(&self) -> bool {
        self.kind != DEFAULT_TAG_KIND
            || self.color != DEFAULT_TAG_COLOR
            || self.description.is_some()
            || self.link.is_some()
            || self.contact.is_some()
            || self.image_url.is_some()
    }

    /// Case-insensitive name comparison used for uniqueness per room
    #[must_use]
    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.trim().to_lowercase()
    }
}

/// A room annotation: either a staff display name or a custom tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Annotation {
    Staff { name: String },
    Custom(CustomTag),
}

impl Annotation {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Staff { name } => name,
            Self::Custom(tag) => &tag.name,
        }
    }
}
