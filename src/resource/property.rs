//! Property Model
//!
//! Describes one remote field of a resource's records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a remote field, as reported by the schema endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    #[default]
    String,
    Number,
    Boolean,
    Datetime,
    Date,
    Uuid,
    Mixed,
    Id,
    Other(String),
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Date => "date",
            Self::Uuid => "uuid",
            Self::Mixed => "mixed",
            Self::Id => "id",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for PropertyType {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "datetime" => Self::Datetime,
            "date" => Self::Date,
            "uuid" => Self::Uuid,
            "mixed" => Self::Mixed,
            "id" => Self::Id,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<PropertyType> for String {
    fn from(t: PropertyType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One described field of a resource. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    path: String,
    #[serde(rename = "type")]
    kind: PropertyType,
    #[serde(rename = "isId")]
    is_id: bool,
}

impl Property {
    pub fn new(path: impl Into<String>, kind: impl Into<PropertyType>, is_id: bool) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            is_id,
        }
    }

    /// The single-property list used when a schema cannot be loaded
    pub fn fallback() -> Vec<Property> {
        vec![Property::new("id", PropertyType::String, true)]
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &PropertyType {
        &self.kind
    }

    pub fn is_id(&self) -> bool {
        self.is_id
    }
}
