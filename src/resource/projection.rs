//! Admin properties projection
//!
//! Derives per-field display directives from a property list. Cheap and
//! I/O free, so it is recomputed on every call.

use super::property::{Property, PropertyType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Paths that become the record's display title
const TITLE_PATHS: &[&str] = &["name", "title", "email"];

/// Which views show a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub list: bool,
    pub filter: bool,
    pub show: bool,
    pub edit: bool,
}

impl Visibility {
    const ALL: Self = Self {
        list: true,
        filter: true,
        show: true,
        edit: true,
    };

    const READ_ONLY: Self = Self {
        edit: false,
        ..Self::ALL
    };
}

/// Display directives for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDirectives {
    pub is_title: bool,
    pub is_visible: Visibility,
    pub is_editable: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyType>,
}

/// Build the projection for `properties`, keyed by path
pub fn project(properties: &[Property]) -> BTreeMap<String, PropertyDirectives> {
    properties
        .iter()
        .map(|prop| (prop.path().to_string(), directives_for(prop)))
        .collect()
}

fn directives_for(prop: &Property) -> PropertyDirectives {
    let path = prop.path();
    let datetime = *prop.kind() == PropertyType::Datetime || path.contains("date");
    let read_only = prop.is_id() || path == "id" || datetime;

    PropertyDirectives {
        is_title: TITLE_PATHS.contains(&path),
        is_visible: if read_only {
            Visibility::READ_ONLY
        } else {
            Visibility::ALL
        },
        is_editable: !(prop.is_id() || datetime),
        kind: datetime.then_some(PropertyType::Datetime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_and_title() {
        let config = project(&[
            Property::new("id", "string", true),
            Property::new("name", "string", false),
        ]);

        assert_eq!(config.len(), 2);
        assert!(!config["id"].is_visible.edit);
        assert!(config["id"].is_visible.list);
        assert!(!config["id"].is_editable);
        assert!(config["name"].is_title);
        assert!(config["name"].is_editable);
        assert_eq!(config["name"].is_visible, Visibility::ALL);
    }

    #[test]
    fn test_datetime_fields_are_read_only() {
        let config = project(&[
            Property::new("created", "datetime", false),
            Property::new("date_updated", "string", false),
        ]);

        for path in ["created", "date_updated"] {
            let d = &config[path];
            assert!(!d.is_editable, "{} should be read-only", path);
            assert!(!d.is_visible.edit);
            assert!(d.is_visible.show && d.is_visible.filter);
            assert_eq!(d.kind, Some(PropertyType::Datetime));
        }
    }

    #[test]
    fn test_unflagged_id_path_is_hidden_from_edit_only() {
        let config = project(&[Property::new("id", "number", false)]);
        assert!(!config["id"].is_visible.edit);
        assert!(config["id"].is_editable);
    }

    #[test]
    fn test_serializes_with_host_field_names() {
        let config = project(&[Property::new("email", "string", false)]);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["email"]["isTitle"], true);
        assert_eq!(value["email"]["isVisible"]["edit"], true);
        assert!(value["email"].get("type").is_none());
    }
}
