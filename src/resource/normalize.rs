//! Response Normalizer
//!
//! Extracts record-like objects from whatever envelope a backend wraps its
//! list responses in, and drops entries that carry no identifier.

use serde_json::{Map, Value};

/// Keys that identify a record; at least one must be present and non-null
pub const ID_KEYS: [&str; 3] = ["id", "Id", "_id"];

/// One way a backend may carry a list of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The body itself is the array
    BareArray,
    /// `{"<resource>s": [...]}`, resource name lowercased
    ResourcePlural,
    /// `{"items": [...]}`
    Items,
    /// `{"data": [...]}`
    Data,
}

/// Strategies in the order they are tried; the first one that matches wins
pub const ENVELOPES: [Envelope; 4] = [
    Envelope::BareArray,
    Envelope::ResourcePlural,
    Envelope::Items,
    Envelope::Data,
];

impl Envelope {
    /// The candidate value this strategy selects, if present and non-null
    pub fn select<'a>(&self, resource_name: &str, body: &'a Value) -> Option<&'a Value> {
        let candidate = match self {
            Self::BareArray => return body.is_array().then_some(body),
            Self::ResourcePlural => body.get(format!("{}s", resource_name.to_lowercase())),
            Self::Items => body.get("items"),
            Self::Data => body.get("data"),
        };
        candidate.filter(|v| !v.is_null())
    }
}

/// Records that survived validation plus the number discarded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<Map<String, Value>>,
    pub dropped: usize,
}

/// Extract the validated records from a raw list response
pub fn extract_records(resource_name: &str, body: &Value) -> Normalized {
    let Some((envelope, selected)) = ENVELOPES
        .iter()
        .find_map(|e| e.select(resource_name, body).map(|v| (e, v)))
    else {
        return Normalized::default();
    };

    let Some(candidates) = selected.as_array() else {
        tracing::warn!(
            "{:?} envelope for {} does not hold an array, treating as empty",
            envelope,
            resource_name
        );
        return Normalized::default();
    };

    let records: Vec<Map<String, Value>> = candidates
        .iter()
        .filter_map(|item| match as_record(item) {
            Some(record) => Some(record.clone()),
            None => {
                tracing::warn!("{} record missing ID field, skipped", resource_name);
                None
            }
        })
        .collect();

    let dropped = candidates.len() - records.len();
    if dropped > 0 {
        tracing::warn!("Filtered out {} invalid {} records", dropped, resource_name);
    }

    Normalized { records, dropped }
}

/// The object behind `item` if it carries an identifier
pub fn as_record(item: &Value) -> Option<&Map<String, Value>> {
    let map = item.as_object()?;
    has_identifier(map).then_some(map)
}

pub fn has_identifier(map: &Map<String, Value>) -> bool {
    ID_KEYS
        .iter()
        .any(|key| map.get(*key).is_some_and(|v| !v.is_null()))
}
