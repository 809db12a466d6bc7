//! Query Translator
//!
//! Turns a filter map plus pagination options into list URL query
//! parameters. Pure: no I/O, same inputs give the same URL.
//!
//! Sort options are accepted but never forwarded; the backend is not trusted
//! to support arbitrary sort fields.

use serde_json::Value;
use url::Url;

/// Value side of one filter entry
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Value),
    Range {
        from: Option<String>,
        to: Option<String>,
    },
}

impl FilterValue {
    pub fn range(from: Option<&str>, to: Option<&str>) -> Self {
        Self::Range {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }
}

impl From<Value> for FilterValue {
    /// Objects are read as `{from?, to?}` ranges, everything else as a scalar
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Range {
                from: map.get("from").and_then(scalar_text),
                to: map.get("to").and_then(scalar_text),
            },
            other => Self::Scalar(other),
        }
    }
}

/// Per-call predicate map: field path to value
///
/// Keeps insertion order; inserting an existing path replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(String, FilterValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<FilterValue>) {
        let path = path.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((path, value)),
        }
    }

    /// Builder form of [`Filter::insert`] for an equality match
    pub fn equals(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(path, FilterValue::Scalar(value.into()));
        self
    }

    pub fn range(mut self, path: impl Into<String>, from: Option<&str>, to: Option<&str>) -> Self {
        self.insert(path, FilterValue::range(from, to));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (path, value) in iter {
            filter.insert(path, value);
        }
        filter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub sort_by: String,
    pub direction: SortDirection,
}

/// Pagination and sort options for one list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub sort: Option<Sort>,
}

impl QueryOptions {
    pub fn paginated(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            sort: None,
        }
    }
}

/// Build the list URL for `base`
pub fn build_list_url(base: &Url, filter: &Filter, options: &QueryOptions) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();

    if let Some(limit) = options.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = options.offset {
        pairs.push(("offset".to_string(), offset.to_string()));
    }
    if let Some(sort) = &options.sort {
        tracing::debug!("Sort by '{}' is not forwarded to the backend", sort.sort_by);
    }

    for (path, value) in filter.iter() {
        match value {
            FilterValue::Range { from, to } => {
                if let Some(from) = from.as_deref().filter(|s| !s.is_empty()) {
                    pairs.push((format!("{}_from", path), from.to_string()));
                }
                if let Some(to) = to.as_deref().filter(|s| !s.is_empty()) {
                    pairs.push((format!("{}_to", path), to.to_string()));
                }
            }
            FilterValue::Scalar(value) => {
                if let Some(text) = scalar_text(value) {
                    pairs.push((path.to_string(), text));
                }
            }
        }
    }

    let mut url = base.clone();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// Query-string text for a scalar; `None` for null and the empty string
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| scalar_text(v).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("http://api.local/api/v1/users").unwrap()
    }

    #[test]
    fn test_no_options_leaves_url_untouched() {
        let url = build_list_url(&base(), &Filter::new(), &QueryOptions::default());
        assert_eq!(url.as_str(), "http://api.local/api/v1/users");
    }

    #[test]
    fn test_limit_and_offset_are_appended() {
        let url = build_list_url(&base(), &Filter::new(), &QueryOptions::paginated(10, 20));
        assert_eq!(url.query(), Some("limit=10&offset=20"));
    }

    #[test]
    fn test_sort_is_not_forwarded() {
        let options = QueryOptions {
            sort: Some(Sort {
                sort_by: "name".to_string(),
                direction: SortDirection::Desc,
            }),
            ..Default::default()
        };
        let url = build_list_url(&base(), &Filter::new(), &options);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let filter = Filter::new()
            .equals("name", "")
            .equals("role", Value::Null)
            .equals("is_active", true);
        let url = build_list_url(&base(), &filter, &QueryOptions::default());
        assert_eq!(url.query(), Some("is_active=true"));
    }

    #[test]
    fn test_range_appends_present_sides_only() {
        let filter = Filter::new()
            .range("date_created", Some("2024-01-01"), None)
            .range("price", Some("10"), Some("20"))
            .range("stock", Some(""), None);
        let url = build_list_url(&base(), &filter, &QueryOptions::default());
        assert_eq!(
            url.query(),
            Some("date_created_from=2024-01-01&price_from=10&price_to=20")
        );
    }

    #[test]
    fn test_object_values_become_ranges() {
        let value = FilterValue::from(json!({"from": 5, "to": null}));
        assert_eq!(value, FilterValue::range(Some("5"), None));
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let filter = Filter::new().equals("email", "a+b@example.com");
        let url = build_list_url(&base(), &filter, &QueryOptions::default());
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs[0].1, "a+b@example.com");
    }

    #[test]
    fn test_insert_replaces_existing_path() {
        let filter = Filter::new().equals("name", "a").equals("name", "b");
        assert_eq!(filter.len(), 1);
        let url = build_list_url(&base(), &filter, &QueryOptions::default());
        assert_eq!(url.query(), Some("name=b"));
    }

    #[test]
    fn test_existing_query_is_preserved() {
        let base = Url::parse("http://api.local/items?tenant=7").unwrap();
        let url = build_list_url(&base, &Filter::new().equals("q", 1), &QueryOptions::default());
        assert_eq!(url.query(), Some("tenant=7&q=1"));
    }
}
