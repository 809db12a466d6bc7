//! Property-based tests using proptest
//!
//! These tests verify the query translator and the response normalizer
//! against randomized filters and list bodies.

use proptest::prelude::*;
use restadmin::resource::{build_list_url, extract_records, Filter, FilterValue, QueryOptions};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

fn base() -> Url {
    Url::parse("http://api.local/api/v1/users").unwrap()
}

fn query_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Scalar filter values, blank ones included
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("")),
        "[a-zA-Z0-9 ]{1,12}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

fn is_blank(value: &Value) -> bool {
    value.is_null() || value.as_str() == Some("")
}

/// One list entry: valid record, record without identifier, or non-object
fn arb_entry() -> impl Strategy<Value = (Value, bool)> {
    prop_oneof![
        (1u32..10_000, prop_oneof!["id", "Id", "_id"])
            .prop_map(|(n, key)| (json!({ key: n, "name": format!("item-{}", n) }), true)),
        "[a-z]{1,8}".prop_map(|name| (json!({ "name": name }), false)),
        Just((json!({ "id": null }), false)),
        any::<i64>().prop_map(|n| (json!(n), false)),
        Just((json!("loose string"), false)),
    ]
}

fn arb_entries() -> impl Strategy<Value = Vec<(Value, bool)>> {
    prop::collection::vec(arb_entry(), 0..40)
}

/// The four envelopes a backend may use for the `User` resource
fn wrap(envelope: usize, items: Vec<Value>) -> Value {
    match envelope {
        0 => Value::Array(items),
        1 => json!({ "users": items }),
        2 => json!({ "items": items, "total": 99 }),
        _ => json!({ "data": items }),
    }
}

proptest! {
    /// Null and empty-string filter values never reach the URL
    #[test]
    fn blank_scalars_are_omitted(
        entries in prop::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..8)
    ) {
        let filter: Filter = entries
            .iter()
            .map(|(k, v)| (k.clone(), FilterValue::from(v.clone())))
            .collect();

        let url = build_list_url(&base(), &filter, &QueryOptions::default());
        let keys: BTreeSet<String> = query_pairs(&url).into_iter().map(|(k, _)| k).collect();
        let expected: BTreeSet<String> = entries
            .iter()
            .filter(|(_, v)| !is_blank(v))
            .map(|(k, _)| k.clone())
            .collect();

        prop_assert_eq!(keys, expected);
        if entries.values().all(is_blank) {
            prop_assert!(url.query().is_none());
        }
    }

    /// Each range side appears exactly when it is present and non-empty
    #[test]
    fn range_sides_match_presence(
        ranges in prop::collection::btree_map(
            "[a-z]{1,8}",
            (
                prop::option::of("[0-9]{0,4}"),
                prop::option::of("[0-9]{0,4}"),
            ),
            0..6,
        )
    ) {
        let mut filter = Filter::new();
        for (path, (from, to)) in &ranges {
            filter = filter.range(path.clone(), from.as_deref(), to.as_deref());
        }

        let url = build_list_url(&base(), &filter, &QueryOptions::default());
        let pairs: BTreeMap<String, String> = query_pairs(&url).into_iter().collect();

        let mut expected = BTreeMap::new();
        for (path, (from, to)) in &ranges {
            if let Some(from) = from.as_ref().filter(|s| !s.is_empty()) {
                expected.insert(format!("{}_from", path), from.clone());
            }
            if let Some(to) = to.as_ref().filter(|s| !s.is_empty()) {
                expected.insert(format!("{}_to", path), to.clone());
            }
        }
        prop_assert_eq!(pairs, expected);
    }

    /// Pagination comes first and is always forwarded when set
    #[test]
    fn pagination_is_forwarded(limit in 0u64..1000, offset in 0u64..100_000) {
        let filter = Filter::new().equals("role", "admin");
        let url = build_list_url(&base(), &filter, &QueryOptions::paginated(limit, offset));
        let pairs = query_pairs(&url);

        prop_assert_eq!(&pairs[0], &("limit".to_string(), limit.to_string()));
        prop_assert_eq!(&pairs[1], &("offset".to_string(), offset.to_string()));
        prop_assert_eq!(pairs.len(), 3);
    }

    /// The translator is deterministic
    #[test]
    fn url_building_is_deterministic(
        entries in prop::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..8)
    ) {
        let filter: Filter = entries
            .into_iter()
            .map(|(k, v)| (k, FilterValue::from(v)))
            .collect();
        let options = QueryOptions::paginated(10, 0);

        prop_assert_eq!(
            build_list_url(&base(), &filter, &options),
            build_list_url(&base(), &filter, &options)
        );
    }

    /// Every envelope yields exactly the identifiable entries, in order
    #[test]
    fn normalizer_keeps_only_valid_records(entries in arb_entries(), envelope in 0usize..4) {
        let items: Vec<Value> = entries.iter().map(|(v, _)| v.clone()).collect();
        let expected: Vec<Value> = entries
            .iter()
            .filter(|(_, valid)| *valid)
            .map(|(v, _)| v.clone())
            .collect();

        let normalized = extract_records("User", &wrap(envelope, items.clone()));
        let got: Vec<Value> = normalized.records.iter().cloned().map(Value::Object).collect();

        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(normalized.dropped, items.len() - expected.len());
    }

    /// Normalizing already-normalized records changes nothing
    #[test]
    fn normalizer_is_idempotent(entries in arb_entries(), envelope in 0usize..4) {
        let items: Vec<Value> = entries.into_iter().map(|(v, _)| v).collect();
        let once = extract_records("User", &wrap(envelope, items));

        let again_input: Vec<Value> = once.records.iter().cloned().map(Value::Object).collect();
        let twice = extract_records("User", &wrap(envelope, again_input));

        prop_assert_eq!(&twice.records, &once.records);
        prop_assert_eq!(twice.dropped, 0);
    }
}

/// Bodies that match no envelope
mod unrecognized_body_tests {
    use super::*;

    proptest! {
        /// Objects without a known list key normalize to nothing
        #[test]
        fn unknown_keys_yield_empty(key in "[a-z]{1,8}", entries in arb_entries()) {
            prop_assume!(!["users", "items", "data"].contains(&key.as_str()));
            let items: Vec<Value> = entries.into_iter().map(|(v, _)| v).collect();

            let normalized = extract_records("User", &json!({ key: items }));
            prop_assert!(normalized.records.is_empty());
            prop_assert_eq!(normalized.dropped, 0);
        }

        /// Scalar bodies normalize to nothing
        #[test]
        fn scalar_bodies_yield_empty(n in any::<i64>(), s in ".{0,20}") {
            prop_assert!(extract_records("User", &json!(n)).records.is_empty());
            prop_assert!(extract_records("User", &json!(s)).records.is_empty());
            prop_assert!(extract_records("User", &Value::Null).records.is_empty());
        }
    }
}
