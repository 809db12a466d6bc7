//! Record - one normalized item bound to the adapter that produced it

use super::adapter::ResourceAdapter;
use super::normalize::ID_KEYS;
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};

/// One record returned from a resource
///
/// Holds a weak back-reference to its adapter, used only to re-dispatch
/// operations; a record never keeps its adapter alive.
#[derive(Debug, Clone)]
pub struct Record {
    params: Map<String, Value>,
    resource: Weak<ResourceAdapter>,
}

impl Record {
    pub fn new(params: Map<String, Value>, resource: Weak<ResourceAdapter>) -> Self {
        Self { params, resource }
    }

    /// Identifier as text, from the first of `id`, `Id`, `_id` that is set
    pub fn id(&self) -> Option<String> {
        ID_KEYS
            .iter()
            .filter_map(|key| self.params.get(*key))
            .find_map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn into_params(self) -> Map<String, Value> {
        self.params
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.params.get(path)
    }

    /// The owning adapter, if it is still alive
    pub fn resource(&self) -> Option<Arc<ResourceAdapter>> {
        self.resource.upgrade()
    }

    /// Fetch the current version of this record through its adapter
    ///
    /// `None` when the adapter is gone, the record has no identifier, or the
    /// lookup fails.
    pub async fn refetch(&self, token: Option<&str>) -> Option<Record> {
        let resource = self.resource()?;
        let id = self.id()?;
        resource.get_by_id(&id, token).await
    }
}
