//! Resource Adapter
//!
//! Exposes one remote REST collection through the six resource operations
//! (list, get, count, create, update, delete) plus the admin properties
//! projection. Composes the schema loader, query translator, transport
//! wrapper and response normalizer.

use super::error::{ResourceError, Result};
use super::normalize::{extract_records, has_identifier, Normalized, ID_KEYS};
use super::policy::{absorb_read, Operation};
use super::projection::{project, PropertyDirectives};
use super::property::Property;
use super::query::{build_list_url, Filter, QueryOptions};
use super::record::Record;
use super::registry::{RecordPath, ResourceDef};
use super::schema::SchemaLoader;
use crate::api::{ApiError, ApiHttpClient, RequestOptions};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use url::Url;

/// Lifecycle of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Schema not loaded yet; the default property list is served
    Uninitialized,
    /// Schema load finished (successfully or via the fallback list)
    Ready,
}

/// Property cache: written wholesale, read many times
struct SchemaCache {
    state: AdapterState,
    properties: Vec<Property>,
}

/// Records from one list call plus the number the normalizer discarded
#[derive(Debug, Clone, Default)]
pub struct ListOutcome {
    pub records: Vec<Record>,
    pub dropped: usize,
}

pub struct ResourceAdapter {
    def: ResourceDef,
    http: ApiHttpClient,
    schema: SchemaLoader,
    cache: RwLock<SchemaCache>,
    this: Weak<ResourceAdapter>,
}

impl fmt::Debug for ResourceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceAdapter")
            .field("name", &self.def.name)
            .field("data_endpoint", &self.def.data_endpoint.as_str())
            .field("state", &self.state())
            .finish()
    }
}

impl ResourceAdapter {
    /// Create an uninitialized adapter serving the default property list
    ///
    /// Call [`ResourceAdapter::reload_schema`] to load the real schema, or use
    /// [`ResourceAdapter::connect`] to do both at once.
    pub fn new(def: ResourceDef, http: ApiHttpClient) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            def,
            schema: SchemaLoader::new(http.clone()),
            http,
            cache: RwLock::new(SchemaCache {
                state: AdapterState::Uninitialized,
                properties: Property::fallback(),
            }),
            this: this.clone(),
        })
    }

    /// Create an adapter and wait for its schema to load
    ///
    /// Never fails: a schema that cannot be loaded leaves the adapter ready
    /// with the default property list.
    pub async fn connect(def: ResourceDef, http: ApiHttpClient) -> Arc<Self> {
        let adapter = Self::new(def, http);
        adapter.reload_schema().await;
        adapter
    }

    /// Fetch the schema and replace the cached property list
    pub async fn reload_schema(&self) {
        let properties = self
            .schema
            .load(&self.def.name, self.def.schema_endpoint.as_ref())
            .await;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = SchemaCache {
            state: AdapterState::Ready,
            properties,
        };
    }

    pub fn state(&self) -> AdapterState {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn id(&self) -> &str {
        &self.def.name
    }

    pub fn database_name(&self) -> &str {
        &self.def.name
    }

    pub fn database_type(&self) -> &str {
        &self.def.database
    }

    /// Snapshot of the cached property list
    pub fn properties(&self) -> Vec<Property> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .properties
            .clone()
    }

    pub fn property(&self, path: &str) -> Option<Property> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .properties
            .iter()
            .find(|p| p.path() == path)
            .cloned()
    }

    /// Display directives for every cached property, keyed by path
    pub fn admin_properties(&self) -> BTreeMap<String, PropertyDirectives> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        project(&cache.properties)
    }

    // =========================================================================
    // Read operations: failures degrade to empty results
    // =========================================================================

    /// List records matching `filter`; empty on any failure
    pub async fn list(
        &self,
        filter: &Filter,
        options: &QueryOptions,
        token: Option<&str>,
    ) -> Vec<Record> {
        self.list_with_diagnostics(filter, options, token)
            .await
            .records
    }

    /// Like [`ResourceAdapter::list`], also reporting discarded entries
    pub async fn list_with_diagnostics(
        &self,
        filter: &Filter,
        options: &QueryOptions,
        token: Option<&str>,
    ) -> ListOutcome {
        let result = self.fetch_list(filter, options, token).await;
        let normalized = absorb_read(Operation::List, self.name(), result, Normalized::default());

        ListOutcome {
            records: normalized
                .records
                .into_iter()
                .map(|params| self.wrap(params))
                .collect(),
            dropped: normalized.dropped,
        }
    }

    async fn fetch_list(
        &self,
        filter: &Filter,
        options: &QueryOptions,
        token: Option<&str>,
    ) -> std::result::Result<Normalized, ApiError> {
        let url = build_list_url(&self.def.data_endpoint, filter, options);
        tracing::debug!("Fetching {} with URL: {}", self.name(), url);

        let body = self.http.get(url.as_str(), token).await?;
        let normalized = body
            .map(|body| extract_records(self.name(), &body))
            .unwrap_or_default();

        tracing::debug!("Found {} {} records", normalized.records.len(), self.name());
        Ok(normalized)
    }

    /// Fetch one record; `None` when missing or on any failure
    pub async fn get_by_id(&self, id: &str, token: Option<&str>) -> Option<Record> {
        let result = self.fetch_one(id, token).await;
        absorb_read(Operation::Get, self.name(), result, None)
    }

    async fn fetch_one(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> std::result::Result<Option<Record>, ApiError> {
        let url = self.record_url(id)?;
        tracing::debug!("Fetching single {} from URL: {}", self.name(), url);

        match self.http.get(url.as_str(), token).await? {
            Some(Value::Object(params)) if has_identifier(&params) => Ok(Some(self.wrap(params))),
            _ => {
                tracing::warn!("{} {} did not return an identifiable record", self.name(), id);
                Ok(None)
            }
        }
    }

    /// Number of records matching `filter`, derived from a full list call
    ///
    /// Cost grows with the result size; zero on any failure.
    pub async fn count(&self, filter: &Filter, token: Option<&str>) -> usize {
        self.list(filter, &QueryOptions::default(), token).await.len()
    }

    // =========================================================================
    // Write operations: failures propagate as resource-qualified errors
    // =========================================================================

    /// Create a record and return the fields the backend echoes back
    pub async fn create(&self, fields: Map<String, Value>, token: Option<&str>) -> Result<Value> {
        if token.is_none() {
            tracing::warn!("No authentication token available for create operation");
        }

        let options = if self.def.form_encoding {
            RequestOptions::multipart(form_fields(&fields))
        } else {
            RequestOptions::json(reqwest::Method::POST, Value::Object(fields))
        };

        let created = self
            .http
            .request(self.def.data_endpoint.as_str(), token, options)
            .await
            .map_err(|e| self.write_error(Operation::Create, e))?;

        tracing::info!("Created {}", self.name());
        Ok(created.unwrap_or(Value::Null))
    }

    /// Partially update a record
    ///
    /// Identifier, read-only and empty fields are stripped first. When
    /// nothing is left no request is sent and the current record is returned.
    pub async fn update(
        &self,
        id: &str,
        fields: Map<String, Value>,
        token: Option<&str>,
    ) -> Result<Value> {
        let payload = self.clean_update_payload(&fields);

        if payload.is_empty() {
            tracing::warn!(
                "No valid fields to update for {} with id {}. Skipping API call.",
                self.name(),
                id
            );
            let current = self.get_by_id(id, token).await;
            return Ok(Value::Object(
                current.map(Record::into_params).unwrap_or(fields),
            ));
        }

        tracing::debug!(
            "Updating {} with id {}: fields {:?}",
            self.name(),
            id,
            payload.keys().collect::<Vec<_>>()
        );

        let url = self
            .record_url(id)
            .map_err(|e| self.write_error(Operation::Update, e))?;
        let options = RequestOptions::json(self.def.update_method.as_method(), Value::Object(payload));
        let updated = self
            .http
            .request(url.as_str(), token, options)
            .await
            .map_err(|e| self.write_error(Operation::Update, e))?;

        tracing::info!("Updated {} with id {}", self.name(), id);
        Ok(updated.unwrap_or(Value::Null))
    }

    /// Delete a record
    pub async fn delete(&self, id: &str, token: Option<&str>) -> Result<()> {
        let url = self
            .record_url(id)
            .map_err(|e| self.write_error(Operation::Delete, e))?;
        self.http
            .request(url.as_str(), token, RequestOptions::delete())
            .await
            .map_err(|e| self.write_error(Operation::Delete, e))?;

        tracing::info!("Successfully deleted {} with id {}", self.name(), id);
        Ok(())
    }

    /// The update payload with identifier, read-only and empty fields removed
    pub fn clean_update_payload(&self, fields: &Map<String, Value>) -> Map<String, Value> {
        let id_path = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .properties
            .iter()
            .find(|p| p.is_id())
            .map(|p| p.path().to_string());

        fields
            .iter()
            .filter(|(key, _)| !ID_KEYS.contains(&key.as_str()))
            .filter(|(key, _)| id_path.as_deref() != Some(key.as_str()))
            .filter(|(key, _)| !self.def.read_only_fields.iter().any(|f| f == *key))
            .filter(|(_, value)| !is_blank(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Per-record URL; the endpoint's query string is kept
    fn record_url(&self, id: &str) -> std::result::Result<Url, ApiError> {
        let mut url = self.def.data_endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl {
                url: self.def.data_endpoint.to_string(),
            })?;
            segments.pop_if_empty();
            if let RecordPath::IdPrefixed = self.def.record_path {
                segments.push("id");
            }
            segments.push(id);
        }
        Ok(url)
    }

    fn wrap(&self, params: Map<String, Value>) -> Record {
        Record::new(params, self.this.clone())
    }

    fn write_error(&self, operation: Operation, error: ApiError) -> ResourceError {
        tracing::error!("Error during {} of {}: {}", operation, self.name(), error);
        ResourceError::wrap(operation, self.name(), error)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Multipart text fields for a form-encoded create; blank values are skipped
fn form_fields(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
