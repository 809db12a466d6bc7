//! Resource Registry - resource definitions and their connected adapters
//!
//! Definitions come from the configuration file; the registry connects one
//! adapter per definition and provides lookup functions for the rest of the
//! application.

use super::adapter::ResourceAdapter;
use crate::api::ApiHttpClient;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Fields stripped from every update unless a resource overrides the list
pub const DEFAULT_READ_ONLY_FIELDS: &[&str] =
    &["date_created", "date_updated", "is_verified", "is_active"];

/// Per-record URL layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordPath {
    /// `<dataEndpoint>/<id>`
    #[default]
    Plain,
    /// `<dataEndpoint>/id/<id>`
    IdPrefixed,
}

/// HTTP method used for partial updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    #[default]
    Patch,
    Put,
}

impl UpdateMethod {
    pub fn as_method(self) -> reqwest::Method {
        match self {
            Self::Patch => reqwest::Method::PATCH,
            Self::Put => reqwest::Method::PUT,
        }
    }
}

fn default_database() -> String {
    "rest".to_string()
}

fn default_read_only_fields() -> Vec<String> {
    DEFAULT_READ_ONLY_FIELDS.iter().map(|s| s.to_string()).collect()
}

/// Resource definition from the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub name: String,
    pub data_endpoint: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_endpoint: Option<Url>,
    /// Label reported as the adapter's database type
    #[serde(default = "default_database")]
    pub database: String,
    /// Send creates as multipart form fields instead of JSON
    #[serde(default)]
    pub form_encoding: bool,
    #[serde(default)]
    pub record_path: RecordPath,
    #[serde(default)]
    pub update_method: UpdateMethod,
    /// Server-owned fields never sent in an update
    #[serde(default = "default_read_only_fields")]
    pub read_only_fields: Vec<String>,
}

impl ResourceDef {
    pub fn new(name: impl Into<String>, data_endpoint: Url) -> Self {
        Self {
            name: name.into(),
            data_endpoint,
            schema_endpoint: None,
            database: default_database(),
            form_encoding: false,
            record_path: RecordPath::default(),
            update_method: UpdateMethod::default(),
            read_only_fields: default_read_only_fields(),
        }
    }

    pub fn with_schema_endpoint(mut self, endpoint: Url) -> Self {
        self.schema_endpoint = Some(endpoint);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_form_encoding(mut self, form_encoding: bool) -> Self {
        self.form_encoding = form_encoding;
        self
    }

    pub fn with_record_path(mut self, record_path: RecordPath) -> Self {
        self.record_path = record_path;
        self
    }

    pub fn with_update_method(mut self, update_method: UpdateMethod) -> Self {
        self.update_method = update_method;
        self
    }

    pub fn with_read_only_fields(mut self, fields: Vec<String>) -> Self {
        self.read_only_fields = fields;
        self
    }
}

/// Connected adapters, one per resource definition
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    adapters: Vec<Arc<ResourceAdapter>>,
}

impl ResourceRegistry {
    /// Connect every definition, loading all schemas concurrently
    pub async fn connect_all(defs: Vec<ResourceDef>, http: &ApiHttpClient) -> Self {
        let adapters = join_all(
            defs.into_iter()
                .map(|def| ResourceAdapter::connect(def, http.clone())),
        )
        .await;

        tracing::info!("Connected {} resources", adapters.len());
        Self { adapters }
    }

    /// Get an adapter by resource name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Arc<ResourceAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// All resource names, in definition order
    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceAdapter>> {
        self.adapters.iter()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
