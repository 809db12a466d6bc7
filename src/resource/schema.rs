//! Schema Loader
//!
//! Fetches a resource's field description once and turns it into an ordered
//! property list. Failures never reach the caller: they are logged and the
//! single-`id` fallback list is returned instead.

use super::property::{Property, PropertyType};
use crate::api::{ApiError, ApiHttpClient};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Wire shape of `GET <schemaEndpoint>`
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
struct FieldSpec {
    path: String,
    #[serde(rename = "type", default)]
    kind: Option<PropertyType>,
    #[serde(rename = "isId", default)]
    is_id: Option<bool>,
}

#[derive(Debug, Error)]
enum SchemaError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("empty response body")]
    EmptyBody,
    #[error("malformed schema: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Loads property lists from schema endpoints
#[derive(Clone)]
pub struct SchemaLoader {
    http: ApiHttpClient,
}

impl SchemaLoader {
    pub fn new(http: ApiHttpClient) -> Self {
        Self { http }
    }

    /// Load the property list for `resource`
    ///
    /// Always returns a non-empty list.
    pub async fn load(&self, resource: &str, endpoint: Option<&Url>) -> Vec<Property> {
        let Some(endpoint) = endpoint else {
            tracing::info!("No schema endpoint for {}, using default properties", resource);
            return Property::fallback();
        };

        match self.fetch(endpoint).await {
            Ok(properties) if !properties.is_empty() => {
                tracing::info!("Loaded {} properties for {}", properties.len(), resource);
                tracing::debug!(
                    "Property paths for {}: {:?}",
                    resource,
                    properties.iter().map(Property::path).collect::<Vec<_>>()
                );
                properties
            }
            Ok(_) => {
                tracing::warn!("No fields for {}, using default properties", resource);
                Property::fallback()
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load schema for {}: {}, using default properties",
                    resource,
                    e
                );
                Property::fallback()
            }
        }
    }

    async fn fetch(&self, endpoint: &Url) -> Result<Vec<Property>, SchemaError> {
        let body = self
            .http
            .get(endpoint.as_str(), None)
            .await?
            .ok_or(SchemaError::EmptyBody)?;

        Ok(parse_schema(body)?)
    }
}

/// Convert a schema document into an ordered property list
///
/// Duplicate paths keep their first occurrence and only the first field
/// flagged `isId` keeps the flag.
pub fn parse_schema(body: Value) -> Result<Vec<Property>, serde_json::Error> {
    let document: SchemaDocument = serde_json::from_value(body)?;

    let mut seen = HashSet::new();
    let mut has_id = false;
    let mut properties = Vec::with_capacity(document.fields.len());

    for field in document.fields {
        if !seen.insert(field.path.clone()) {
            tracing::warn!("Duplicate schema field '{}' ignored", field.path);
            continue;
        }

        let mut is_id = field.is_id.unwrap_or(false);
        if is_id && has_id {
            tracing::warn!("Schema field '{}' is a second identifier, flag dropped", field.path);
            is_id = false;
        }
        has_id |= is_id;

        properties.push(Property::new(
            field.path,
            field.kind.unwrap_or_default(),
            is_id,
        ));
    }

    Ok(properties)
}
