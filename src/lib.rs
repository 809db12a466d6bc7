//! restadmin - expose any REST collection as a uniform admin resource
//!
//! The adapter discovers each collection's schema at runtime and offers
//! list, get, count, create, update and delete over plain HTTP, whatever
//! envelope the backend wraps its records in.
//!
//! - [`api`] - transport wrapper and its error taxonomy
//! - [`resource`] - schema, query translation, normalization and the adapter
//! - [`config`] - resource definitions loaded from YAML
//! - [`output`] - terminal rendering

pub mod api;
pub mod config;
pub mod output;
pub mod resource;

pub use api::{ApiError, ApiHttpClient};
pub use resource::{Record, ResourceAdapter, ResourceDef, ResourceError, ResourceRegistry};
