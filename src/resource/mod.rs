//! Resource abstraction layer
//!
//! This module exposes an arbitrary REST collection as a uniform,
//! schema-aware resource. The schema is discovered at runtime, so the same
//! code serves users, products, orders or anything else the backend lists.
//!
//! # Architecture
//!
//! - [`property`] - Typed description of one remote field
//! - [`schema`] - Loads the property list once, with a default fallback
//! - [`query`] - Translates filters and pagination into query parameters
//! - [`normalize`] - Extracts records from the backend's list envelope
//! - [`adapter`] - The six resource operations built on the above
//! - [`registry`] - Resource definitions and concurrent adapter startup
//! - [`policy`] - Read/write failure policy
//!
//! # Example
//!
//! ```ignore
//! use restadmin::api::ApiHttpClient;
//! use restadmin::resource::{Filter, QueryOptions, ResourceAdapter, ResourceDef};
//!
//! async fn list_users(http: ApiHttpClient) {
//!     let def = ResourceDef::new("User", "http://localhost:8000/api/v1/users".parse().unwrap());
//!     let users = ResourceAdapter::connect(def, http).await;
//!     let page = users
//!         .list(&Filter::new().equals("role", "admin"), &QueryOptions::paginated(10, 0), None)
//!         .await;
//! }
//! ```

pub mod adapter;
pub mod error;
pub mod normalize;
pub mod policy;
pub mod projection;
pub mod property;
pub mod query;
pub mod record;
pub mod registry;
pub mod schema;

pub use adapter::{AdapterState, ListOutcome, ResourceAdapter};
pub use error::ResourceError;
pub use normalize::{extract_records, Envelope, Normalized};
pub use policy::{FailureMode, Operation};
pub use projection::{PropertyDirectives, Visibility};
pub use property::{Property, PropertyType};
pub use query::{build_list_url, Filter, FilterValue, QueryOptions, Sort, SortDirection};
pub use record::Record;
pub use registry::{RecordPath, ResourceDef, ResourceRegistry, UpdateMethod};
pub use schema::SchemaLoader;
