//! REST API interaction module
//!
//! Everything that touches the wire lives here: one request per call,
//! auth and content-type headers, and the translation of failed exchanges
//! into typed errors.
//!
//! # Module Structure
//!
//! - [`http`] - Transport wrapper around `reqwest`
//! - [`error`] - Transport error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use restadmin::api::{ApiHttpClient, RequestOptions};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let http = ApiHttpClient::new()?;
//!     let body = http
//!         .request("http://localhost:8000/api/v1/users", Some("token"), RequestOptions::get())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;

pub use error::ApiError;
pub use http::{format_api_error, ApiHttpClient, RequestBody, RequestOptions};
