//! HTTP utilities for REST collection calls

use super::error::{ApiError, Result};
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Body of an outgoing request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Multipart text fields; content type is left to the multipart encoder
    Multipart(Vec<(String, String)>),
}

/// Method and body for one call through [`ApiHttpClient::request`]
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: RequestBody::Empty,
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            body: RequestBody::Empty,
        }
    }

    pub fn json(method: Method, body: Value) -> Self {
        Self {
            method,
            body: RequestBody::Json(body),
        }
    }

    pub fn multipart(fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Multipart(fields),
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// HTTP client wrapper for REST collection calls
///
/// One attempt per call: no retries and no timeouts are applied here.
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("restadmin/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Issue one request and return the parsed JSON body
    ///
    /// Returns `Ok(None)` for 204 No Content and for empty 2xx bodies.
    pub async fn request(
        &self,
        url: &str,
        token: Option<&str>,
        options: RequestOptions,
    ) -> Result<Option<Value>> {
        let method = options.method;
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        request = match options.body {
            RequestBody::Empty => request.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(body) => request
                .header(CONTENT_TYPE, "application/json")
                .json(&body),
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (key, value)| form.text(key, value));
                request.multipart(form)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|source| ApiError::NetworkUnreachable {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("{} {} - Status: {}", method, url, status.as_u16());

        // A failed status stays a RequestFailed even if its body is cut short
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                tracing::warn!("Could not read {} error body from {}: {}", status, url, e);
                String::new()
            }
            Err(source) => {
                return Err(ApiError::NetworkUnreachable {
                    url: url.to_string(),
                    source,
                })
            }
        };

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                message: extract_error_message(status, &body),
            });
        }

        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: Option<&str>) -> Result<Option<Value>> {
        self.request(url, token, RequestOptions::get()).await
    }
}

/// Pull a human-readable message out of an error response body
///
/// Prefers `detail`, then `message`; a body that is not JSON falls back to
/// the status line.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let fallback = format!("API request failed with status {}", status.as_u16());

    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => ["detail", "message"]
            .iter()
            .find_map(|key| parsed.get(key).and_then(message_text))
            .unwrap_or(fallback),
        Err(_) => format!(
            "{}: {}",
            fallback,
            status.canonical_reason().unwrap_or("Unknown Status")
        ),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // FastAPI validation errors carry a list under `detail`
        other => Some(other.to_string()),
    }
}

/// Format an API error for terminal display
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::NetworkUnreachable { url, .. } => {
            format!("Cannot reach {}. Check that the backend is running.", url)
        }
        ApiError::RequestFailed { status, message } => match status {
            401 => "Authentication failed. Provide a valid bearer token.".to_string(),
            403 => "Permission denied.".to_string(),
            404 => "Resource not found.".to_string(),
            409 => "Resource conflict. The record may already exist or be in use.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "Backend temporarily unavailable. Please try again.".to_string(),
            _ => message.chars().take(80).collect(),
        },
        ApiError::Decode { .. } => "Backend returned a malformed response.".to_string(),
        ApiError::InvalidUrl { url } => format!("Endpoint {} cannot address single records.", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_takes_precedence_over_message() {
        let body = r#"{"detail": "not found", "message": "ignored"}"#;
        assert_eq!(
            extract_error_message(StatusCode::NOT_FOUND, body),
            "not found"
        );
    }

    #[test]
    fn test_message_used_when_detail_missing() {
        let body = r#"{"message": "email already registered"}"#;
        assert_eq!(
            extract_error_message(StatusCode::CONFLICT, body),
            "email already registered"
        );
    }

    #[test]
    fn test_structured_detail_is_stringified() {
        let body = r#"{"detail": [{"loc": ["body", "name"], "msg": "field required"}]}"#;
        let message = extract_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_json_without_known_fields_uses_status() {
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, r#"{"error": "x"}"#),
            "API request failed with status 400"
        );
    }

    #[test]
    fn test_non_json_body_falls_back_to_status_text() {
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "API request failed with status 502: Bad Gateway"
        );
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 300 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_format_api_error_by_status() {
        let err = ApiError::RequestFailed {
            status: 403,
            message: "nope".to_string(),
        };
        assert_eq!(format_api_error(&err), "Permission denied.");

        let err = ApiError::RequestFailed {
            status: 503,
            message: "down".to_string(),
        };
        assert!(format_api_error(&err).contains("temporarily unavailable"));

        let err = ApiError::RequestFailed {
            status: 422,
            message: "name is required".to_string(),
        };
        assert_eq!(format_api_error(&err), "name is required");

        let err = ApiError::InvalidUrl {
            url: "data:text/plain,users".to_string(),
        };
        assert!(format_api_error(&err).contains("cannot address single records"));
    }

    #[test]
    fn test_unreadable_error_body_uses_status_text() {
        assert_eq!(
            extract_error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "API request failed with status 500: Internal Server Error"
        );
    }
}
