//! Errors raised by write operations on a resource

use super::policy::Operation;
use crate::api::ApiError;
use thiserror::Error;

/// Resource-qualified write failure, rendered as
/// `Failed to <operation> <resource>: <message>`
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Failed to create {resource}: {source}")]
    CreateFailed {
        resource: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to update {resource}: {source}")]
    UpdateFailed {
        resource: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to delete {resource}: {source}")]
    DeleteFailed {
        resource: String,
        #[source]
        source: ApiError,
    },
}

impl ResourceError {
    /// Wrap a transport error for a write operation
    ///
    /// Read operations never produce a `ResourceError`; passing one falls
    /// back to the update variant.
    pub fn wrap(operation: Operation, resource: &str, source: ApiError) -> Self {
        let resource = resource.to_string();
        match operation {
            Operation::Create => Self::CreateFailed { resource, source },
            Operation::Delete => Self::DeleteFailed { resource, source },
            _ => Self::UpdateFailed { resource, source },
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::CreateFailed { .. } => Operation::Create,
            Self::UpdateFailed { .. } => Operation::Update,
            Self::DeleteFailed { .. } => Operation::Delete,
        }
    }

    /// The underlying transport error
    pub fn api_error(&self) -> &ApiError {
        match self {
            Self::CreateFailed { source, .. }
            | Self::UpdateFailed { source, .. }
            | Self::DeleteFailed { source, .. } => source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_resource_qualified() {
        let err = ResourceError::wrap(
            Operation::Update,
            "User",
            ApiError::RequestFailed {
                status: 404,
                message: "not found".to_string(),
            },
        );
        assert_eq!(err.to_string(), "Failed to update User: not found");
        assert_eq!(err.operation(), Operation::Update);
        assert_eq!(err.api_error().status(), Some(404));
    }

    #[test]
    fn test_wrap_picks_variant() {
        let source = ApiError::RequestFailed {
            status: 500,
            message: "boom".to_string(),
        };
        let err = ResourceError::wrap(Operation::Delete, "Product", source);
        assert!(matches!(err, ResourceError::DeleteFailed { .. }));
        assert_eq!(err.to_string(), "Failed to delete Product: boom");
    }
}
