//! Failure policy for resource operations
//!
//! Read paths degrade to an empty result so list and show views always
//! render. Write paths surface a typed error the host can show to the user.

use std::fmt;

/// The six operations a resource exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Count,
    Create,
    Update,
    Delete,
}

/// What an operation does with a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Log and return the empty value (no records, `None`, zero)
    TreatAsEmpty,
    /// Return a typed, resource-qualified error
    PropagateTyped,
}

impl Operation {
    pub fn failure_mode(self) -> FailureMode {
        match self {
            Self::List | Self::Get | Self::Count => FailureMode::TreatAsEmpty,
            Self::Create | Self::Update | Self::Delete => FailureMode::PropagateTyped,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Count => "count",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Apply the read policy: log the failure and fall back to `empty`
pub(crate) fn absorb_read<T, E: fmt::Display>(
    operation: Operation,
    resource: &str,
    result: Result<T, E>,
    empty: T,
) -> T {
    debug_assert_eq!(operation.failure_mode(), FailureMode::TreatAsEmpty);
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Error during {} of {}: {}", operation, resource, e);
            empty
        }
    }
}
