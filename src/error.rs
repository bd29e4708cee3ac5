//! Query build error types
//!
//! Both variants describe malformed caller input. Neither is transient, so
//! callers should surface them to the operator instead of retrying.

use thiserror::Error;

/// Errors raised while turning a metric query config into InfluxQL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryBuildError {
    /// A mandatory input (measurement, scope, start/end) is missing
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The scope expression is not a single `name:value` pair
    #[error("Invalid scope format: {0}")]
    InvalidScopeFormat(String),
}

impl QueryBuildError {
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    pub fn is_invalid_scope_format(&self) -> bool {
        matches!(self, Self::InvalidScopeFormat(_))
    }

    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidConfiguration(msg) | Self::InvalidScopeFormat(msg) => msg,
        }
    }
}

/// Result type for query build operations
pub type Result<T> = std::result::Result<T, QueryBuildError>;
