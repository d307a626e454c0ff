use thiserror::Error;

/// Failures captured at the route composer boundary.
///
/// Every handler, capability resolution and permission check runs inside the
/// composer and ends up here; nothing is thrown past it. The transport maps
/// these onto an error document via [`Problem`](crate::problem::Problem).
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("required capability '{capability}' is not available for this request")]
    DependencyUnavailable { capability: &'static str },

    #[error("handler for '{operation}' failed: {source}")]
    HandlerFailed {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("caller is not permitted to perform '{operation}'")]
    PermissionDenied { operation: String },

    #[error("invalid request body: {message}")]
    BadRequest { message: String },

    #[error("operation '{operation}' is not registered")]
    OperationNotRegistered { operation: String },

    #[error("batch element {index} failed: {source}")]
    BatchElementFailed {
        index: usize,
        #[source]
        source: Box<RouteError>,
    },
}

impl RouteError {
    #[must_use]
    pub fn dependency_unavailable(capability: &'static str) -> Self {
        Self::DependencyUnavailable { capability }
    }

    #[must_use]
    pub fn handler_failed(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::HandlerFailed {
            operation: operation.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn permission_denied(operation: impl Into<String>) -> Self {
        Self::PermissionDenied {
            operation: operation.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn operation_not_registered(operation: impl Into<String>) -> Self {
        Self::OperationNotRegistered {
            operation: operation.into(),
        }
    }

    #[must_use]
    pub fn batch_element_failed(index: usize, source: RouteError) -> Self {
        Self::BatchElementFailed {
            index,
            source: Box::new(source),
        }
    }

    /// The innermost error, unwrapping batch element failures.
    #[must_use]
    pub fn root_cause(&self) -> &RouteError {
        match self {
            Self::BatchElementFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Developer-configuration errors.
///
/// Raised while schemas, catalogs, mapper registries or configuration are
/// assembled at startup. None of these are recoverable per request; the
/// affected resource must not be registered.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("resource '{resource}' declares key '{key}' more than once")]
    DuplicateKey { resource: String, key: String },

    #[error("resource '{resource}' uses reserved key '{key}'")]
    ReservedKey { resource: String, key: String },

    #[error("resource for model '{model}' declares no type names")]
    MissingTypes { model: &'static str },

    #[error("resource name '{name}' is already registered")]
    DuplicateResource { name: String },

    #[error("model '{model}' is already registered as resource '{name}'")]
    DuplicateModel { model: &'static str, name: String },

    #[error("resource '{name}' is not registered")]
    UnknownResource { name: String },

    #[error("no {kind} mapper registered for default media type '{media_type}'")]
    MissingDefaultMapper {
        kind: &'static str,
        media_type: String,
    },

    #[error("invalid media type '{media_type}'")]
    InvalidMediaType { media_type: String },

    #[error(
        "invalid pagination bounds: default {default_items_per_page}, max {max_items_per_page}"
    )]
    InvalidPagination {
        default_items_per_page: u64,
        max_items_per_page: u64,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Invalid(Box::new(e))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_nested_batch_failures() {
        let err = RouteError::batch_element_failed(
            2,
            RouteError::batch_element_failed(0, RouteError::bad_request("missing 'name'")),
        );

        assert!(matches!(err.root_cause(), RouteError::BadRequest { .. }));
        assert_eq!(
            err.to_string(),
            "batch element 2 failed: batch element 0 failed: invalid request body: missing 'name'"
        );
    }

    #[test]
    fn handler_failure_keeps_original_cause() {
        let err = RouteError::handler_failed("people.create", anyhow::anyhow!("disk full"));

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("disk full"));
    }
}
