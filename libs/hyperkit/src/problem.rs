//! RFC 9457 problem details for route failures.

use http::StatusCode;
use serde::{Serialize, Serializer};

use crate::error::RouteError;

/// Default problem type when no more specific URI applies.
pub const ABOUT_BLANK: &str = "about:blank";

/// Problem details value, written by the error writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: ABOUT_BLANK.to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: None,
            trace_id: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Map a route error, attaching the current span id as trace id.
    #[must_use]
    pub fn from_route_error(err: &RouteError, instance: &str) -> Self {
        let problem = Self::from(err).with_instance(instance);
        match tracing::Span::current().id() {
            Some(id) => problem.with_trace_id(id.into_u64().to_string()),
            None => problem,
        }
    }
}

impl From<&RouteError> for Problem {
    fn from(err: &RouteError) -> Self {
        match err {
            RouteError::DependencyUnavailable { capability } => {
                tracing::error!(capability, "capability missing for request");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Dependency Unavailable",
                    "A required dependency is not available",
                )
            }
            RouteError::HandlerFailed { operation, source } => {
                tracing::error!(operation = %operation, error = %source, "handler failed");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "An internal error occurred",
                )
            }
            RouteError::PermissionDenied { operation } => Problem::new(
                StatusCode::FORBIDDEN,
                "Access denied",
                format!("You do not have permission to perform '{operation}'"),
            ),
            RouteError::BadRequest { message } => {
                Problem::new(StatusCode::BAD_REQUEST, "Invalid Request", message.clone())
            }
            RouteError::OperationNotRegistered { operation } => Problem::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "Operation Not Supported",
                format!("Operation '{operation}' is not available on this resource"),
            ),
            RouteError::BatchElementFailed { index, .. } => {
                let inner = Problem::from(err.root_cause());
                let detail = format!("Batch element {index} failed: {}", inner.detail);
                Problem { detail, ..inner }
            }
        }
    }
}

impl From<RouteError> for Problem {
    fn from(err: RouteError) -> Self {
        Problem::from(&err)
    }
}
