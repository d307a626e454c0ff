use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::Serialize;

use super::form::Form;

/// What a write operation does to its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Custom(String),
}

impl OperationKind {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation the caller may currently perform.
///
/// Computed per request from the registered handlers and their permission
/// evaluators; an `Operation` existing means the caller was allowed at
/// computation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    kind: OperationKind,
    method: Method,
    /// Target path relative to the API base.
    target: String,
    form: Option<Arc<Form>>,
}

impl Operation {
    #[must_use]
    pub fn new(
        kind: OperationKind,
        method: Method,
        target: String,
        form: Option<Arc<Form>>,
    ) -> Self {
        Self {
            kind,
            method,
            target,
            form,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn form(&self) -> Option<&Form> {
        self.form.as_deref()
    }
}

/// Static description of a registered operation, for documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescription {
    pub name: String,
    pub method: String,
    /// `collection`, `item` or `nested:<key>`.
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
}

impl OperationDescription {
    pub(crate) fn new(
        kind: &OperationKind,
        method: &Method,
        scope: &str,
        form: Option<&Form>,
    ) -> Self {
        Self {
            name: kind.name().to_owned(),
            method: method.as_str().to_owned(),
            scope: scope.to_owned(),
            form: form.map(|f| f.id().to_owned()),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn custom_kind_uses_its_own_name() {
        let op = Operation::new(
            OperationKind::Custom("archive".to_owned()),
            Method::POST,
            "people/1/archive".to_owned(),
            None,
        );

        assert_eq!(op.name(), "archive");
        assert_eq!(op.kind().to_string(), "archive");
        assert_eq!(OperationKind::Update.name(), "update");
    }
}
