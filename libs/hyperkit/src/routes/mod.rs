//! Route composition.
//!
//! Per resource, [`ItemRoutes`] holds the item-level handlers (getter,
//! updater, remover, custom actions), [`CollectionRoutes`] the collection
//! getter and creators, and [`NestedRoutes`] the same for a collection that
//! lives below a parent item. Handlers are typed closures; the composer
//! resolves their declared capabilities, checks permissions, validates the
//! body and wraps the result with freshly computed operations. Every failure
//! comes back as a [`RouteError`].

pub mod collection;
pub mod form;
pub mod item;
pub mod nested;
pub mod operation;
pub mod permission;
pub mod resource;

use hyperkit_security::SecurityContext;

pub use collection::CollectionRoutes;
pub use form::{Form, FormField};
pub use item::ItemRoutes;
pub use nested::NestedRoutes;
pub use operation::{Operation, OperationDescription, OperationKind};
pub use permission::{PermissionFn, allow_all, permission, require_role, require_scope};
pub use resource::{BatchResult, Page, PageItems, SingleModel};

use crate::error::RouteError;
use crate::pagination::Pagination;
use crate::providers::{CapabilityKey, ProviderRegistry};
use crate::request::RequestContext;

/// What a route invocation needs from the outside world.
#[derive(Clone, Copy)]
pub struct RouteContext<'a> {
    pub registry: &'a dyn ProviderRegistry,
    pub request: &'a RequestContext,
}

impl<'a> RouteContext<'a> {
    #[must_use]
    pub fn new(registry: &'a dyn ProviderRegistry, request: &'a RequestContext) -> Self {
        Self { registry, request }
    }

    /// Pagination for this request, defaulting when no provider supplies one.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.registry
            .lookup(CapabilityKey::of::<Pagination>(), self.request)
            .and_then(|v| v.downcast::<Pagination>().ok())
            .map_or_else(Pagination::default, |p| *p)
    }
}

/// Path of one item of `resource`, relative to the API base.
#[must_use]
pub fn item_path(resource: &str, id: &str) -> String {
    format!("{resource}/{}", urlencoding::encode(id))
}

/// Path of the nested collection `key` below an item.
#[must_use]
pub fn nested_path(resource: &str, parent_id: &str, key: &str) -> String {
    format!("{}/{key}", item_path(resource, parent_id))
}

fn handler_failed(operation: &str, error: anyhow::Error) -> RouteError {
    tracing::debug!(operation, error = %error, "handler failed");
    RouteError::handler_failed(operation, error)
}

fn ensure_permitted(
    permission: &PermissionFn,
    identity: &SecurityContext,
    key: Option<&str>,
    operation: &str,
) -> Result<(), RouteError> {
    if permission::is_permitted(permission, identity, key, operation) {
        Ok(())
    } else {
        tracing::debug!(operation, key, "permission denied");
        Err(RouteError::permission_denied(operation))
    }
}
