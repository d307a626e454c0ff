use std::sync::Arc;

use hyperkit_security::SecurityContext;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::collection::{Collection, Scope};
use super::form::Form;
use super::item::ItemRoutes;
use super::operation::{Operation, OperationDescription};
use super::permission::PermissionFn;
use super::resource::{BatchResult, Page, PageItems, SingleModel};
use super::RouteContext;
use crate::error::RouteError;
use crate::providers::Capabilities;

/// Routes of a collection below a parent item, e.g. `people/{id}/friends`.
///
/// Handlers receive the parent identifier first. Creator permissions are
/// evaluated with the parent identifier as key.
pub struct NestedRoutes<M> {
    inner: Collection<M>,
}

impl<M: Send + 'static> NestedRoutes<M> {
    /// `parent` is the parent resource's path segment and `key` the
    /// relationship key the collection is exposed under.
    #[must_use]
    pub fn new(parent: &str, key: &str, items: Arc<ItemRoutes<M>>) -> Self {
        Self {
            inner: Collection::new(
                items,
                Scope::Nested {
                    parent: parent.to_owned(),
                    key: key.to_owned(),
                },
            ),
        }
    }

    #[must_use]
    pub fn add_getter<C, H>(mut self, handler: H) -> Self
    where
        C: Capabilities,
        H: Fn(&str, C, &SecurityContext) -> anyhow::Result<PageItems<M>> + Send + Sync + 'static,
    {
        self.inner.set_getter(move |parent, capabilities: C, identity| {
            handler(parent.unwrap_or_default(), capabilities, identity)
        });
        self
    }

    #[must_use]
    pub fn add_creator<B, C, H>(
        mut self,
        handler: H,
        permission: PermissionFn,
        form: Option<Form>,
    ) -> Self
    where
        B: DeserializeOwned,
        C: Capabilities,
        H: Fn(&str, B, C, &SecurityContext) -> anyhow::Result<M> + Send + Sync + 'static,
    {
        self.inner.set_creator(
            move |parent, input: B, capabilities: C, identity| {
                handler(parent.unwrap_or_default(), input, capabilities, identity)
            },
            permission,
            form,
        );
        self
    }

    #[must_use]
    pub fn add_batch_creator<B, C, H>(mut self, handler: H) -> Self
    where
        B: DeserializeOwned,
        C: Capabilities,
        H: Fn(&str, Vec<B>, C, &SecurityContext) -> anyhow::Result<Vec<M>> + Send + Sync + 'static,
    {
        self.inner
            .set_batch_creator(move |parent, inputs: Vec<B>, capabilities: C, identity| {
                handler(parent.unwrap_or_default(), inputs, capabilities, identity)
            });
        self
    }
}

impl<M> NestedRoutes<M> {
    #[must_use]
    pub fn path(&self, parent_id: &str) -> String {
        self.inner.path(Some(parent_id))
    }

    /// # Errors
    /// Any [`RouteError`] raised while resolving or running the getter.
    #[tracing::instrument(
        skip_all,
        fields(resource = %self.inner.resource(), operation = "list", parent = %parent_id)
    )]
    pub fn get(&self, ctx: RouteContext<'_>, parent_id: &str) -> Result<Page<M>, RouteError> {
        self.inner.get(ctx, Some(parent_id))
    }

    /// # Errors
    /// Any [`RouteError`] raised while resolving, authorizing, decoding or
    /// running the creator.
    #[tracing::instrument(
        skip_all,
        fields(resource = %self.inner.resource(), operation = "create", parent = %parent_id)
    )]
    pub fn create(
        &self,
        ctx: RouteContext<'_>,
        parent_id: &str,
        body: &Value,
    ) -> Result<SingleModel<M>, RouteError> {
        self.inner.create(ctx, Some(parent_id), body)
    }

    /// # Errors
    /// See [`CollectionRoutes::create_batch`](super::CollectionRoutes::create_batch).
    #[tracing::instrument(
        skip_all,
        fields(resource = %self.inner.resource(), operation = "create_batch", parent = %parent_id)
    )]
    pub fn create_batch(
        &self,
        ctx: RouteContext<'_>,
        parent_id: &str,
        body: &Value,
    ) -> Result<BatchResult, RouteError> {
        self.inner.create_batch(ctx, Some(parent_id), body)
    }

    #[must_use]
    pub fn operations(&self, parent_id: &str, identity: &SecurityContext) -> Vec<Operation> {
        self.inner.operations(Some(parent_id), identity)
    }

    #[must_use]
    pub fn describe(&self) -> Vec<OperationDescription> {
        self.inner.describe()
    }
}
