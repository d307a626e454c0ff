use std::sync::Arc;

use http::Method;
use hyperkit_security::SecurityContext;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::form::{Form, decode_body};
use super::item::ItemRoutes;
use super::operation::{Operation, OperationDescription, OperationKind};
use super::permission::{PermissionFn, is_permitted};
use super::resource::{BatchResult, Page, PageItems, SingleModel};
use super::{RouteContext, ensure_permitted, handler_failed, nested_path};
use crate::error::RouteError;
use crate::providers::{Capabilities, resolve};

type PageFn<M> = Box<
    dyn Fn(RouteContext<'_>, Option<&str>) -> Result<(PageItems<M>, SecurityContext), RouteError>
        + Send
        + Sync,
>;
type CreateFn<M> = Box<
    dyn Fn(
            RouteContext<'_>,
            Option<&str>,
            Option<&Value>,
        ) -> Result<(M, SecurityContext), RouteError>
        + Send
        + Sync,
>;
type BatchFn<M> = Box<
    dyn Fn(RouteContext<'_>, Option<&str>, Option<&Form>, &[Value]) -> Result<Vec<M>, RouteError>
        + Send
        + Sync,
>;

/// Where a collection lives.
pub(crate) enum Scope {
    Root,
    Nested { parent: String, key: String },
}

struct Creator<M> {
    invoke: CreateFn<M>,
    permission: PermissionFn,
    form: Option<Arc<Form>>,
}

/// Shared machinery behind [`CollectionRoutes`] and
/// [`NestedRoutes`](super::NestedRoutes). The parent identifier is `None`
/// for root collections.
pub(crate) struct Collection<M> {
    items: Arc<ItemRoutes<M>>,
    scope: Scope,
    getter: Option<PageFn<M>>,
    creator: Option<Creator<M>>,
    batch: Option<BatchFn<M>>,
}

impl<M: Send + 'static> Collection<M> {
    pub(crate) fn new(items: Arc<ItemRoutes<M>>, scope: Scope) -> Self {
        Self {
            items,
            scope,
            getter: None,
            creator: None,
            batch: None,
        }
    }

    pub(crate) fn set_getter<C, H>(&mut self, handler: H)
    where
        C: Capabilities,
        H: Fn(Option<&str>, C, &SecurityContext) -> anyhow::Result<PageItems<M>>
            + Send
            + Sync
            + 'static,
    {
        let operation = self.operation_name("list");
        self.getter = Some(erase_page(move |ctx, parent| {
            let (capabilities, identity) = resolve::<C>(ctx.registry, ctx.request)?;
            let page = handler(parent, capabilities, &identity)
                .map_err(|e| handler_failed(&operation, e))?;
            Ok((page, identity))
        }));
    }

    pub(crate) fn set_creator<B, C, H>(
        &mut self,
        handler: H,
        permission: PermissionFn,
        form: Option<Form>,
    ) where
        B: DeserializeOwned,
        C: Capabilities,
        H: Fn(Option<&str>, B, C, &SecurityContext) -> anyhow::Result<M> + Send + Sync + 'static,
    {
        let operation = self.operation_name(OperationKind::Create.name());
        let form = form.map(Arc::new);
        let body_form = form.clone();
        let gate = Arc::clone(&permission);
        self.creator = Some(Creator {
            invoke: erase_create(move |ctx, parent, body| {
                let (capabilities, identity) = resolve::<C>(ctx.registry, ctx.request)?;
                ensure_permitted(&gate, &identity, parent, &operation)?;
                let input: B = decode_body(body_form.as_deref(), body)?;
                let model = handler(parent, input, capabilities, &identity)
                    .map_err(|e| handler_failed(&operation, e))?;
                Ok((model, identity))
            }),
            permission,
            form,
        });
    }

    /// Replace the element-by-element batch with a dedicated handler. It is
    /// gated by the creator's permission and validates every element against
    /// the creator's form, both looked up when the batch runs.
    pub(crate) fn set_batch_creator<B, C, H>(&mut self, handler: H)
    where
        B: DeserializeOwned,
        C: Capabilities,
        H: Fn(Option<&str>, Vec<B>, C, &SecurityContext) -> anyhow::Result<Vec<M>>
            + Send
            + Sync
            + 'static,
    {
        let operation = self.operation_name("create_batch");
        self.batch = Some(erase_batch(move |ctx, parent, form, elements| {
            let (capabilities, identity) = resolve::<C>(ctx.registry, ctx.request)?;
            let inputs = elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    decode_body::<B>(form, Some(element))
                        .map_err(|e| RouteError::batch_element_failed(index, e))
                })
                .collect::<Result<Vec<_>, _>>()?;
            handler(parent, inputs, capabilities, &identity)
                .map_err(|e| handler_failed(&operation, e))
        }));
    }
}

impl<M> Collection<M> {
    pub(crate) fn resource(&self) -> &str {
        self.items.resource()
    }

    pub(crate) fn path(&self, parent: Option<&str>) -> String {
        match (&self.scope, parent) {
            (Scope::Nested { parent: resource, key }, Some(parent_id)) => {
                nested_path(resource, parent_id, key)
            }
            _ => self.items.resource().to_owned(),
        }
    }

    fn operation_name(&self, operation: &str) -> String {
        match &self.scope {
            Scope::Root => format!("{}.{operation}", self.items.resource()),
            Scope::Nested { parent, key } => format!("{parent}.{key}.{operation}"),
        }
    }

    fn scope_label(&self) -> String {
        match &self.scope {
            Scope::Root => "collection".to_owned(),
            Scope::Nested { key, .. } => format!("nested:{key}"),
        }
    }

    pub(crate) fn get(
        &self,
        ctx: RouteContext<'_>,
        parent: Option<&str>,
    ) -> Result<Page<M>, RouteError> {
        let getter = self
            .getter
            .as_ref()
            .ok_or_else(|| RouteError::operation_not_registered(self.operation_name("list")))?;
        let (page, identity) = getter(ctx, parent)?;
        let total = page.total();
        let items = page
            .into_items()
            .into_iter()
            .map(|model| self.items.wrap(model, &identity))
            .collect();
        Ok(Page::new(
            items,
            total,
            ctx.pagination(),
            self.path(parent),
            self.operations(parent, &identity),
        ))
    }

    pub(crate) fn create(
        &self,
        ctx: RouteContext<'_>,
        parent: Option<&str>,
        body: &Value,
    ) -> Result<SingleModel<M>, RouteError> {
        let creator = self.creator()?;
        let (model, identity) = (creator.invoke)(ctx, parent, Some(body))?;
        Ok(self.items.wrap(model, &identity))
    }

    /// Create every element of a JSON array, stopping at the first failure.
    /// Elements created before the failure stay created.
    pub(crate) fn create_batch(
        &self,
        ctx: RouteContext<'_>,
        parent: Option<&str>,
        body: &Value,
    ) -> Result<BatchResult, RouteError> {
        let Some(elements) = body.as_array() else {
            return Err(RouteError::bad_request("batch body must be a JSON array"));
        };
        let creator = self.creator()?;
        let ((), identity) = resolve::<()>(ctx.registry, ctx.request)?;
        let operation = self.operation_name(OperationKind::Create.name());
        ensure_permitted(&creator.permission, &identity, parent, &operation)?;

        let models = if let Some(batch) = &self.batch {
            batch(ctx, parent, creator.form.as_deref(), elements)?
        } else {
            let mut models = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                let (model, _) = (creator.invoke)(ctx, parent, Some(element)).map_err(|e| {
                    tracing::debug!(index, error = %e, "batch element failed");
                    RouteError::batch_element_failed(index, e)
                })?;
                models.push(model);
            }
            models
        };

        let identifiers: Vec<String> = models.iter().map(|m| self.items.identify(m)).collect();
        let item_paths = identifiers.iter().map(|id| self.items.path(id)).collect();
        Ok(BatchResult::new(self.path(parent), identifiers, item_paths))
    }

    fn creator(&self) -> Result<&Creator<M>, RouteError> {
        self.creator.as_ref().ok_or_else(|| {
            RouteError::operation_not_registered(self.operation_name(OperationKind::Create.name()))
        })
    }

    pub(crate) fn operations(
        &self,
        parent: Option<&str>,
        identity: &SecurityContext,
    ) -> Vec<Operation> {
        let Some(creator) = &self.creator else {
            return Vec::new();
        };
        let operation = self.operation_name(OperationKind::Create.name());
        if is_permitted(&creator.permission, identity, parent, &operation) {
            vec![Operation::new(
                OperationKind::Create,
                Method::POST,
                self.path(parent),
                creator.form.clone(),
            )]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn describe(&self) -> Vec<OperationDescription> {
        let scope = self.scope_label();
        let mut out = Vec::new();
        if self.getter.is_some() {
            out.push(OperationDescription {
                name: "list".to_owned(),
                method: Method::GET.as_str().to_owned(),
                scope: scope.clone(),
                form: None,
            });
        }
        if let Some(creator) = &self.creator {
            out.push(OperationDescription::new(
                &OperationKind::Create,
                &Method::POST,
                &scope,
                creator.form.as_deref(),
            ));
        }
        out
    }
}

/// Routes of a top-level collection.
pub struct CollectionRoutes<M> {
    inner: Collection<M>,
}

impl<M: Send + 'static> CollectionRoutes<M> {
    #[must_use]
    pub fn new(items: Arc<ItemRoutes<M>>) -> Self {
        Self {
            inner: Collection::new(items, Scope::Root),
        }
    }

    #[must_use]
    pub fn add_getter<C, H>(mut self, handler: H) -> Self
    where
        C: Capabilities,
        H: Fn(C, &SecurityContext) -> anyhow::Result<PageItems<M>> + Send + Sync + 'static,
    {
        self.inner
            .set_getter(move |_, capabilities: C, identity: &SecurityContext| {
                handler(capabilities, identity)
            });
        self
    }

    /// Create handler, advertised as the collection's create operation when
    /// `permission(identity, None)` holds. Batch creates map it over the
    /// input unless [`add_batch_creator`](Self::add_batch_creator) is used.
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
        H: Fn(B, C, &SecurityContext) -> anyhow::Result<M> + Send + Sync + 'static,
    {
        self.inner.set_creator(
            move |_, input: B, capabilities: C, identity: &SecurityContext| {
                handler(input, capabilities, identity)
            },
            permission,
            form,
        );
        self
    }

    /// Dedicated batch handler sharing the creator's permission and form.
    /// Without a creator, batch creates fail as not registered.
    #[must_use]
    pub fn add_batch_creator<B, C, H>(mut self, handler: H) -> Self
    where
        B: DeserializeOwned,
        C: Capabilities,
        H: Fn(Vec<B>, C, &SecurityContext) -> anyhow::Result<Vec<M>> + Send + Sync + 'static,
    {
        self.inner.set_batch_creator(
            move |_, inputs: Vec<B>, capabilities: C, identity: &SecurityContext| {
                handler(inputs, capabilities, identity)
            },
        );
        self
    }
}

impl<M> CollectionRoutes<M> {
    #[must_use]
    pub fn resource(&self) -> &str {
        self.inner.resource()
    }

    /// # Errors
    /// Any [`RouteError`] raised while resolving or running the getter.
    #[tracing::instrument(skip_all, fields(resource = %self.resource(), operation = "list"))]
    pub fn get(&self, ctx: RouteContext<'_>) -> Result<Page<M>, RouteError> {
        self.inner.get(ctx, None)
    }

    /// # Errors
    /// Any [`RouteError`] raised while resolving, authorizing, decoding or
    /// running the creator.
    #[tracing::instrument(skip_all, fields(resource = %self.resource(), operation = "create"))]
    pub fn create(
        &self,
        ctx: RouteContext<'_>,
        body: &Value,
    ) -> Result<SingleModel<M>, RouteError> {
        self.inner.create(ctx, None, body)
    }

    /// # Errors
    /// [`RouteError::BatchElementFailed`] carrying the zero-based index of
    /// the first failing element, or any error raised before the first
    /// element ran.
    #[tracing::instrument(
        skip_all,
        fields(resource = %self.resource(), operation = "create_batch")
    )]
    pub fn create_batch(
        &self,
        ctx: RouteContext<'_>,
        body: &Value,
    ) -> Result<BatchResult, RouteError> {
        self.inner.create_batch(ctx, None, body)
    }

    /// Collection-level operations `identity` may perform.
    #[must_use]
    pub fn operations(&self, identity: &SecurityContext) -> Vec<Operation> {
        self.inner.operations(None, identity)
    }

    #[must_use]
    pub fn describe(&self) -> Vec<OperationDescription> {
        self.inner.describe()
    }
}

fn erase_page<M, F>(f: F) -> PageFn<M>
where
    F: Fn(RouteContext<'_>, Option<&str>) -> Result<(PageItems<M>, SecurityContext), RouteError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn erase_create<M, F>(f: F) -> CreateFn<M>
where
    F: Fn(
            RouteContext<'_>,
            Option<&str>,
            Option<&Value>,
        ) -> Result<(M, SecurityContext), RouteError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn erase_batch<M, F>(f: F) -> BatchFn<M>
where
    F: Fn(RouteContext<'_>, Option<&str>, Option<&Form>, &[Value]) -> Result<Vec<M>, RouteError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}
