use std::sync::Arc;

use http::Method;
use hyperkit_security::SecurityContext;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::form::{Form, decode_body};
use super::operation::{Operation, OperationDescription, OperationKind};
use super::permission::{PermissionFn, is_permitted};
use super::resource::SingleModel;
use super::{RouteContext, ensure_permitted, handler_failed, item_path};
use crate::error::RouteError;
use crate::providers::{Capabilities, resolve};

type IdentifyFn<M> = Arc<dyn Fn(&M) -> String + Send + Sync>;
type GetFn<M> =
    Box<dyn Fn(RouteContext<'_>, &str) -> Result<(M, SecurityContext), RouteError> + Send + Sync>;
type WriteFn<M> = Box<
    dyn Fn(RouteContext<'_>, &str, Option<&Value>) -> Result<(M, SecurityContext), RouteError>
        + Send
        + Sync,
>;
type RemoveFn = Box<dyn Fn(RouteContext<'_>, &str) -> Result<(), RouteError> + Send + Sync>;

struct Gated<F> {
    invoke: F,
    permission: PermissionFn,
    form: Option<Arc<Form>>,
}

struct Custom<M> {
    name: String,
    method: Method,
    gated: Gated<WriteFn<M>>,
}

/// Item-level routes of one resource.
pub struct ItemRoutes<M> {
    resource: String,
    identify: IdentifyFn<M>,
    getter: Option<GetFn<M>>,
    updater: Option<Gated<WriteFn<M>>>,
    remover: Option<Gated<RemoveFn>>,
    customs: Vec<Custom<M>>,
}

impl<M: Send + 'static> ItemRoutes<M> {
    /// `resource` is the collection path segment; `identify` reads the
    /// identifier used in item paths and permission checks.
    #[must_use]
    pub fn new<I>(resource: &str, identify: I) -> Self
    where
        I: Fn(&M) -> String + Send + Sync + 'static,
    {
        Self {
            resource: resource.to_owned(),
            identify: Arc::new(identify),
            getter: None,
            updater: None,
            remover: None,
            customs: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_getter<C, H>(mut self, handler: H) -> Self
    where
        C: Capabilities,
        H: Fn(&str, C, &SecurityContext) -> anyhow::Result<M> + Send + Sync + 'static,
    {
        let operation = self.operation_name("get");
        self.getter = Some(erase_get(move |ctx, id| {
            let (capabilities, identity) = resolve::<C>(ctx.registry, ctx.request)?;
            let model =
                handler(id, capabilities, &identity).map_err(|e| handler_failed(&operation, e))?;
            Ok((model, identity))
        }));
        self
    }

    #[must_use]
    pub fn add_updater<B, C, H>(
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
        let operation = self.operation_name(OperationKind::Update.name());
        self.updater = Some(gated_write(operation, handler, permission, form));
        self
    }

    #[must_use]
    pub fn add_remover<C, H>(mut self, handler: H, permission: PermissionFn) -> Self
    where
        C: Capabilities,
        H: Fn(&str, C, &SecurityContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let operation = self.operation_name(OperationKind::Delete.name());
        let gate = Arc::clone(&permission);
        self.remover = Some(Gated {
            invoke: erase_remove(move |ctx, id| {
                let (capabilities, identity) = resolve::<C>(ctx.registry, ctx.request)?;
                ensure_permitted(&gate, &identity, Some(id), &operation)?;
                handler(id, capabilities, &identity).map_err(|e| handler_failed(&operation, e))
            }),
            permission,
            form: None,
        });
        self
    }

    /// Named item action, advertised as a custom operation targeting
    /// `{item}/{name}`.
    #[must_use]
    pub fn add_custom<B, C, H>(
        mut self,
        name: &str,
        method: Method,
        handler: H,
        permission: PermissionFn,
        form: Option<Form>,
    ) -> Self
    where
        B: DeserializeOwned,
        C: Capabilities,
        H: Fn(&str, B, C, &SecurityContext) -> anyhow::Result<M> + Send + Sync + 'static,
    {
        let operation = self.operation_name(name);
        self.customs.retain(|c| c.name != name);
        self.customs.push(Custom {
            name: name.to_owned(),
            method,
            gated: gated_write(operation, handler, permission, form),
        });
        self
    }

    /// Share the routes with collection and nested routes of the same model.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<M> ItemRoutes<M> {
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn identify(&self, model: &M) -> String {
        (self.identify)(model)
    }

    #[must_use]
    pub fn path(&self, id: &str) -> String {
        item_path(&self.resource, id)
    }

    fn operation_name(&self, operation: &str) -> String {
        format!("{}.{operation}", self.resource)
    }

    /// # Errors
    /// Any [`RouteError`] raised while resolving or running the getter;
    /// [`RouteError::OperationNotRegistered`] when none was added.
    #[tracing::instrument(skip_all, fields(resource = %self.resource, operation = "get", id = %id))]
    pub fn get(&self, ctx: RouteContext<'_>, id: &str) -> Result<SingleModel<M>, RouteError> {
        let getter = self
            .getter
            .as_ref()
            .ok_or_else(|| RouteError::operation_not_registered(self.operation_name("get")))?;
        let (model, identity) = getter(ctx, id)?;
        Ok(self.wrap(model, &identity))
    }

    /// # Errors
    /// As [`get`](Self::get), plus [`RouteError::PermissionDenied`] and
    /// [`RouteError::BadRequest`].
    #[tracing::instrument(
        skip_all,
        fields(resource = %self.resource, operation = "update", id = %id)
    )]
    pub fn update(
        &self,
        ctx: RouteContext<'_>,
        id: &str,
        body: &Value,
    ) -> Result<SingleModel<M>, RouteError> {
        let updater = self.updater.as_ref().ok_or_else(|| {
            RouteError::operation_not_registered(self.operation_name(OperationKind::Update.name()))
        })?;
        let (model, identity) = (updater.invoke)(ctx, id, Some(body))?;
        Ok(self.wrap(model, &identity))
    }

    /// # Errors
    /// As [`update`](Self::update).
    #[tracing::instrument(
        skip_all,
        fields(resource = %self.resource, operation = "delete", id = %id)
    )]
    pub fn remove(&self, ctx: RouteContext<'_>, id: &str) -> Result<(), RouteError> {
        let remover = self.remover.as_ref().ok_or_else(|| {
            RouteError::operation_not_registered(self.operation_name(OperationKind::Delete.name()))
        })?;
        (remover.invoke)(ctx, id)
    }

    /// Run the custom action `name`.
    ///
    /// # Errors
    /// As [`update`](Self::update).
    #[tracing::instrument(skip_all, fields(resource = %self.resource, operation = %name, id = %id))]
    pub fn invoke(
        &self,
        name: &str,
        ctx: RouteContext<'_>,
        id: &str,
        body: Option<&Value>,
    ) -> Result<SingleModel<M>, RouteError> {
        let custom = self
            .customs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RouteError::operation_not_registered(self.operation_name(name)))?;
        let (model, identity) = (custom.gated.invoke)(ctx, id, body)?;
        Ok(self.wrap(model, &identity))
    }

    /// Operations `identity` may currently perform on item `id`.
    ///
    /// Every evaluator runs on each call; nothing is cached.
    #[must_use]
    pub fn operations(&self, id: &str, identity: &SecurityContext) -> Vec<Operation> {
        let path = self.path(id);
        let mut operations = Vec::new();

        if let Some(updater) = &self.updater {
            let name = self.operation_name(OperationKind::Update.name());
            if is_permitted(&updater.permission, identity, Some(id), &name) {
                operations.push(Operation::new(
                    OperationKind::Update,
                    Method::PUT,
                    path.clone(),
                    updater.form.clone(),
                ));
            }
        }
        if let Some(remover) = &self.remover {
            let name = self.operation_name(OperationKind::Delete.name());
            if is_permitted(&remover.permission, identity, Some(id), &name) {
                operations.push(Operation::new(
                    OperationKind::Delete,
                    Method::DELETE,
                    path.clone(),
                    None,
                ));
            }
        }
        for custom in &self.customs {
            let name = self.operation_name(&custom.name);
            if is_permitted(&custom.gated.permission, identity, Some(id), &name) {
                operations.push(Operation::new(
                    OperationKind::Custom(custom.name.clone()),
                    custom.method.clone(),
                    format!("{path}/{}", custom.name),
                    custom.gated.form.clone(),
                ));
            }
        }
        operations
    }

    /// Pair `model` with the operations `identity` may perform on it.
    #[must_use]
    pub fn wrap(&self, model: M, identity: &SecurityContext) -> SingleModel<M> {
        let id = self.identify(&model);
        let operations = self.operations(&id, identity);
        SingleModel::new(model, operations)
    }

    /// Registered item operations, for documentation.
    #[must_use]
    pub fn describe(&self) -> Vec<OperationDescription> {
        let mut out = Vec::new();
        if self.getter.is_some() {
            out.push(OperationDescription {
                name: "get".to_owned(),
                method: Method::GET.as_str().to_owned(),
                scope: "item".to_owned(),
                form: None,
            });
        }
        if let Some(updater) = &self.updater {
            out.push(OperationDescription::new(
                &OperationKind::Update,
                &Method::PUT,
                "item",
                updater.form.as_deref(),
            ));
        }
        if self.remover.is_some() {
            out.push(OperationDescription::new(
                &OperationKind::Delete,
                &Method::DELETE,
                "item",
                None,
            ));
        }
        for custom in &self.customs {
            out.push(OperationDescription::new(
                &OperationKind::Custom(custom.name.clone()),
                &custom.method,
                "item",
                custom.gated.form.as_deref(),
            ));
        }
        out
    }
}

fn gated_write<M, B, C, H>(
    operation: String,
    handler: H,
    permission: PermissionFn,
    form: Option<Form>,
) -> Gated<WriteFn<M>>
where
    M: 'static,
    B: DeserializeOwned,
    C: Capabilities,
    H: Fn(&str, B, C, &SecurityContext) -> anyhow::Result<M> + Send + Sync + 'static,
{
    let form = form.map(Arc::new);
    let gate = Arc::clone(&permission);
    let body_form = form.clone();
    Gated {
        invoke: erase_write(move |ctx, id, body| {
            let (capabilities, identity) = resolve::<C>(ctx.registry, ctx.request)?;
            ensure_permitted(&gate, &identity, Some(id), &operation)?;
            let input: B = decode_body(body_form.as_deref(), body)?;
            let model = handler(id, input, capabilities, &identity)
                .map_err(|e| handler_failed(&operation, e))?;
            Ok((model, identity))
        }),
        permission,
        form,
    }
}

fn erase_get<M, F>(f: F) -> GetFn<M>
where
    F: Fn(RouteContext<'_>, &str) -> Result<(M, SecurityContext), RouteError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn erase_write<M, F>(f: F) -> WriteFn<M>
where
    F: Fn(RouteContext<'_>, &str, Option<&Value>) -> Result<(M, SecurityContext), RouteError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn erase_remove<F>(f: F) -> RemoveFn
where
    F: Fn(RouteContext<'_>, &str) -> Result<(), RouteError> + Send + Sync + 'static,
{
    Box::new(f)
}
