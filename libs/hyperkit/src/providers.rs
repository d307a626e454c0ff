//! Typed capability lookup.
//!
//! Handlers declare the contextual values they need as a tuple of
//! [`Capability`] types. At invocation the composer turns the tuple into an
//! ordered list of [`CapabilityKey`]s, appends the caller identity and folds
//! the list through a [`ProviderRegistry`]. The first missing value aborts the
//! invocation with [`RouteError::DependencyUnavailable`].

use std::any::{Any, TypeId};
use std::fmt;
use std::iter;
use std::sync::Arc;

use dashmap::DashMap;
use hyperkit_security::SecurityContext;

use crate::config::HyperkitConfig;
use crate::error::RouteError;
use crate::pagination::Pagination;
use crate::projection::{AcceptLanguage, Embedded, Fields};
use crate::request::RequestContext;

/// A value produced by a provider, owned by the request that asked for it.
pub type ProvidedValue = Box<dyn Any + Send>;

/// Anything a provider can hand to a handler.
pub trait Capability: Send + 'static {}

impl<T: Send + 'static> Capability for T {}

/// Type tag identifying a kind of contextual value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    id: TypeId,
    name: &'static str,
}

impl CapabilityKey {
    #[must_use]
    pub fn of<T: Capability>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Source of capability values.
pub trait ProviderRegistry: Send + Sync {
    /// Produce the value for `key`, or `None` when it cannot be supplied for
    /// this request.
    fn lookup(&self, key: CapabilityKey, request: &RequestContext) -> Option<ProvidedValue>;
}

type ProviderFn = Arc<dyn Fn(&RequestContext) -> Option<ProvidedValue> + Send + Sync>;

/// Concurrent provider registry.
///
/// Backed by a `DashMap` so providers registered after startup become visible
/// to in-flight lookups without a lock around the whole table.
#[derive(Default)]
pub struct Providers {
    by_key: DashMap<CapabilityKey, ProviderFn>,
}

impl Providers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in providers: caller identity
    /// (anonymous when the request carries none), pagination, accepted
    /// languages, sparse fieldsets and the embedding directive.
    #[must_use]
    pub fn with_defaults(config: &HyperkitConfig) -> Self {
        let providers = Self::new();
        providers.register(|request| {
            Some(
                request
                    .extensions()
                    .get::<SecurityContext>()
                    .cloned()
                    .unwrap_or_else(SecurityContext::anonymous),
            )
        });
        let pagination = config.pagination;
        providers.register(move |request| Some(Pagination::from_request(request, &pagination)));
        providers.register(|request| Some(AcceptLanguage::from_headers(request.headers())));
        providers.register(|request| Some(Fields::from_request(request)));
        providers.register(|request| Some(Embedded::from_request(request)));
        providers
    }

    /// Register (or replace) the provider for `T`.
    pub fn register<T, F>(&self, provider: F)
    where
        T: Capability,
        F: Fn(&RequestContext) -> Option<T> + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<T>();
        let erased: ProviderFn =
            Arc::new(move |request| provider(request).map(|v| Box::new(v) as ProvidedValue));
        if self.by_key.insert(key, erased).is_some() {
            tracing::debug!(capability = key.name(), "provider replaced");
        }
    }

    #[must_use]
    pub fn contains(&self, key: CapabilityKey) -> bool {
        self.by_key.contains_key(&key)
    }
}

impl ProviderRegistry for Providers {
    fn lookup(&self, key: CapabilityKey, request: &RequestContext) -> Option<ProvidedValue> {
        // Clone the provider out so no shard guard is held while it runs.
        let provider = self.by_key.get(&key).map(|p| Arc::clone(p.value()))?;
        provider(request)
    }
}

/// An ordered tuple of capabilities, arity 0 to 4.
pub trait Capabilities: Sized + 'static {
    fn keys() -> Vec<CapabilityKey>;

    /// Rebuild the tuple from values in key order.
    fn from_values(values: Vec<ProvidedValue>) -> Option<Self>;
}

impl Capabilities for () {
    fn keys() -> Vec<CapabilityKey> {
        Vec::new()
    }

    fn from_values(values: Vec<ProvidedValue>) -> Option<Self> {
        values.is_empty().then_some(())
    }
}

macro_rules! impl_capabilities {
    ($($name:ident),+) => {
        impl<$($name: Capability),+> Capabilities for ($($name,)+) {
            fn keys() -> Vec<CapabilityKey> {
                vec![$(CapabilityKey::of::<$name>()),+]
            }

            #[allow(non_snake_case)]
            fn from_values(values: Vec<ProvidedValue>) -> Option<Self> {
                let mut values = values.into_iter();
                $(let $name = *values.next()?.downcast::<$name>().ok()?;)+
                Some(($($name,)+))
            }
        }
    };
}

impl_capabilities!(A);
impl_capabilities!(A, B);
impl_capabilities!(A, B, C);
impl_capabilities!(A, B, C, D);

/// Resolve `C` plus the caller identity.
///
/// # Errors
/// [`RouteError::DependencyUnavailable`] naming the first capability the
/// registry could not supply.
pub fn resolve<C: Capabilities>(
    registry: &dyn ProviderRegistry,
    request: &RequestContext,
) -> Result<(C, SecurityContext), RouteError> {
    let mut values = C::keys()
        .into_iter()
        .chain(iter::once(CapabilityKey::of::<SecurityContext>()))
        .try_fold(Vec::new(), |mut acc, key| {
            let value = registry.lookup(key, request).ok_or_else(|| {
                tracing::debug!(capability = key.name(), "capability not available");
                RouteError::dependency_unavailable(key.name())
            })?;
            acc.push(value);
            Ok::<_, RouteError>(acc)
        })?;

    let identity = values
        .pop()
        .and_then(|v| v.downcast::<SecurityContext>().ok())
        .ok_or_else(|| {
            RouteError::dependency_unavailable(CapabilityKey::of::<SecurityContext>().name())
        })?;
    let capabilities = C::from_values(values)
        .ok_or_else(|| RouteError::dependency_unavailable(std::any::type_name::<C>()))?;
    Ok((capabilities, *identity))
}
