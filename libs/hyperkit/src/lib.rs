#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Hypermedia resource engine.
//!
//! Routes ([`routes`]) resolve handler inputs through a [`ProviderRegistry`],
//! gate write operations behind permission evaluators and wrap results with
//! the operations the caller may perform. Writers ([`writer`]) then walk the
//! registered [`Representor`] schemas, apply the client's sparse fieldsets
//! and embedding directive, and feed events to a media-type [`mapper`] that
//! assembles the JSON document.
//!
//! The transport stays outside: it builds a [`RequestContext`], calls the
//! routes, and hands the result to a writer.

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod mapper;
pub mod pagination;
pub mod problem;
pub mod projection;
pub mod providers;
pub mod representor;
pub mod request;
pub mod routes;
pub mod writer;

pub use catalog::{Catalog, CatalogBuilder, ResourceCatalog, ResourceDescription};
pub use config::HyperkitConfig;
pub use document::{ArrayStep, FieldStep, JsonObjectBuilder};
pub use error::{ConfigError, RouteError};
pub use hyperkit_security::SecurityContext;
pub use mapper::{MapperRegistry, Mappers};
pub use pagination::Pagination;
pub use problem::Problem;
pub use providers::{CapabilityKey, ProviderRegistry, Providers};
pub use representor::{FieldKind, Representor};
pub use request::RequestContext;
pub use routes::{CollectionRoutes, ItemRoutes, NestedRoutes, RouteContext};
pub use writer::{WriterContext, Written};
