//! Resource catalog.
//!
//! Writers look schemas and paths up through [`ResourceCatalog`]. [`Catalog`]
//! is the built-in implementation: an immutable snapshot assembled once at
//! startup and passed explicitly to whoever needs it.

use std::any::TypeId;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::ConfigError;
use crate::representor::{Representor, SchemaDescription};
use crate::routes::{OperationDescription, item_path};

/// Lookup contract between writers and the registered resources.
pub trait ResourceCatalog: Send + Sync {
    fn schema_for(&self, model: TypeId) -> Option<&Representor>;

    /// Resource name (collection path segment) of a model type.
    fn name_for(&self, model: TypeId) -> Option<&str>;

    /// Item path of `identifier`, relative to the API base.
    fn path_for(&self, identifier: &str, model: TypeId) -> Option<String> {
        self.name_for(model).map(|name| item_path(name, identifier))
    }

    /// Static description of every resource, in registration order.
    fn resources(&self) -> Vec<ResourceDescription>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescription {
    pub name: String,
    #[serde(flatten)]
    pub schema: SchemaDescription,
    pub operations: Vec<OperationDescription>,
}

struct Entry {
    name: String,
    schema: Representor,
    operations: Vec<OperationDescription>,
}

/// Immutable catalog snapshot.
pub struct Catalog {
    entries: Vec<Entry>,
    by_model: HashMap<TypeId, usize>,
}

impl Catalog {
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, model: TypeId) -> Option<&Entry> {
        self.by_model.get(&model).map(|&i| &self.entries[i])
    }
}

impl ResourceCatalog for Catalog {
    fn schema_for(&self, model: TypeId) -> Option<&Representor> {
        self.entry(model).map(|e| &e.schema)
    }

    fn name_for(&self, model: TypeId) -> Option<&str> {
        self.entry(model).map(|e| e.name.as_str())
    }

    fn resources(&self) -> Vec<ResourceDescription> {
        self.entries
            .iter()
            .map(|entry| {
                let mut schema = entry.schema.describe();
                for (relationship, described) in entry
                    .schema
                    .relationships()
                    .iter()
                    .zip(schema.relationships.iter_mut())
                {
                    described.target = self
                        .name_for(relationship.target().id())
                        .map(ToOwned::to_owned);
                }
                ResourceDescription {
                    name: entry.name.clone(),
                    schema,
                    operations: entry.operations.clone(),
                }
            })
            .collect()
    }
}

#[derive(Default)]
pub struct CatalogBuilder {
    entries: Vec<Entry>,
}

impl CatalogBuilder {
    /// Register `schema` under resource `name`.
    ///
    /// # Errors
    /// [`ConfigError::DuplicateResource`] when the name is taken and
    /// [`ConfigError::DuplicateModel`] when the schema's model type already
    /// has a resource.
    pub fn resource(mut self, name: &str, schema: Representor) -> Result<Self, ConfigError> {
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ConfigError::DuplicateResource {
                name: name.to_owned(),
            });
        }
        if let Some(existing) = self.entries.iter().find(|e| e.schema.model() == schema.model()) {
            return Err(ConfigError::DuplicateModel {
                model: schema.model().name(),
                name: existing.name.clone(),
            });
        }
        self.entries.push(Entry {
            name: name.to_owned(),
            schema,
            operations: Vec::new(),
        });
        Ok(self)
    }

    /// Attach registered operations to resource `name` for documentation.
    ///
    /// # Errors
    /// [`ConfigError::UnknownResource`] when `name` was not registered.
    pub fn operations(
        mut self,
        name: &str,
        operations: Vec<OperationDescription>,
    ) -> Result<Self, ConfigError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ConfigError::UnknownResource {
                name: name.to_owned(),
            })?;
        entry.operations.extend(operations);
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> Catalog {
        let by_model = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.schema.model().id(), i))
            .collect();
        tracing::debug!(resources = self.entries.len(), "catalog built");
        Catalog {
            entries: self.entries,
            by_model,
        }
    }
}
