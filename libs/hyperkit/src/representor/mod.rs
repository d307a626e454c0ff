//! Resource schemas.
//!
//! A [`Representor`] describes how one model type appears as a resource:
//! its type names, how to read its identifier and which fields, links,
//! binaries and relationships it exposes. Schemas are assembled once through
//! the typed [`RepresentorBuilder`] and then shared read-only; the writer
//! pipeline only sees the type-erased form.

pub mod value;

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

pub use value::{FieldKind, FieldValue, IntoFieldValue, IntoNumber};

use crate::error::ConfigError;

/// Keys the reference mappers write next to a resource's own entries.
pub const RESERVED_KEYS: &[&str] = &["self", "types", "operations", "_links", "_embedded"];

type IdentifierFn = Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;
type FieldFn = Box<dyn Fn(&dyn Any) -> Option<FieldValue> + Send + Sync>;
type LinkFn = Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;
type ResolveFn = Box<dyn Fn(&dyn Any) -> Option<Box<dyn Any>> + Send + Sync>;

/// Runtime tag of a model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelType {
    id: TypeId,
    name: &'static str,
}

impl ModelType {
    #[must_use]
    pub fn of<M: Any>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

pub struct FieldEntry {
    key: String,
    kind: FieldKind,
    read: FieldFn,
}

impl FieldEntry {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub fn read(&self, model: &dyn Any) -> Option<FieldValue> {
        (self.read)(model)
    }
}

pub struct LinkEntry {
    key: String,
    read: LinkFn,
}

impl LinkEntry {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Absolute URL of the link, if the model has one.
    #[must_use]
    pub fn read(&self, model: &dyn Any) -> Option<String> {
        (self.read)(model)
    }
}

/// A relationship to another resource.
pub enum Relationship {
    /// A single related resource, inlined or linked.
    Model {
        key: String,
        target: ModelType,
        resolve: ResolveFn,
    },
    /// A nested collection, always linked.
    Collection { key: String, target: ModelType },
}

impl Relationship {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Model { key, .. } | Self::Collection { key, .. } => key,
        }
    }

    #[must_use]
    pub fn target(&self) -> ModelType {
        match self {
            Self::Model { target, .. } | Self::Collection { target, .. } => *target,
        }
    }
}

impl fmt::Debug for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Model { .. } => "Model",
            Self::Collection { .. } => "Collection",
        };
        f.debug_struct(kind)
            .field("key", &self.key())
            .field("target", &self.target().name())
            .finish()
    }
}

/// Type-erased schema of one resource type.
pub struct Representor {
    model: ModelType,
    types: Vec<String>,
    identifier: IdentifierFn,
    fields: Vec<FieldEntry>,
    links: Vec<LinkEntry>,
    binaries: Vec<String>,
    relationships: Vec<Relationship>,
}

impl Representor {
    #[must_use]
    pub fn builder<M: Any>() -> RepresentorBuilder<M> {
        RepresentorBuilder::new()
    }

    #[must_use]
    pub fn model(&self) -> ModelType {
        self.model
    }

    /// Type names, most specific first.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Identifier of `model`, or `None` when it is not this schema's type.
    #[must_use]
    pub fn identifier(&self, model: &dyn Any) -> Option<String> {
        (self.identifier)(model)
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    #[must_use]
    pub fn links(&self) -> &[LinkEntry] {
        &self.links
    }

    #[must_use]
    pub fn binaries(&self) -> &[String] {
        &self.binaries
    }

    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Resolve relationship `key` of `model` to the related model.
    #[must_use]
    pub fn resolve_related(&self, model: &dyn Any, key: &str) -> Option<Box<dyn Any>> {
        self.relationships.iter().find_map(|r| match r {
            Relationship::Model { key: k, resolve, .. } if k == key => resolve(model),
            Relationship::Model { .. } | Relationship::Collection { .. } => None,
        })
    }

    /// Static description used by documentation writers.
    #[must_use]
    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            types: self.types.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldDescription {
                    key: f.key.clone(),
                    kind: f.kind,
                })
                .chain(self.binaries.iter().map(|key| FieldDescription {
                    key: key.clone(),
                    kind: FieldKind::Binary,
                }))
                .collect(),
            links: self.links.iter().map(|l| l.key.clone()).collect(),
            relationships: self
                .relationships
                .iter()
                .map(|r| RelationshipDescription {
                    key: r.key().to_owned(),
                    collection: matches!(r, Relationship::Collection { .. }),
                    target: None,
                })
                .collect(),
        }
    }
}

impl fmt::Debug for Representor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representor")
            .field("model", &self.model.name())
            .field("types", &self.types)
            .field("fields", &self.fields.iter().map(|e| &e.key).collect::<Vec<_>>())
            .field("links", &self.links.iter().map(|e| &e.key).collect::<Vec<_>>())
            .field("binaries", &self.binaries)
            .field("relationships", &self.relationships)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDescription {
    pub types: Vec<String>,
    pub fields: Vec<FieldDescription>,
    pub links: Vec<String>,
    pub relationships: Vec<RelationshipDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescription {
    pub key: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipDescription {
    pub key: String,
    pub collection: bool,
    /// Resource name of the target, filled in by the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Typed builder for a [`Representor`] of model `M`.
///
/// ```ignore
/// let schema = Representor::builder::<Person>()
///     .types(&["Person"])
///     .identifier(|p| p.id.to_string())
///     .field("name", |p| p.name.clone())
///     .related::<Company, _>("employer", |p| p.employer.clone())
///     .build()?;
/// ```
pub struct RepresentorBuilder<M> {
    types: Vec<String>,
    identifier: Option<IdentifierFn>,
    fields: Vec<FieldEntry>,
    links: Vec<LinkEntry>,
    binaries: Vec<String>,
    relationships: Vec<Relationship>,
    model: PhantomData<fn(&M)>,
}

impl<M: Any> RepresentorBuilder<M> {
    fn new() -> Self {
        Self {
            types: Vec::new(),
            identifier: None,
            fields: Vec::new(),
            links: Vec::new(),
            binaries: Vec::new(),
            relationships: Vec::new(),
            model: PhantomData,
        }
    }

    /// Type names, most specific first.
    #[must_use]
    pub fn types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn identifier<F>(mut self, read: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        self.identifier = Some(Box::new(move |m: &dyn Any| m.downcast_ref::<M>().map(&read)));
        self
    }

    /// Scalar, list or localized field. The kind follows from `V`.
    #[must_use]
    pub fn field<V, F>(mut self, key: &str, read: F) -> Self
    where
        V: IntoFieldValue,
        F: Fn(&M) -> V + Send + Sync + 'static,
    {
        self.fields.push(FieldEntry {
            key: key.to_owned(),
            kind: V::KIND,
            read: Box::new(move |m: &dyn Any| {
                m.downcast_ref::<M>().and_then(|m| read(m).into_field_value())
            }),
        });
        self
    }

    /// Link to an external URL.
    #[must_use]
    pub fn link<F>(mut self, key: &str, read: F) -> Self
    where
        F: Fn(&M) -> Option<String> + Send + Sync + 'static,
    {
        self.links.push(LinkEntry {
            key: key.to_owned(),
            read: Box::new(move |m: &dyn Any| m.downcast_ref::<M>().and_then(&read)),
        });
        self
    }

    /// Binary content served below the resource's own path.
    #[must_use]
    pub fn binary(mut self, key: &str) -> Self {
        self.binaries.push(key.to_owned());
        self
    }

    /// Single related resource of type `T`.
    #[must_use]
    pub fn related<T, F>(mut self, key: &str, resolve: F) -> Self
    where
        T: Any,
        F: Fn(&M) -> Option<T> + Send + Sync + 'static,
    {
        self.relationships.push(Relationship::Model {
            key: key.to_owned(),
            target: ModelType::of::<T>(),
            resolve: Box::new(move |m: &dyn Any| {
                m.downcast_ref::<M>()
                    .and_then(&resolve)
                    .map(|t| Box::new(t) as Box<dyn Any>)
            }),
        });
        self
    }

    /// Nested collection of `T` resources.
    #[must_use]
    pub fn related_collection<T: Any>(mut self, key: &str) -> Self {
        self.relationships.push(Relationship::Collection {
            key: key.to_owned(),
            target: ModelType::of::<T>(),
        });
        self
    }

    /// # Errors
    /// [`ConfigError::MissingTypes`] when no type name was given and
    /// [`ConfigError::DuplicateKey`] when two entries share a key and
    /// [`ConfigError::ReservedKey`] when an entry uses one of [`RESERVED_KEYS`].
    pub fn build(self) -> Result<Representor, ConfigError> {
        let model = ModelType::of::<M>();
        if self.types.is_empty() {
            return Err(ConfigError::MissingTypes { model: model.name() });
        }

        let mut seen = HashSet::new();
        let keys = self
            .fields
            .iter()
            .map(|f| f.key.as_str())
            .chain(self.links.iter().map(|l| l.key.as_str()))
            .chain(self.binaries.iter().map(String::as_str))
            .chain(self.relationships.iter().map(Relationship::key));
        for key in keys {
            if RESERVED_KEYS.contains(&key) {
                return Err(ConfigError::ReservedKey {
                    resource: self.types[0].clone(),
                    key: key.to_owned(),
                });
            }
            if !seen.insert(key) {
                return Err(ConfigError::DuplicateKey {
                    resource: self.types[0].clone(),
                    key: key.to_owned(),
                });
            }
        }

        let identifier: IdentifierFn = match self.identifier {
            Some(read) => read,
            None => Box::new(|_: &dyn Any| None),
        };
        Ok(Representor {
            model,
            types: self.types,
            identifier,
            fields: self.fields,
            links: self.links,
            binaries: self.binaries,
            relationships: self.relationships,
        })
    }
}
