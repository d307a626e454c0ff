use std::any::Any;

use crate::document::JsonObjectBuilder;
use crate::mapper::{ModelEvent, ModelMapper};
use crate::projection::EmbeddedPath;
use crate::representor::{Relationship, Representor};
use crate::routes::Operation;

use super::WriterContext;

/// A related model after projection: inline or by reference.
enum Related<'s> {
    Embedded {
        key: &'s str,
        url: String,
        schema: &'s Representor,
        model: Box<dyn Any>,
    },
    Linked {
        key: &'s str,
        url: String,
    },
}

/// Where the model being walked sits: its schema, its item path and its
/// position in the embedded graph.
pub(super) struct Subject<'s> {
    pub model: &'s dyn Any,
    pub schema: &'s Representor,
    pub path: String,
    pub embedded: EmbeddedPath,
}

/// Walks one model's schema and feeds `mapper`.
pub(super) struct Walker<'c, 'a> {
    ctx: &'c WriterContext<'a>,
    mapper: &'a dyn ModelMapper,
}

impl<'c, 'a> Walker<'c, 'a> {
    pub(super) fn new(ctx: &'c WriterContext<'a>, mapper: &'a dyn ModelMapper) -> Self {
        Self { ctx, mapper }
    }

    /// Schema and item path of `model`, or `None` when the catalog cannot
    /// place it.
    pub(super) fn locate<'s>(&self, model: &'s dyn Any) -> Option<Subject<'s>>
    where
        'a: 's,
    {
        let type_id = model.type_id();
        let catalog = self.ctx.catalog();
        let Some(schema) = catalog.schema_for(type_id) else {
            tracing::debug!("no schema registered for model, skipping");
            return None;
        };
        let Some(path) = schema
            .identifier(model)
            .and_then(|id| catalog.path_for(&id, type_id))
        else {
            tracing::debug!(types = ?schema.types(), "model has no resolvable path, skipping");
            return None;
        };
        Some(Subject {
            model,
            schema,
            path,
            embedded: EmbeddedPath::root(),
        })
    }

    fn emit(&self, event: ModelEvent<'_>, document: &mut JsonObjectBuilder) {
        self.mapper.on_model(event, document, self.ctx.request());
    }

    /// Write `subject` and, recursively, whatever it embeds.
    pub(super) fn write(
        &self,
        subject: &Subject<'_>,
        operations: &[Operation],
        document: &mut JsonObjectBuilder,
    ) {
        self.emit(ModelEvent::Start, document);
        self.write_attributes(subject, document);
        self.write_relationships(subject, document);
        self.write_operations(operations, document);
        self.emit(ModelEvent::Finish, document);
    }

    /// Fields, links, types, binaries and the self URL.
    fn write_attributes(&self, subject: &Subject<'_>, document: &mut JsonObjectBuilder) {
        let request = self.ctx.request();
        let projection = self.ctx.projection();
        let schema = subject.schema;
        let types = schema.types();

        for field in schema.fields().iter().filter(|f| projection.should_emit(types, f.key())) {
            if let Some(value) = field
                .read(subject.model)
                .and_then(|v| v.to_json(self.ctx.languages()))
            {
                self.emit(ModelEvent::Field { key: field.key(), value }, document);
            }
        }

        for link in schema.links().iter().filter(|l| projection.should_emit(types, l.key())) {
            if let Some(url) = link.read(subject.model) {
                self.emit(ModelEvent::Link { key: link.key(), url: &url }, document);
            }
        }

        self.emit(ModelEvent::Types { types }, document);

        for key in schema.binaries().iter().filter(|k| projection.should_emit(types, k)) {
            let url = request.absolute(&format!("{}/{key}", subject.path));
            self.emit(ModelEvent::Binary { key, url: &url }, document);
        }

        let self_url = request.absolute(&subject.path);
        self.emit(ModelEvent::SelfUrl { url: &self_url }, document);
    }

    /// Embedded models first, then linked models, then related collections.
    fn write_relationships(&self, subject: &Subject<'_>, document: &mut JsonObjectBuilder) {
        let request = self.ctx.request();
        let related = self.related(subject);

        for entry in &related {
            if let Related::Embedded { key, url, schema, model } = entry {
                let child = Subject {
                    model: model.as_ref(),
                    schema,
                    path: url.clone(),
                    embedded: subject.embedded.append(key),
                };
                let mut embedded = JsonObjectBuilder::new();
                self.write(&child, &[], &mut embedded);
                let url = request.absolute(url);
                self.emit(
                    ModelEvent::Embedded {
                        key,
                        url: &url,
                        document: embedded,
                    },
                    document,
                );
            }
        }

        for entry in &related {
            if let Related::Linked { key, url } = entry {
                let url = request.absolute(url);
                self.emit(ModelEvent::Linked { key, url: &url }, document);
            }
        }

        let types = subject.schema.types();
        for relationship in subject.schema.relationships() {
            if let Relationship::Collection { key, .. } = relationship
                && self.ctx.projection().should_emit(types, key)
            {
                let url = request.absolute(&format!("{}/{key}", subject.path));
                self.emit(ModelEvent::RelatedCollection { key, url: &url }, document);
            }
        }
    }

    fn write_operations(&self, operations: &[Operation], document: &mut JsonObjectBuilder) {
        let request = self.ctx.request();
        for operation in operations {
            let target = request.absolute(operation.target());
            let expects = operation.form().map(|f| request.absolute(&f.path()));
            self.emit(
                ModelEvent::OperationStarted {
                    operation,
                    target: &target,
                    expects: expects.as_deref(),
                },
                document,
            );
            self.emit(ModelEvent::OperationFinished { operation }, document);
        }
    }

    /// Resolve and classify the single-model relationships the fieldset
    /// keeps. Each one is decided once, so a relationship is never both
    /// inlined and linked.
    fn related<'s>(&self, subject: &Subject<'s>) -> Vec<Related<'s>>
    where
        'a: 's,
    {
        let catalog = self.ctx.catalog();
        let projection = self.ctx.projection();
        let types = subject.schema.types();

        subject
            .schema
            .relationships()
            .iter()
            .filter_map(|relationship| {
                let Relationship::Model { key, target, .. } = relationship else {
                    return None;
                };
                if !projection.should_emit(types, key) {
                    return None;
                }
                let related = subject.schema.resolve_related(subject.model, key)?;
                let Some(schema) = catalog.schema_for(target.id()) else {
                    tracing::debug!(
                        key = %key,
                        target = target.name(),
                        "related model has no schema, omitting"
                    );
                    return None;
                };
                let Some(url) = schema
                    .identifier(related.as_ref())
                    .and_then(|id| catalog.path_for(&id, target.id()))
                else {
                    tracing::debug!(
                        key = %key,
                        target = target.name(),
                        "related model has no path, omitting"
                    );
                    return None;
                };
                let key = key.as_str();
                if projection.should_embed(&subject.embedded, key) {
                    Some(Related::Embedded {
                        key,
                        url,
                        schema,
                        model: related,
                    })
                } else {
                    Some(Related::Linked { key, url })
                }
            })
            .collect()
    }
}
