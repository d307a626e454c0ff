use crate::document::JsonObjectBuilder;
use crate::mapper::DocumentationEvent;

use super::{WriterContext, Written};

/// Heading of the API documentation document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub title: String,
    pub description: Option<String>,
}

impl Documentation {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

/// Describes every catalog resource: types, fields, relationships and
/// registered operations.
pub struct DocumentationWriter<'c, 'a> {
    ctx: &'c WriterContext<'a>,
}

impl<'c, 'a> DocumentationWriter<'c, 'a> {
    #[must_use]
    pub fn new(ctx: &'c WriterContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn write(&self, documentation: &Documentation) -> Option<Written> {
        let ctx = self.ctx;
        let request = ctx.request();
        let Some(mapper) = ctx.mappers().documentation.select(
            ctx.media_type(),
            request,
            ctx.default_media_type(),
        ) else {
            tracing::debug!(media_type = ctx.media_type(), "no documentation mapper available");
            return None;
        };

        let mut document = JsonObjectBuilder::new();
        mapper.on_documentation(DocumentationEvent::Start, &mut document, request);
        mapper.on_documentation(
            DocumentationEvent::Title(&documentation.title),
            &mut document,
            request,
        );
        if let Some(description) = &documentation.description {
            mapper.on_documentation(
                DocumentationEvent::Description(description),
                &mut document,
                request,
            );
        }
        for resource in ctx.catalog().resources() {
            let url = request.absolute(&resource.name);
            mapper.on_documentation(
                DocumentationEvent::Resource {
                    description: &resource,
                    url: &url,
                },
                &mut document,
                request,
            );
        }
        mapper.on_documentation(DocumentationEvent::Finish, &mut document, request);

        Some(ctx.written(mapper.media_type(), document.build()))
    }
}
