//! Document writers.
//!
//! A writer walks a result (model, page, problem, documentation, batch)
//! and feeds the selected mapper one event at a time. The mapper decides the
//! JSON shape; the writer decides what is written and in which order.
//! Everything request-specific lives in [`WriterContext`].

pub mod batch;
pub mod documentation;
pub mod error;
pub mod page;
pub mod single;
mod walk;

use serde_json::Value;

pub use batch::BatchResultWriter;
pub use documentation::{Documentation, DocumentationWriter};
pub use error::ErrorWriter;
pub use page::PageWriter;
pub use single::SingleModelWriter;

use crate::catalog::ResourceCatalog;
use crate::config::HyperkitConfig;
use crate::mapper::Mappers;
use crate::projection::{AcceptLanguage, Embedded, Fields, Projection};
use crate::request::RequestContext;

/// Per-request inputs shared by all writers.
pub struct WriterContext<'a> {
    catalog: &'a dyn ResourceCatalog,
    mappers: &'a Mappers,
    config: &'a HyperkitConfig,
    request: &'a RequestContext,
    projection: Projection,
    languages: AcceptLanguage,
    media_type: String,
}

impl<'a> WriterContext<'a> {
    /// Read the projection directives and accepted languages from `request`
    /// and negotiate the media type against the registered model mappers.
    #[must_use]
    pub fn new(
        catalog: &'a dyn ResourceCatalog,
        mappers: &'a Mappers,
        config: &'a HyperkitConfig,
        request: &'a RequestContext,
    ) -> Self {
        Self {
            catalog,
            mappers,
            config,
            request,
            projection: Projection {
                fields: Fields::from_request(request),
                embedded: Embedded::from_request(request),
                max_depth: config.embedding.max_depth,
            },
            languages: AcceptLanguage::from_headers(request.headers()),
            media_type: mappers.negotiate(request, &config.default_media_type),
        }
    }

    /// Override the negotiated media type.
    #[must_use]
    pub fn with_media_type(mut self, media_type: &str) -> Self {
        media_type.clone_into(&mut self.media_type);
        self
    }

    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    #[must_use]
    pub fn with_languages(mut self, languages: AcceptLanguage) -> Self {
        self.languages = languages;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &'a dyn ResourceCatalog {
        self.catalog
    }

    #[must_use]
    pub fn mappers(&self) -> &'a Mappers {
        self.mappers
    }

    #[must_use]
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[must_use]
    pub fn languages(&self) -> &AcceptLanguage {
        &self.languages
    }

    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    #[must_use]
    pub fn default_media_type(&self) -> &str {
        &self.config.default_media_type
    }

    pub(crate) fn written(&self, media_type: &str, document: Value) -> Written {
        Written {
            media_type: media_type.to_owned(),
            document,
            pretty: self.config.pretty_print,
        }
    }
}

/// A finished document and the media type of the mapper that shaped it.
#[derive(Debug, Clone, PartialEq)]
pub struct Written {
    media_type: String,
    document: Value,
    pretty: bool,
}

impl Written {
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> Value {
        self.document
    }

    /// Serialized body, indented when `pretty_print` is configured.
    #[must_use]
    pub fn render(&self) -> String {
        if self.pretty {
            serde_json::to_string_pretty(&self.document)
                .unwrap_or_else(|_| self.document.to_string())
        } else {
            self.document.to_string()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::HeaderValue;
    use http::header::{ACCEPT, ACCEPT_LANGUAGE};
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn context_reads_request_directives() {
        let catalog = Catalog::builder().build();
        let mappers = Mappers::reference();
        let config = HyperkitConfig::default();
        let request = RequestContext::new(Url::parse("http://localhost/api/").unwrap())
            .with_query("fields[Person]=name&embedded=employer")
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_header(ACCEPT_LANGUAGE, HeaderValue::from_static("de-CH, en;q=0.5"));

        let ctx = WriterContext::new(&catalog, &mappers, &config, &request);

        assert_eq!(ctx.media_type(), "application/json");
        assert_eq!(ctx.languages().tags(), ["de-CH", "en"]);
        assert!(!ctx.projection().fields.should_emit(&["Person".to_owned()], "age"));
        assert!(ctx.projection().embedded.accepts("employer"));
        assert_eq!(ctx.projection().max_depth, Some(8));

        let ctx = ctx.with_media_type("application/hal+json");
        assert_eq!(ctx.media_type(), "application/hal+json");
    }

    #[test]
    fn render_honors_pretty_print() {
        let catalog = Catalog::builder().build();
        let mappers = Mappers::reference();
        let mut config = HyperkitConfig::default();
        let request = RequestContext::new(Url::parse("http://localhost/").unwrap());

        let ctx = WriterContext::new(&catalog, &mappers, &config, &request);
        assert_eq!(ctx.written("application/json", json!({"a": 1})).render(), "{\n  \"a\": 1\n}");

        config.pretty_print = false;
        let ctx = WriterContext::new(&catalog, &mappers, &config, &request);
        assert_eq!(ctx.written("application/json", json!({"a": 1})).render(), "{\"a\":1}");
    }
}
