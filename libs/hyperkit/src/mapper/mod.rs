//! Media-type mappers.
//!
//! A mapper turns writer events into the JSON shape of one media type. Each
//! document kind has its own trait with a single event callback whose default
//! does nothing, so a mapper only matches the events it cares about.
//! [`MapperRegistry`] picks the mapper for a request and [`Mappers`] bundles
//! one registry per document kind.

pub mod event;
pub mod hal;
pub mod plain;
pub mod problem;

use std::sync::Arc;

use http::header::ACCEPT;
use mime::Mime;

pub use event::{BatchEvent, DocumentationEvent, ErrorEvent, ModelEvent, PageEvent};
pub use hal::HalMapper;
pub use plain::PlainJsonMapper;
pub use problem::ProblemJsonMapper;

use crate::document::JsonObjectBuilder;
use crate::error::ConfigError;
use crate::request::RequestContext;

/// What every mapper declares about itself.
pub trait MediaTypeMapper: Send + Sync {
    fn media_type(&self) -> &str;

    /// Whether this mapper can serve `request`. Consulted after the media
    /// type matched.
    fn supports(&self, _request: &RequestContext) -> bool {
        true
    }
}

pub trait ModelMapper: MediaTypeMapper {
    fn on_model(
        &self,
        _event: ModelEvent<'_>,
        _document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
    }
}

pub trait PageMapper: MediaTypeMapper {
    fn on_page(
        &self,
        _event: PageEvent<'_>,
        _document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
    }
}

pub trait ErrorMapper: MediaTypeMapper {
    fn on_error(
        &self,
        _event: ErrorEvent<'_>,
        _document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
    }
}

pub trait DocumentationMapper: MediaTypeMapper {
    fn on_documentation(
        &self,
        _event: DocumentationEvent<'_>,
        _document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
    }
}

pub trait BatchMapper: MediaTypeMapper {
    fn on_batch(
        &self,
        _event: BatchEvent<'_>,
        _document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
    }
}

/// `type/subtype` without parameters, lowercased.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Mappers of one document kind, in registration order.
pub struct MapperRegistry<T: ?Sized> {
    kind: &'static str,
    mappers: Vec<Arc<T>>,
}

impl<T: ?Sized + MediaTypeMapper> MapperRegistry<T> {
    /// `kind` names the document kind in configuration errors.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            mappers: Vec::new(),
        }
    }

    /// Append a mapper. Earlier registrations win on equal media types.
    pub fn register(&mut self, mapper: Arc<T>) {
        tracing::debug!(kind = self.kind, media_type = mapper.media_type(), "mapper registered");
        self.mappers.push(mapper);
    }

    #[must_use]
    pub fn with(mut self, mapper: Arc<T>) -> Self {
        self.register(mapper);
        self
    }

    #[must_use]
    pub fn handles(&self, media_type: &str) -> bool {
        let wanted = essence(media_type);
        self.mappers.iter().any(|m| essence(m.media_type()) == wanted)
    }

    fn find(&self, media_type: &str, request: &RequestContext) -> Option<&T> {
        let wanted = essence(media_type);
        self.mappers
            .iter()
            .find(|m| essence(m.media_type()) == wanted && m.supports(request))
            .map(AsRef::as_ref)
    }

    /// First mapper for `media_type` that supports `request`, falling back
    /// to the mapper for `default_media_type`.
    #[must_use]
    pub fn select(
        &self,
        media_type: &str,
        request: &RequestContext,
        default_media_type: &str,
    ) -> Option<&T> {
        self.find(media_type, request).or_else(|| {
            tracing::debug!(
                kind = self.kind,
                media_type,
                default_media_type,
                "no matching mapper, using default"
            );
            self.find(default_media_type, request)
        })
    }

    /// # Errors
    /// [`ConfigError::MissingDefaultMapper`] when nothing is registered for
    /// `default_media_type`.
    pub fn validate(&self, default_media_type: &str) -> Result<(), ConfigError> {
        if self.handles(default_media_type) {
            Ok(())
        } else {
            Err(ConfigError::MissingDefaultMapper {
                kind: self.kind,
                media_type: default_media_type.to_owned(),
            })
        }
    }
}

/// One registry per document kind.
pub struct Mappers {
    pub model: MapperRegistry<dyn ModelMapper>,
    pub page: MapperRegistry<dyn PageMapper>,
    pub error: MapperRegistry<dyn ErrorMapper>,
    pub documentation: MapperRegistry<dyn DocumentationMapper>,
    pub batch: MapperRegistry<dyn BatchMapper>,
}

impl Default for Mappers {
    fn default() -> Self {
        Self::new()
    }
}

impl Mappers {
    /// Empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: MapperRegistry::new("model"),
            page: MapperRegistry::new("page"),
            error: MapperRegistry::new("error"),
            documentation: MapperRegistry::new("documentation"),
            batch: MapperRegistry::new("batch"),
        }
    }

    /// The bundled HAL, plain JSON and problem details mappers.
    #[must_use]
    pub fn reference() -> Self {
        let hal = Arc::new(HalMapper);
        let plain = Arc::new(PlainJsonMapper);
        let problem = Arc::new(ProblemJsonMapper);

        Self {
            model: MapperRegistry::<dyn ModelMapper>::new("model")
                .with(hal.clone())
                .with(plain.clone()),
            page: MapperRegistry::<dyn PageMapper>::new("page")
                .with(hal.clone())
                .with(plain.clone()),
            error: MapperRegistry::<dyn ErrorMapper>::new("error")
                .with(problem)
                .with(hal.clone())
                .with(plain.clone()),
            documentation: MapperRegistry::<dyn DocumentationMapper>::new("documentation")
                .with(hal.clone())
                .with(plain.clone()),
            batch: MapperRegistry::<dyn BatchMapper>::new("batch")
                .with(hal)
                .with(plain),
        }
    }

    /// Check every registry has a mapper for the default media type.
    ///
    /// # Errors
    /// The first [`ConfigError::MissingDefaultMapper`] found.
    pub fn validate(&self, default_media_type: &str) -> Result<(), ConfigError> {
        self.model.validate(default_media_type)?;
        self.page.validate(default_media_type)?;
        self.error.validate(default_media_type)?;
        self.documentation.validate(default_media_type)?;
        self.batch.validate(default_media_type)
    }

    /// Pick the media type for a resource response from the `Accept`
    /// header: highest weight first, header order among equals, wildcards
    /// and unknown types skipped. Falls back to `default_media_type`.
    #[must_use]
    pub fn negotiate(&self, request: &RequestContext, default_media_type: &str) -> String {
        let mut accepted: Vec<(Mime, f32)> = request
            .headers()
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(|entry| entry.trim().parse::<Mime>().ok())
            .map(|mime| {
                let q = mime
                    .get_param("q")
                    .and_then(|q| q.as_str().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (mime, q)
            })
            .filter(|(_, q)| *q > 0.0)
            .collect();
        accepted.sort_by(|a, b| b.1.total_cmp(&a.1));

        accepted
            .iter()
            .map(|(mime, _)| mime.essence_str())
            .find(|candidate| self.model.handles(candidate))
            .map_or_else(|| default_media_type.to_owned(), ToOwned::to_owned)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::HeaderValue;
    use url::Url;

    use super::*;

    struct Picky;

    impl MediaTypeMapper for Picky {
        fn media_type(&self) -> &str {
            "application/json"
        }

        fn supports(&self, request: &RequestContext) -> bool {
            request.query_param("picky").is_some()
        }
    }

    impl ModelMapper for Picky {}

    fn request(accept: Option<&'static str>) -> RequestContext {
        let request = RequestContext::new(Url::parse("http://localhost/api/").unwrap());
        match accept {
            Some(value) => request.with_header(ACCEPT, HeaderValue::from_static(value)),
            None => request,
        }
    }

    #[test]
    fn select_falls_back_to_default() {
        let registry = MapperRegistry::<dyn ModelMapper>::new("model")
            .with(Arc::new(HalMapper))
            .with(Arc::new(PlainJsonMapper));
        let req = request(None);

        let chosen = registry.select("text/csv", &req, "application/hal+json").unwrap();
        assert_eq!(chosen.media_type(), "application/hal+json");

        let chosen = registry
            .select("Application/JSON; charset=utf-8", &req, "application/hal+json")
            .unwrap();
        assert_eq!(chosen.media_type(), "application/json");
    }

    #[test]
    fn select_skips_mappers_that_decline() {
        let registry = MapperRegistry::<dyn ModelMapper>::new("model")
            .with(Arc::new(Picky))
            .with(Arc::new(PlainJsonMapper));

        let plain = request(None);
        let picky = plain.clone().with_query("picky=1");

        // Both answer to application/json; only the second accepts any request.
        assert!(registry.select("application/json", &plain, "application/json").is_some());
        assert!(registry.select("application/json", &picky, "application/json").is_some());
        assert!(registry.select("application/json", &plain, "text/plain").is_some());
        assert!(registry.select("text/plain", &plain, "text/html").is_none());
    }

    #[test]
    fn validate_requires_default_mapper() {
        let mappers = Mappers::reference();
        assert!(mappers.validate("application/hal+json").is_ok());
        assert!(mappers.validate("application/json").is_ok());

        let err = mappers.validate("application/problem+json").unwrap_err();
        assert!(matches!(err, ConfigError::MissingDefaultMapper { kind: "model", .. }));

        assert!(Mappers::new().validate("application/json").is_err());
    }

    #[test]
    fn reference_bundle_covers_every_document_kind() {
        let mappers = Mappers::reference();

        for media_type in ["application/hal+json", "application/json"] {
            assert!(mappers.model.handles(media_type));
            assert!(mappers.page.handles(media_type));
            assert!(mappers.error.handles(media_type));
            assert!(mappers.documentation.handles(media_type));
            assert!(mappers.batch.handles(media_type));
        }
        assert!(mappers.error.handles("application/problem+json"));
        assert!(!mappers.model.handles("application/problem+json"));
    }

    #[test]
    fn negotiates_by_weight() {
        let mappers = Mappers::reference();
        let default = "application/hal+json";

        let req = request(Some("text/html, application/json;q=0.5, application/hal+json;q=0.9"));
        assert_eq!(mappers.negotiate(&req, default), "application/hal+json");

        let req = request(Some("text/html, application/json;q=0.5"));
        assert_eq!(mappers.negotiate(&req, default), "application/json");

        assert_eq!(mappers.negotiate(&request(Some("*/*")), default), default);
        assert_eq!(mappers.negotiate(&request(None), default), default);
    }
}
