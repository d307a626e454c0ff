use std::any::Any;

use crate::document::JsonObjectBuilder;
use crate::routes::SingleModel;

use super::walk::Walker;
use super::{WriterContext, Written};

/// Writes one resource with its embedded graph and operations.
pub struct SingleModelWriter<'c, 'a> {
    ctx: &'c WriterContext<'a>,
}

impl<'c, 'a> SingleModelWriter<'c, 'a> {
    #[must_use]
    pub fn new(ctx: &'c WriterContext<'a>) -> Self {
        Self { ctx }
    }

    /// `None` when no mapper is available or the catalog has no schema or
    /// path for the model's type.
    #[must_use]
    pub fn write<M: Any>(&self, resource: &SingleModel<M>) -> Option<Written> {
        let ctx = self.ctx;
        let Some(mapper) = ctx.mappers().model.select(
            ctx.media_type(),
            ctx.request(),
            ctx.default_media_type(),
        ) else {
            tracing::debug!(media_type = ctx.media_type(), "no model mapper available");
            return None;
        };

        let walker = Walker::new(ctx, mapper);
        let subject = walker.locate(resource.model())?;
        let mut document = JsonObjectBuilder::new();
        walker.write(&subject, resource.operations(), &mut document);

        Some(ctx.written(mapper.media_type(), document.build()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::HeaderValue;
    use http::header::ACCEPT_LANGUAGE;
    use serde_json::json;
    use tracing_test::traced_test;
    use url::Url;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::HyperkitConfig;
    use crate::mapper::Mappers;
    use crate::projection::LocalizedString;
    use crate::representor::Representor;
    use crate::request::RequestContext;

    struct Country {
        code: String,
        name: LocalizedString,
    }

    struct City {
        id: u32,
        name: String,
        country: Option<Country>,
    }

    struct Unregistered;

    fn catalog() -> Catalog {
        let cities = Representor::builder::<City>()
            .types(&["City"])
            .identifier(|c| c.id.to_string())
            .field("name", |c| c.name.clone())
            .related::<Country, _>("country", |c| {
                c.country.as_ref().map(|k| Country {
                    code: k.code.clone(),
                    name: k.name.clone(),
                })
            })
            .binary("map")
            .build()
            .unwrap();
        let countries = Representor::builder::<Country>()
            .types(&["Country"])
            .identifier(|c| c.code.clone())
            .field("name", |c| c.name.clone())
            .build()
            .unwrap();
        Catalog::builder()
            .resource("cities", cities)
            .unwrap()
            .resource("countries", countries)
            .unwrap()
            .build()
    }

    fn zurich() -> City {
        City {
            id: 1,
            name: "Zurich".to_owned(),
            country: Some(Country {
                code: "ch".to_owned(),
                name: LocalizedString::new()
                    .with("en", "Switzerland")
                    .with("de", "Schweiz"),
            }),
        }
    }

    #[test]
    fn embeds_with_localized_fields() {
        let catalog = catalog();
        let mappers = Mappers::reference();
        let config = HyperkitConfig::default();
        let request = RequestContext::new(Url::parse("http://localhost/api").unwrap())
            .with_query("embedded=country")
            .with_header(ACCEPT_LANGUAGE, HeaderValue::from_static("de-CH"));
        let ctx = WriterContext::new(&catalog, &mappers, &config, &request)
            .with_media_type("application/json");

        let written = SingleModelWriter::new(&ctx)
            .write(&SingleModel::new(zurich(), Vec::new()))
            .unwrap();

        assert_eq!(written.media_type(), "application/json");
        assert_eq!(
            written.document(),
            &json!({
                "name": "Zurich",
                "types": ["City"],
                "map": "http://localhost/api/cities/1/map",
                "self": "http://localhost/api/cities/1",
                "country": {
                    "name": "Schweiz",
                    "types": ["Country"],
                    "self": "http://localhost/api/countries/ch"
                }
            })
        );
    }

    #[test]
    #[traced_test]
    fn unknown_model_writes_nothing() {
        let catalog = catalog();
        let mappers = Mappers::reference();
        let config = HyperkitConfig::default();
        let request = RequestContext::new(Url::parse("http://localhost/").unwrap());
        let ctx = WriterContext::new(&catalog, &mappers, &config, &request);

        let written =
            SingleModelWriter::new(&ctx).write(&SingleModel::new(Unregistered, Vec::new()));

        assert!(written.is_none());
        assert!(logs_contain("no schema registered for model"));
    }

    #[test]
    #[traced_test]
    fn depth_ceiling_degrades_to_link() {
        let catalog = catalog();
        let mappers = Mappers::reference();
        let mut config = HyperkitConfig::default();
        config.embedding.max_depth = Some(0);
        let request = RequestContext::new(Url::parse("http://localhost/").unwrap())
            .with_query("embedded=country");
        let ctx = WriterContext::new(&catalog, &mappers, &config, &request)
            .with_media_type("application/json");

        let written = SingleModelWriter::new(&ctx)
            .write(&SingleModel::new(zurich(), Vec::new()))
            .unwrap();

        assert_eq!(written.document()["country"], json!("http://localhost/countries/ch"));
        assert!(logs_contain("embedding depth ceiling reached"));
    }
}
