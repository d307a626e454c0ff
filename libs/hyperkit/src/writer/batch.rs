use crate::document::JsonObjectBuilder;
use crate::mapper::BatchEvent;
use crate::routes::BatchResult;

use super::{WriterContext, Written};

/// Writes the collection URL and one item URL per created resource.
pub struct BatchResultWriter<'c, 'a> {
    ctx: &'c WriterContext<'a>,
}

impl<'c, 'a> BatchResultWriter<'c, 'a> {
    #[must_use]
    pub fn new(ctx: &'c WriterContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn write(&self, result: &BatchResult) -> Option<Written> {
        let ctx = self.ctx;
        let request = ctx.request();
        let Some(mapper) = ctx
            .mappers()
            .batch
            .select(ctx.media_type(), request, ctx.default_media_type())
        else {
            tracing::debug!(media_type = ctx.media_type(), "no batch mapper available");
            return None;
        };

        let mut document = JsonObjectBuilder::new();
        mapper.on_batch(BatchEvent::Start, &mut document, request);
        let collection = request.absolute(result.path());
        mapper.on_batch(BatchEvent::CollectionUrl(&collection), &mut document, request);
        for (index, (identifier, path)) in result
            .identifiers()
            .iter()
            .zip(result.item_paths())
            .enumerate()
        {
            let url = request.absolute(path);
            mapper.on_batch(
                BatchEvent::Item {
                    index,
                    identifier,
                    url: &url,
                },
                &mut document,
                request,
            );
        }
        mapper.on_batch(BatchEvent::Finish, &mut document, request);

        Some(ctx.written(mapper.media_type(), document.build()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::HyperkitConfig;
    use crate::mapper::Mappers;
    use crate::request::RequestContext;

    #[test]
    fn writes_item_urls_in_order() {
        let catalog = Catalog::builder().build();
        let mappers = Mappers::reference();
        let config = HyperkitConfig::default();
        let request = RequestContext::new(Url::parse("http://localhost/").unwrap());
        let ctx = WriterContext::new(&catalog, &mappers, &config, &request)
            .with_media_type("application/json");
        let result = BatchResult::new(
            "people".to_owned(),
            vec!["1".to_owned(), "2".to_owned()],
            vec!["people/1".to_owned(), "people/2".to_owned()],
        );

        let written = BatchResultWriter::new(&ctx).write(&result).unwrap();

        assert_eq!(
            written.document(),
            &json!({
                "collection": "http://localhost/people",
                "items": ["http://localhost/people/1", "http://localhost/people/2"]
            })
        );
    }
}
