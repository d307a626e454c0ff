use crate::document::JsonObjectBuilder;
use crate::error::RouteError;
use crate::mapper::ErrorEvent;
use crate::problem::Problem;

use super::{WriterContext, Written};

/// Writes problem details through the error mapper.
pub struct ErrorWriter<'c, 'a> {
    ctx: &'c WriterContext<'a>,
}

impl<'c, 'a> ErrorWriter<'c, 'a> {
    #[must_use]
    pub fn new(ctx: &'c WriterContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn write(&self, problem: &Problem) -> Option<Written> {
        let ctx = self.ctx;
        let request = ctx.request();
        let Some(mapper) = ctx
            .mappers()
            .error
            .select(ctx.media_type(), request, ctx.default_media_type())
        else {
            tracing::debug!(media_type = ctx.media_type(), "no error mapper available");
            return None;
        };

        let mut document = JsonObjectBuilder::new();
        let mut events = vec![
            ErrorEvent::Start,
            ErrorEvent::Type(&problem.type_url),
            ErrorEvent::Title(&problem.title),
            ErrorEvent::Status(problem.status.as_u16()),
            ErrorEvent::Detail(&problem.detail),
        ];
        if let Some(instance) = &problem.instance {
            events.push(ErrorEvent::Instance(instance));
        }
        if let Some(trace_id) = &problem.trace_id {
            events.push(ErrorEvent::TraceId(trace_id));
        }
        events.push(ErrorEvent::Finish);

        for event in events {
            mapper.on_error(event, &mut document, request);
        }
        Some(ctx.written(mapper.media_type(), document.build()))
    }

    /// Map `err` to a problem for `instance` and write it.
    #[must_use]
    pub fn write_route_error(&self, err: &RouteError, instance: &str) -> Option<Written> {
        self.write(&Problem::from_route_error(err, instance))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::StatusCode;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::HyperkitConfig;
    use crate::mapper::Mappers;
    use crate::request::RequestContext;

    #[test]
    fn problem_media_type_is_honored() {
        let catalog = Catalog::builder().build();
        let mappers = Mappers::reference();
        let config = HyperkitConfig::default();
        let request = RequestContext::new(Url::parse("http://localhost/").unwrap());
        let ctx = WriterContext::new(&catalog, &mappers, &config, &request)
            .with_media_type("application/problem+json");

        let written = ErrorWriter::new(&ctx)
            .write(
                &Problem::new(StatusCode::NOT_FOUND, "Not Found", "no such person")
                    .with_instance("/people/9"),
            )
            .unwrap();

        assert_eq!(written.media_type(), "application/problem+json");
        assert_eq!(
            written.document(),
            &json!({
                "type": "about:blank",
                "title": "Not Found",
                "status": 404,
                "detail": "no such person",
                "instance": "/people/9"
            })
        );
    }
}
