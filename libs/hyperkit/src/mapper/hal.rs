//! HAL (`application/hal+json`).
//!
//! Links go under `_links` as `{"href": ...}` objects and inlined resources
//! under `_embedded`. Types and operations have no HAL representation; the
//! mapper leaves those events to the no-op default.

use crate::document::JsonObjectBuilder;
use crate::request::RequestContext;

use super::plain::write_documentation_event;
use super::problem::write_problem_event;
use super::{
    BatchEvent, BatchMapper, DocumentationEvent, DocumentationMapper, ErrorEvent, ErrorMapper,
    MediaTypeMapper, ModelEvent, ModelMapper, PageEvent, PageMapper,
};

pub const HAL_JSON: &str = "application/hal+json";

const LINKS: &str = "_links";
const EMBEDDED: &str = "_embedded";

#[derive(Debug, Clone, Copy, Default)]
pub struct HalMapper;

fn link(document: &mut JsonObjectBuilder, rel: &str, href: &str) {
    document.field(LINKS).field(rel).field("href").string_value(href);
}

impl MediaTypeMapper for HalMapper {
    fn media_type(&self) -> &str {
        HAL_JSON
    }
}

impl ModelMapper for HalMapper {
    fn on_model(
        &self,
        event: ModelEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        match event {
            ModelEvent::Field { key, value } => document.field(key).value(value),
            ModelEvent::Link { key, url }
            | ModelEvent::Binary { key, url }
            | ModelEvent::Linked { key, url }
            | ModelEvent::RelatedCollection { key, url } => link(document, key, url),
            ModelEvent::SelfUrl { url } => link(document, "self", url),
            ModelEvent::Embedded { key, document: embedded, .. } => {
                document.field(EMBEDDED).field(key).object_value(embedded);
            }
            _ => {}
        }
    }
}

impl PageMapper for HalMapper {
    fn on_page(
        &self,
        event: PageEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        match event {
            PageEvent::Start => {
                document.field(EMBEDDED).field("items").array_value();
            }
            PageEvent::TotalCount(total) => document.field("total").number_value(total),
            PageEvent::ItemCount(count) => document.field("count").number_value(count),
            PageEvent::CollectionUrl(url) => link(document, "self", url),
            PageEvent::FirstPage(url) => link(document, "first", url),
            PageEvent::CurrentPage(url) => link(document, "current", url),
            PageEvent::LastPage(url) => link(document, "last", url),
            PageEvent::NextPage(url) => link(document, "next", url),
            PageEvent::PreviousPage(url) => link(document, "prev", url),
            PageEvent::ItemFinished { document: item, .. } => {
                document.field(EMBEDDED).field("items").array_value().push_object(item);
            }
            _ => {}
        }
    }
}

impl ErrorMapper for HalMapper {
    fn on_error(
        &self,
        event: ErrorEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        write_problem_event(event, document);
    }
}

impl DocumentationMapper for HalMapper {
    fn on_documentation(
        &self,
        event: DocumentationEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        if let DocumentationEvent::Resource { description, url } = event {
            link(document, &description.name, url);
        }
        write_documentation_event(event, document);
    }
}

impl BatchMapper for HalMapper {
    fn on_batch(
        &self,
        event: BatchEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        match event {
            BatchEvent::CollectionUrl(url) => link(document, "collection", url),
            BatchEvent::Item { url, .. } => {
                document
                    .field(LINKS)
                    .field("items")
                    .array_value()
                    .object()
                    .field("href")
                    .string_value(url);
            }
            BatchEvent::Start | BatchEvent::Finish => {}
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::Method;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::routes::{Operation, OperationKind};

    #[test]
    fn links_and_embedded_use_hal_sections() {
        let req = RequestContext::new(Url::parse("http://localhost/").unwrap());
        let mut doc = JsonObjectBuilder::new();
        let types = vec!["Person".to_owned()];
        let delete =
            Operation::new(OperationKind::Delete, Method::DELETE, "people/1".to_owned(), None);
        let mut employer = JsonObjectBuilder::new();
        employer.field("name").string_value("Engines Ltd");

        let events = [
            ModelEvent::Start,
            ModelEvent::Field { key: "name", value: json!("Ada") },
            ModelEvent::Types { types: &types },
            ModelEvent::SelfUrl { url: "http://localhost/people/1" },
            ModelEvent::Linked {
                key: "manager",
                url: "http://localhost/people/9",
            },
            ModelEvent::Embedded {
                key: "employer",
                url: "http://localhost/companies/2",
                document: employer,
            },
            ModelEvent::OperationStarted {
                operation: &delete,
                target: "http://localhost/people/1",
                expects: None,
            },
            ModelEvent::OperationFinished { operation: &delete },
            ModelEvent::Finish,
        ];
        for event in events {
            HalMapper.on_model(event, &mut doc, &req);
        }

        assert_eq!(
            doc.build(),
            json!({
                "name": "Ada",
                "_links": {
                    "self": {"href": "http://localhost/people/1"},
                    "manager": {"href": "http://localhost/people/9"}
                },
                "_embedded": {"employer": {"name": "Engines Ltd"}}
            })
        );
    }
}
