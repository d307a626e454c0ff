use crate::document::JsonObjectBuilder;
use crate::request::RequestContext;
use crate::routes::Operation;

use super::problem::write_problem_event;
use super::{
    BatchEvent, BatchMapper, DocumentationEvent, DocumentationMapper, ErrorEvent, ErrorMapper,
    MediaTypeMapper, ModelEvent, ModelMapper, PageEvent, PageMapper,
};

pub const PLAIN_JSON: &str = "application/json";

/// Flat JSON: fields, links and related URLs sit next to each other,
/// embedded resources are nested objects and operations form an array.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainJsonMapper;

impl MediaTypeMapper for PlainJsonMapper {
    fn media_type(&self) -> &str {
        PLAIN_JSON
    }
}

pub(crate) fn write_operation(
    document: &mut JsonObjectBuilder,
    operation: &Operation,
    target: &str,
    expects: Option<&str>,
) {
    let entry = document.field("operations").array_value().object();
    entry.field("name").string_value(operation.name());
    entry.field("method").string_value(operation.method().as_str());
    entry.field("target").string_value(target);
    if let Some(expects) = expects {
        entry.field("expects").string_value(expects);
    }
}

impl ModelMapper for PlainJsonMapper {
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
            | ModelEvent::RelatedCollection { key, url } => document.field(key).string_value(url),
            ModelEvent::Types { types } => {
                let mut array = document.field("types").array_value();
                for t in types {
                    array.push_string(t.as_str());
                }
            }
            ModelEvent::SelfUrl { url } => document.field("self").string_value(url),
            ModelEvent::Embedded { key, document: embedded, .. } => {
                document.field(key).object_value(embedded);
            }
            ModelEvent::OperationStarted {
                operation,
                target,
                expects,
            } => write_operation(document, operation, target, expects),
            ModelEvent::Start | ModelEvent::OperationFinished { .. } | ModelEvent::Finish => {}
        }
    }
}

impl PageMapper for PlainJsonMapper {
    fn on_page(
        &self,
        event: PageEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        match event {
            PageEvent::Start => {
                document.field("items").array_value();
            }
            PageEvent::TotalCount(total) => document.field("total").number_value(total),
            PageEvent::ItemCount(count) => document.field("count").number_value(count),
            PageEvent::CollectionUrl(url) => document.field("self").string_value(url),
            PageEvent::FirstPage(url) => document.field("first").string_value(url),
            PageEvent::CurrentPage(url) => document.field("current").string_value(url),
            PageEvent::LastPage(url) => document.field("last").string_value(url),
            PageEvent::NextPage(url) => document.field("next").string_value(url),
            PageEvent::PreviousPage(url) => document.field("previous").string_value(url),
            PageEvent::ItemFinished { document: item, .. } => {
                document.field("items").array_value().push_object(item);
            }
            PageEvent::OperationStarted {
                operation,
                target,
                expects,
            } => write_operation(document, operation, target, expects),
            PageEvent::ItemStarted { .. }
            | PageEvent::OperationFinished { .. }
            | PageEvent::Finish => {}
        }
    }
}

impl ErrorMapper for PlainJsonMapper {
    fn on_error(
        &self,
        event: ErrorEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        write_problem_event(event, document);
    }
}

pub(crate) fn write_documentation_event(
    event: DocumentationEvent<'_>,
    document: &mut JsonObjectBuilder,
) {
    match event {
        DocumentationEvent::Title(title) => document.field("title").string_value(title),
        DocumentationEvent::Description(text) => document.field("description").string_value(text),
        DocumentationEvent::Resource { description, url } => {
            let entry = document.field("resources").field(&description.name).object();
            entry.field("href").string_value(url);
            match serde_json::to_value(description) {
                Ok(serde_json::Value::Object(map)) => {
                    for (key, value) in map {
                        entry.field(&key).value(value);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(
                    resource = %description.name,
                    error = %e,
                    "resource description not serializable"
                ),
            }
        }
        DocumentationEvent::Start | DocumentationEvent::Finish => {}
    }
}

impl DocumentationMapper for PlainJsonMapper {
    fn on_documentation(
        &self,
        event: DocumentationEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        write_documentation_event(event, document);
    }
}

impl BatchMapper for PlainJsonMapper {
    fn on_batch(
        &self,
        event: BatchEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        match event {
            BatchEvent::Start => {
                document.field("items").array_value();
            }
            BatchEvent::CollectionUrl(url) => document.field("collection").string_value(url),
            BatchEvent::Item { url, .. } => document.field("items").array_value().push_string(url),
            BatchEvent::Finish => {}
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
    use crate::routes::OperationKind;

    fn request() -> RequestContext {
        RequestContext::new(Url::parse("http://localhost/").unwrap())
    }

    #[test]
    fn model_events_land_flat() {
        let req = request();
        let mut doc = JsonObjectBuilder::new();
        let types = vec!["Person".to_owned()];
        let mut embedded = JsonObjectBuilder::new();
        embedded.field("name").string_value("Engines Ltd");
        let update =
            Operation::new(OperationKind::Update, Method::PUT, "people/1".to_owned(), None);

        let events = [
            ModelEvent::Start,
            ModelEvent::Field { key: "name", value: json!("Ada") },
            ModelEvent::Types { types: &types },
            ModelEvent::SelfUrl { url: "http://localhost/people/1" },
            ModelEvent::Embedded {
                key: "employer",
                url: "http://localhost/companies/2",
                document: embedded,
            },
            ModelEvent::RelatedCollection {
                key: "friends",
                url: "http://localhost/people/1/friends",
            },
            ModelEvent::OperationStarted {
                operation: &update,
                target: "http://localhost/people/1",
                expects: Some("http://localhost/f/person"),
            },
            ModelEvent::OperationFinished { operation: &update },
            ModelEvent::Finish,
        ];
        for event in events {
            PlainJsonMapper.on_model(event, &mut doc, &req);
        }

        assert_eq!(
            doc.build(),
            json!({
                "name": "Ada",
                "types": ["Person"],
                "self": "http://localhost/people/1",
                "employer": {"name": "Engines Ltd"},
                "friends": "http://localhost/people/1/friends",
                "operations": [{
                    "name": "update",
                    "method": "PUT",
                    "target": "http://localhost/people/1",
                    "expects": "http://localhost/f/person"
                }]
            })
        );
    }

    #[test]
    fn empty_page_still_has_items() {
        let req = request();
        let mut doc = JsonObjectBuilder::new();

        PlainJsonMapper.on_page(PageEvent::Start, &mut doc, &req);
        PlainJsonMapper.on_page(PageEvent::TotalCount(0), &mut doc, &req);
        PlainJsonMapper.on_page(PageEvent::Finish, &mut doc, &req);

        assert_eq!(doc.build(), json!({"items": [], "total": 0}));
    }
}
