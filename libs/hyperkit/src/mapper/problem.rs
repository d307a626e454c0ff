use crate::document::JsonObjectBuilder;
use crate::request::RequestContext;

use super::{ErrorEvent, ErrorMapper, MediaTypeMapper};

pub const PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 problem details documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemJsonMapper;

impl MediaTypeMapper for ProblemJsonMapper {
    fn media_type(&self) -> &str {
        PROBLEM_JSON
    }
}

impl ErrorMapper for ProblemJsonMapper {
    fn on_error(
        &self,
        event: ErrorEvent<'_>,
        document: &mut JsonObjectBuilder,
        _request: &RequestContext,
    ) {
        write_problem_event(event, document);
    }
}

/// Problem members under their RFC 9457 names. Shared by every mapper that
/// writes error documents.
pub(crate) fn write_problem_event(event: ErrorEvent<'_>, document: &mut JsonObjectBuilder) {
    match event {
        ErrorEvent::Type(type_url) => document.field("type").string_value(type_url),
        ErrorEvent::Title(title) => document.field("title").string_value(title),
        ErrorEvent::Status(status) => document.field("status").number_value(status),
        ErrorEvent::Detail(detail) => document.field("detail").string_value(detail),
        ErrorEvent::Instance(instance) => document.field("instance").string_value(instance),
        ErrorEvent::TraceId(trace_id) => document.field("traceId").string_value(trace_id),
        ErrorEvent::Start | ErrorEvent::Finish => {}
    }
}
