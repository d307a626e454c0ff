use http::request::Parts;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// Read-only view of an inbound request.
///
/// The transport builds one per request; providers, permission evaluators and
/// writers only ever see this type, never the wire request itself.
#[derive(Debug, Clone)]
pub struct RequestContext {
    base_url: Url,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    extensions: Extensions,
}

impl RequestContext {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    /// Build a context from the request head produced by the HTTP stack.
    ///
    /// Extensions are moved over as-is, so whatever the authentication layer
    /// stored there (typically a `SecurityContext`) stays reachable.
    #[must_use]
    pub fn from_parts(base_url: Url, parts: Parts) -> Self {
        let query = parts
            .uri
            .query()
            .map(parse_query)
            .unwrap_or_default();
        Self {
            base_url,
            headers: parts.headers,
            query,
            extensions: parts.extensions,
        }
    }

    /// Replace the query pairs with those parsed from a raw query string.
    #[must_use]
    pub fn with_query(mut self, raw: &str) -> Self {
        self.query = parse_query(raw);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Decoded query pairs in their original order.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Absolute URL for a path relative to the API base.
    #[must_use]
    pub fn absolute(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::header::ACCEPT_LANGUAGE;

    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.com/v1/").unwrap()
    }

    #[test]
    fn from_parts_decodes_query_and_keeps_extensions() {
        let (parts, ()) = http::Request::builder()
            .uri("/v1/people?fields%5BPerson%5D=name,age&embedded=employer")
            .header(ACCEPT_LANGUAGE, "de")
            .extension(42_u32)
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_parts(base(), parts);

        assert_eq!(ctx.query_param("fields[Person]"), Some("name,age"));
        assert_eq!(ctx.query_param("embedded"), Some("employer"));
        assert_eq!(ctx.query_param("missing"), None);
        assert_eq!(ctx.headers().get(ACCEPT_LANGUAGE).unwrap(), "de");
        assert_eq!(ctx.extensions().get::<u32>(), Some(&42));
    }

    #[test]
    fn absolute_joins_without_duplicate_slashes() {
        let ctx = RequestContext::new(base());

        assert_eq!(ctx.absolute("people/1"), "https://api.example.com/v1/people/1");
        assert_eq!(ctx.absolute("/people"), "https://api.example.com/v1/people");
    }

    #[test]
    fn with_query_replaces_previous_pairs() {
        let ctx = RequestContext::new(base())
            .with_query("page=2")
            .with_query("per_page=5");

        assert_eq!(ctx.query_param("page"), None);
        assert_eq!(ctx.query_param("per_page"), Some("5"));
        assert_eq!(ctx.query_pairs().len(), 1);
    }
}
