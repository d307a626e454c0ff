use std::collections::BTreeSet;

use super::fields::split_list;
use super::path::EmbeddedPath;
use crate::request::RequestContext;

pub const EMBEDDED_PARAM: &str = "embedded";

/// Embedding directive: `embedded=employer,employer.ceo`.
///
/// Listing a nested path implies its ancestors, since `employer.ceo` can only
/// be inlined inside an inlined `employer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embedded {
    paths: BTreeSet<String>,
}

impl Embedded {
    #[must_use]
    pub fn from_request(request: &RequestContext) -> Self {
        Self::parse(
            request
                .query_pairs()
                .iter()
                .filter(|(k, _)| k == EMBEDDED_PARAM)
                .map(|(_, v)| v.as_str()),
        )
    }

    #[must_use]
    pub fn parse<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut paths = BTreeSet::new();
        for path in values.into_iter().flat_map(split_list) {
            let mut prefix = String::new();
            for segment in path.split('.').filter(|s| !s.is_empty()) {
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(segment);
                paths.insert(prefix.clone());
            }
        }
        Self { paths }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn accepts(&self, dotted: &str) -> bool {
        self.paths.contains(dotted)
    }

    /// Whether relationship `key` below `path` should be inlined.
    #[must_use]
    pub fn should_embed(&self, path: &EmbeddedPath, key: &str) -> bool {
        !self.paths.is_empty() && self.accepts(&path.dotted_with(key))
    }
}
