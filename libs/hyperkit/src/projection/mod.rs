//! Client directives that shape a document: which fields to write, which
//! relationships to inline and in which language.

pub mod embedded;
pub mod fields;
pub mod language;
pub mod path;

pub use embedded::Embedded;
pub use fields::Fields;
pub use language::{AcceptLanguage, LocalizedString};
pub use path::EmbeddedPath;

/// Combined projection decisions for one request.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub fields: Fields,
    pub embedded: Embedded,
    /// Deepest path that may be inlined regardless of the directive.
    pub max_depth: Option<usize>,
}

impl Projection {
    #[must_use]
    pub fn should_emit(&self, types: &[String], key: &str) -> bool {
        self.fields.should_emit(types, key)
    }

    /// Whether relationship `key` below `path` is inlined.
    ///
    /// Returns `false` when the configured depth ceiling would be crossed;
    /// the relationship then degrades to a link.
    #[must_use]
    pub fn should_embed(&self, path: &EmbeddedPath, key: &str) -> bool {
        if !self.embedded.should_embed(path, key) {
            return false;
        }
        match self.max_depth {
            Some(max) if path.depth() >= max => {
                tracing::warn!(
                    path = %path.dotted_with(key),
                    max_depth = max,
                    "embedding depth ceiling reached, writing link instead"
                );
                false
            }
            _ => true,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn depth_ceiling_turns_embedding_into_link() {
        let projection = Projection {
            embedded: Embedded::parse(["a.b.c"]),
            max_depth: Some(2),
            ..Projection::default()
        };
        let ab = EmbeddedPath::root().append("a").append("b");

        assert!(projection.should_embed(&EmbeddedPath::root(), "a"));
        assert!(projection.should_embed(&EmbeddedPath::root().append("a"), "b"));
        assert!(!projection.should_embed(&ab, "c"));
        assert!(logs_contain("embedding depth ceiling reached"));
    }

    #[test]
    fn no_ceiling_follows_directive_only() {
        let projection = Projection {
            embedded: Embedded::parse(["a.b.c"]),
            ..Projection::default()
        };
        let ab = EmbeddedPath::root().append("a").append("b");

        assert!(projection.should_embed(&ab, "c"));
    }
}
