use std::fmt;
use std::sync::Arc;

struct Segment {
    key: String,
    parent: Option<Arc<Segment>>,
    depth: usize,
}

/// Position of a document inside the embedded-resource graph.
///
/// A persistent list: [`append`](Self::append) allocates one node that points
/// at the unchanged parent, so sibling relationships share their common tail
/// and cloning is a reference-count bump.
#[derive(Clone, Default)]
pub struct EmbeddedPath {
    last: Option<Arc<Segment>>,
}

impl EmbeddedPath {
    /// The path of a top-level document.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn append(&self, key: &str) -> Self {
        let depth = self.depth() + 1;
        Self {
            last: Some(Arc::new(Segment {
                key: key.to_owned(),
                parent: self.last.clone(),
                depth,
            })),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.last.as_ref().map_or(0, |s| s.depth)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.last.is_none()
    }

    /// Segments from the root down.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.depth());
        let mut cursor = self.last.as_deref();
        while let Some(segment) = cursor {
            out.push(segment.key.as_str());
            cursor = segment.parent.as_deref();
        }
        out.reverse();
        out
    }

    /// `a.b.c` rendering used by the `embedded` directive.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments().join(".")
    }

    /// The dotted path a relationship `key` would have below this path.
    #[must_use]
    pub fn dotted_with(&self, key: &str) -> String {
        if self.is_root() {
            key.to_owned()
        } else {
            format!("{}.{key}", self.dotted())
        }
    }
}

impl fmt::Debug for EmbeddedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EmbeddedPath").field(&self.dotted()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        let root = EmbeddedPath::root();

        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.dotted(), "");
        assert_eq!(root.dotted_with("employer"), "employer");
    }

    #[test]
    fn append_leaves_parent_untouched() {
        let employer = EmbeddedPath::root().append("employer");
        let ceo = employer.append("ceo");
        let address = employer.append("address");

        assert_eq!(employer.dotted(), "employer");
        assert_eq!(ceo.dotted(), "employer.ceo");
        assert_eq!(address.segments(), vec!["employer", "address"]);
        assert_eq!(ceo.depth(), 2);
        assert_eq!(ceo.dotted_with("name"), "employer.ceo.name");
    }

    #[test]
    fn siblings_share_the_parent_node() {
        let employer = EmbeddedPath::root().append("employer");
        let a = employer.append("a");
        let b = employer.append("b");

        let parent_of = |p: &EmbeddedPath| {
            p.last
                .as_ref()
                .and_then(|s| s.parent.clone())
                .unwrap()
        };
        assert!(Arc::ptr_eq(&parent_of(&a), &parent_of(&b)));
    }
}
