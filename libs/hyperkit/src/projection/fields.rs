use std::collections::{BTreeSet, HashMap};

use crate::request::RequestContext;

/// Sparse fieldset directive: `fields[Type]=a,b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    by_type: HashMap<String, BTreeSet<String>>,
}

impl Fields {
    #[must_use]
    pub fn from_request(request: &RequestContext) -> Self {
        Self::parse(
            request
                .query_pairs()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    /// Collect every `fields[Type]` pair. Repeated parameters for the same
    /// type accumulate.
    #[must_use]
    pub fn parse<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut by_type: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (key, value) in pairs {
            let Some(type_name) = key
                .strip_prefix("fields[")
                .and_then(|rest| rest.strip_suffix(']'))
            else {
                continue;
            };
            by_type
                .entry(type_name.to_owned())
                .or_default()
                .extend(split_list(value));
        }
        Self { by_type }
    }

    #[must_use]
    pub fn with(mut self, type_name: &str, keys: &[&str]) -> Self {
        self.by_type
            .entry(type_name.to_owned())
            .or_default()
            .extend(keys.iter().map(|k| (*k).to_owned()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Whether `key` should be written for a resource carrying `types`.
    ///
    /// When the client named a fieldset for none of the types every key is
    /// emitted; otherwise only keys listed for at least one of them.
    #[must_use]
    pub fn should_emit(&self, types: &[String], key: &str) -> bool {
        let mut restricted = false;
        for set in types.iter().filter_map(|t| self.by_type.get(t)) {
            if set.contains(key) {
                return true;
            }
            restricted = true;
        }
        !restricted
    }
}

pub(crate) fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}
