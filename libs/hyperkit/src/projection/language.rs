use http::HeaderMap;
use http::header::ACCEPT_LANGUAGE;
use serde::{Deserialize, Serialize};

/// A string available in several languages, keyed by language tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedString {
    values: Vec<(String, String)>,
}

impl LocalizedString {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the text for `language`.
    #[must_use]
    pub fn with(mut self, language: &str, text: &str) -> Self {
        if let Some(slot) = self
            .values
            .iter_mut()
            .find(|(l, _)| l.eq_ignore_ascii_case(language))
        {
            text.clone_into(&mut slot.1);
        } else {
            self.values.push((language.to_owned(), text.to_owned()));
        }
        self
    }

    #[must_use]
    pub fn get(&self, language: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(language))
            .map(|(_, t)| t.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn by_primary(&self, primary: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(l, _)| primary_subtag(l).eq_ignore_ascii_case(primary))
            .map(|(_, t)| t.as_str())
    }

    fn first(&self) -> Option<&str> {
        self.values.first().map(|(_, t)| t.as_str())
    }
}

/// Languages the client accepts, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptLanguage {
    tags: Vec<String>,
}

impl AcceptLanguage {
    /// Parse every `Accept-Language` header. Tags with `q=0` are dropped;
    /// equal weights keep header order.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut weighted: Vec<(String, f32)> = headers
            .get_all(ACCEPT_LANGUAGE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(parse_entry)
            .filter(|(_, q)| *q > 0.0)
            .collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            tags: weighted.into_iter().map(|(tag, _)| tag).collect(),
        }
    }

    #[must_use]
    pub fn from_tags(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Pick the text best matching the client's preferences.
    ///
    /// Each preferred tag is tried exactly, then by primary subtag (`de-CH`
    /// falls back to `de`); `*` takes any value. Without a match the first
    /// stored translation is used.
    #[must_use]
    pub fn resolve<'a>(&self, text: &'a LocalizedString) -> Option<&'a str> {
        self.tags
            .iter()
            .find_map(|tag| {
                if tag == "*" {
                    return text.first();
                }
                text.get(tag).or_else(|| text.by_primary(primary_subtag(tag)))
            })
            .or_else(|| text.first())
    }
}

fn parse_entry(entry: &str) -> Option<(String, f32)> {
    let mut parts = entry.split(';').map(str::trim);
    let tag = parts.next().filter(|t| !t.is_empty())?;
    let q = parts
        .find_map(|p| p.strip_prefix("q="))
        .map_or(Some(1.0), |q| q.trim().parse::<f32>().ok())?;
    Some((tag.to_owned(), q))
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}
