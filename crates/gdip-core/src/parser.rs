//! Tagged-response parser
//!
//! GnuDIP servers answer with a small HTML page whose payload lives in
//! `<meta name="..." content="...">` tags:
//!
//! ```html
//! <html><head>
//! <meta name="salt" content="zAkmJAcMeL">
//! <meta name="time" content="1700000000">
//! <meta name="sign" content="2dd0bc8cb2bbf6e3a3ba0ee1e2b52a5c">
//! </head></html>
//! ```
//!
//! Real servers emit loose markup (unclosed tags, stray entities), so the
//! document is parsed with an HTML5 tree builder that recovers from errors
//! instead of a strict XML reader.

use crate::error::{Error, Result};
use scraper::{Html, Selector};

/// `(name, content)` pairs collected from a response, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTags {
    entries: Vec<(String, String)>,
}

impl MetaTags {
    /// Content of the first tag with the given name
    ///
    /// Later tags repeating a name never shadow the first one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_str())
    }

    /// Content of the first tag with the given name, or `""` if absent
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// All pairs in document order, duplicates included
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for MetaTags {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Parse a response body into its meta tags
///
/// # Errors
///
/// Returns [`Error::Parse`] only if the body is not UTF-8 text or carries no
/// document at all. Malformed markup is never an error.
pub fn parse(body: &[u8]) -> Result<MetaTags> {
    let text = std::str::from_utf8(body)
        .map_err(|e| Error::parse(format!("response body is not valid UTF-8: {}", e)))?;

    if text.trim().is_empty() {
        return Err(Error::parse("response body is empty"));
    }

    let document = Html::parse_document(text);
    let selector = Selector::parse("meta")
        .map_err(|e| Error::Other(format!("invalid meta selector: {}", e)))?;

    let tags = document
        .select(&selector)
        .filter_map(|element| {
            let value = element.value();
            match (value.attr("name"), value.attr("content")) {
                (Some(name), Some(content)) => Some((name.to_string(), content.to_string())),
                _ => None,
            }
        })
        .collect();

    Ok(tags)
}
