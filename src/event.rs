//! Owned XML events.
//!
//! Events are produced by an [`EventCursor`](crate::cursor::EventCursor) in
//! document order. They own their data so they can outlive the reader's
//! internal buffer.

use std::fmt;

/// An attribute as a `(name, value)` pair, value unescaped.
pub type Attribute = (String, String);

/// A single XML event.
///
/// Element names are local names: any namespace prefix is dropped and no
/// namespace resolution takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// An element start tag, attributes in document order
    StartElement {
        /// Local name of the element
        name: String,
        /// Attributes in document order
        attributes: Vec<Attribute>,
    },
    /// An element end tag
    EndElement {
        /// Local name of the element
        name: String,
    },
    /// Character data (text or CDATA), unescaped
    Text(String),
    /// A comment
    Comment(String),
    /// Declarations, processing instructions and doctypes
    Other,
}

impl Event {
    /// Creates a start element event.
    pub fn start<I, K, V>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Event::StartElement {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Creates a start element event without attributes.
    pub fn open(name: impl Into<String>) -> Self {
        Event::StartElement {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Creates an end element event.
    pub fn end(name: impl Into<String>) -> Self {
        Event::EndElement { name: name.into() }
    }

    /// Creates a text event.
    pub fn text(content: impl Into<String>) -> Self {
        Event::Text(content.into())
    }

    /// Returns true for a start tag.
    pub fn is_start_element(&self) -> bool {
        matches!(self, Event::StartElement { .. })
    }

    /// Returns true for an end tag.
    pub fn is_end_element(&self) -> bool {
        matches!(self, Event::EndElement { .. })
    }

    /// Returns true for text made only of XML whitespace.
    pub fn is_whitespace(&self) -> bool {
        match self {
            Event::Text(t) => t.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n')),
            _ => false,
        }
    }

    /// Element name for start and end tags.
    pub fn name(&self) -> Option<&str> {
        match self {
            Event::StartElement { name, .. } | Event::EndElement { name } => Some(name),
            _ => None,
        }
    }

    /// Looks up an attribute value on a start tag.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            Event::StartElement { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StartElement { name, .. } => write!(f, "<{}>", name),
            Event::EndElement { name } => write!(f, "</{}>", name),
            Event::Text(t) => write!(f, "text {:?}", t),
            Event::Comment(c) => write!(f, "<!--{}-->", c),
            Event::Other => f.write_str("other"),
        }
    }
}
