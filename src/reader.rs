//! Streaming XML event reader.
//!
//! This module provides [`XmlEventReader`], the [`EventCursor`] that turns an
//! XML byte stream into owned [`Event`]s. It uses `quick-xml` for lexing and
//! keeps one event of lookahead so that [`EventCursor::peek`] and
//! [`EventCursor::has_next`] never consume anything.
//!
//! # Example
//!
//! ```rust
//! use kroki_xml::cursor::EventCursor;
//! use kroki_xml::event::Event;
//! use kroki_xml::reader::XmlEventReader;
//! use std::io::Cursor;
//!
//! let mut reader = XmlEventReader::from_reader(Cursor::new("<a x=\"1\">hi</a>"));
//!
//! let start = reader.next_event().unwrap();
//! assert_eq!(start.attribute("x"), Some("1"));
//! assert_eq!(reader.read_text().unwrap(), "hi");
//! assert!(!reader.has_next());
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use quick_xml::events::BytesStart;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use tracing::debug;

use crate::cursor::EventCursor;
use crate::error::{Error, Result};
use crate::event::{Attribute, Event};

/// Configuration options for the XML event reader.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to trim whitespace around text (off by default)
    pub trim_text: bool,
    /// Whether text made only of whitespace is dropped
    pub skip_whitespace: bool,
    /// Whether mismatched end tags are reported as errors
    pub check_end_names: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            trim_text: false,
            skip_whitespace: true,
            check_end_names: true,
        }
    }
}

impl ReaderConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether text is trimmed.
    pub fn with_trim_text(mut self, trim_text: bool) -> Self {
        self.trim_text = trim_text;
        self
    }

    /// Sets whether whitespace-only text is dropped.
    pub fn with_skip_whitespace(mut self, skip: bool) -> Self {
        self.skip_whitespace = skip;
        self
    }

    /// Sets whether end tag names are checked against their start tags.
    pub fn with_check_end_names(mut self, check: bool) -> Self {
        self.check_end_names = check;
        self
    }
}

/// A pull-based XML event reader.
///
/// Reads XML from any `BufRead` source. Empty-element tags (`<a/>`) are
/// reported as a start tag followed by an end tag. Reaching the end of input
/// with elements still open is reported as [`Error::Malformed`].
pub struct XmlEventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    lookahead: Option<Event>,
    pending_error: Option<Error>,
    open_elements: Vec<String>,
    skip_whitespace: bool,
    done: bool,
}

impl<R: BufRead> XmlEventReader<R> {
    /// Creates a new reader from a buffered reader with default settings.
    pub fn from_reader(reader: R) -> Self {
        Self::with_config(reader, ReaderConfig::default())
    }

    /// Creates a new reader with the specified configuration.
    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        let mut xml_reader = Reader::from_reader(reader);
        let xml_config = xml_reader.config_mut();
        xml_config.trim_text(config.trim_text);
        xml_config.check_end_names = config.check_end_names;
        xml_config.expand_empty_elements = true;

        Self {
            reader: xml_reader,
            buf: Vec::with_capacity(4096),
            lookahead: None,
            pending_error: None,
            open_elements: Vec::new(),
            skip_whitespace: config.skip_whitespace,
            done: false,
        }
    }

    /// Number of elements opened but not yet closed by the events read so far
    /// (including a peeked event).
    pub fn depth(&self) -> usize {
        self.open_elements.len()
    }

    /// Makes sure the lookahead slot holds the next event, an error, or
    /// nothing at the end of input.
    fn fill(&mut self) {
        if self.lookahead.is_some() || self.pending_error.is_some() || self.done {
            return;
        }
        match self.read_next() {
            Ok(Some(event)) => self.lookahead = Some(event),
            Ok(None) => self.done = true,
            Err(e) => self.pending_error = Some(e),
        }
    }

    /// Reports a pending error once and stops the reader.
    fn take_error(&mut self) -> Result<()> {
        match self.pending_error.take() {
            Some(e) => {
                self.done = true;
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Parses the next event from the underlying stream.
    fn read_next(&mut self) -> Result<Option<Event>> {
        loop {
            self.buf.clear();

            let event = match self.reader.read_event_into(&mut self.buf)? {
                XmlEvent::Start(ref e) => {
                    let name = local_name(e)?;
                    let attributes = extract_attrs(e)?;
                    self.open_elements.push(name.clone());
                    Event::StartElement { name, attributes }
                }
                XmlEvent::End(ref e) => {
                    let local = e.local_name();
                    let name = str::from_utf8(local.as_ref())?.to_string();
                    self.open_elements.pop();
                    Event::EndElement { name }
                }
                XmlEvent::Text(ref e) => {
                    let text = e.unescape()?;
                    if text.is_empty() {
                        continue;
                    }
                    let text = Event::Text(text.into_owned());
                    if self.skip_whitespace && text.is_whitespace() {
                        continue;
                    }
                    text
                }
                XmlEvent::CData(ref e) => Event::Text(str::from_utf8(e.as_ref())?.to_string()),
                XmlEvent::Comment(ref e) => Event::Comment(str::from_utf8(e.as_ref())?.to_string()),
                XmlEvent::Eof => {
                    if !self.open_elements.is_empty() {
                        debug!(unclosed = ?self.open_elements, "end of input inside open elements");
                        return Err(Error::Malformed(format!(
                            "unexpected end of document at byte {}, unclosed: {}",
                            self.reader.buffer_position(),
                            self.open_elements.join(", ")
                        )));
                    }
                    return Ok(None);
                }
                _ => Event::Other,
            };
            return Ok(Some(event));
        }
    }
}

impl XmlEventReader<BufReader<File>> {
    /// Opens a file and creates a reader over it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> EventCursor for XmlEventReader<R> {
    fn has_next(&mut self) -> bool {
        self.fill();
        self.lookahead.is_some() || self.pending_error.is_some()
    }

    fn next_event(&mut self) -> Result<Event> {
        self.fill();
        self.take_error()?;
        self.lookahead.take().ok_or(Error::NoMoreEvents)
    }

    fn peek(&mut self) -> Result<Option<&Event>> {
        self.fill();
        self.take_error()?;
        Ok(self.lookahead.as_ref())
    }

    fn next_tag(&mut self) -> Result<Event> {
        loop {
            let event = self.next_event()?;
            match event {
                Event::StartElement { .. } | Event::EndElement { .. } => return Ok(event),
                Event::Comment(_) | Event::Other => {}
                Event::Text(_) if event.is_whitespace() => {}
                Event::Text(t) => {
                    return Err(Error::UnexpectedEvent(format!(
                        "text {:?} while looking for a tag",
                        t
                    )))
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for XmlEventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_event())
        } else {
            None
        }
    }
}

fn local_name(e: &BytesStart<'_>) -> Result<String> {
    let local = e.local_name();
    Ok(str::from_utf8(local.as_ref())?.to_string())
}

/// Extracts attributes from a start tag as owned data.
fn extract_attrs(e: &BytesStart<'_>) -> Result<Vec<Attribute>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.to_string();
        attrs.push((key, value));
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const SIMPLE_XML: &str = r#"<?xml version="1.0"?>
<library name="city">
  <!-- catalogue -->
  <book id="1" lang="en">
    <title>Dune &amp; Sons</title>
    <isbn/>
  </book>
  <note><![CDATA[a < b]]></note>
</library>"#;

    fn collect(xml: &str) -> Vec<Event> {
        XmlEventReader::from_reader(Cursor::new(xml))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_event_sequence() {
        let events = collect(SIMPLE_XML);
        assert_eq!(
            events,
            vec![
                Event::Other,
                Event::start("library", [("name", "city")]),
                Event::Comment(" catalogue ".to_string()),
                Event::start("book", [("id", "1"), ("lang", "en")]),
                Event::open("title"),
                Event::text("Dune & Sons"),
                Event::end("title"),
                Event::open("isbn"),
                Event::end("isbn"),
                Event::end("book"),
                Event::open("note"),
                Event::text("a < b"),
                Event::end("note"),
                Event::end("library"),
            ]
        );
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = XmlEventReader::from_reader(Cursor::new("<a><b/></a>"));
        assert_eq!(reader.peek().unwrap(), Some(&Event::open("a")));
        assert_eq!(reader.peek().unwrap(), Some(&Event::open("a")));
        assert_eq!(reader.next_event().unwrap(), Event::open("a"));
        assert_eq!(reader.depth(), 1);
        assert_eq!(reader.next_event().unwrap(), Event::open("b"));
        assert_eq!(reader.next_event().unwrap(), Event::end("b"));
        assert_eq!(reader.next_event().unwrap(), Event::end("a"));
        assert!(!reader.has_next());
        assert_eq!(reader.peek().unwrap(), None);
        assert!(matches!(reader.next_event(), Err(Error::NoMoreEvents)));
    }

    #[test]
    fn test_local_names_drop_prefix() {
        let events = collect(r#"<x:root xmlns:x="urn:x"><x:item/></x:root>"#);
        assert_eq!(events[0].name(), Some("root"));
        assert_eq!(events[0].attribute("xmlns:x"), Some("urn:x"));
        assert_eq!(events[1].name(), Some("item"));
    }

    #[test]
    fn test_read_text() {
        let mut reader = XmlEventReader::from_reader(Cursor::new("<n>4<!-- x -->2</n>"));
        reader.next_event().unwrap();
        assert_eq!(reader.read_int().unwrap(), 42);
        assert!(!reader.has_next());
    }

    #[test]
    fn test_next_tag_skips_comments() {
        let mut reader =
            XmlEventReader::from_reader(Cursor::new("<a><!-- skip --><?pi x?><b/></a>"));
        assert_eq!(reader.next_tag().unwrap(), Event::open("a"));
        assert_eq!(reader.next_tag().unwrap(), Event::open("b"));
        assert_eq!(reader.next_tag().unwrap(), Event::end("b"));
    }

    #[test]
    fn test_next_tag_rejects_text() {
        let mut reader = XmlEventReader::from_reader(Cursor::new("<a>text<b/></a>"));
        reader.next_tag().unwrap();
        assert!(matches!(reader.next_tag(), Err(Error::UnexpectedEvent(_))));
    }

    #[test]
    fn test_mismatched_end_tag_is_an_error() {
        let mut reader = XmlEventReader::from_reader(Cursor::new("<a><b></a>"));
        let result: Result<Vec<_>> = reader.by_ref().collect();
        assert!(matches!(result, Err(Error::XmlParse(_))));
        assert!(!reader.has_next());
    }

    #[test]
    fn test_unclosed_element_is_malformed() {
        let mut reader = XmlEventReader::from_reader(Cursor::new("<a><b></b>"));
        assert!(reader.next_event().is_ok());
        assert!(reader.next_event().is_ok());
        assert!(reader.next_event().is_ok());
        assert!(reader.has_next());
        assert!(matches!(
            reader.next_event(),
            Err(Error::Malformed(_)) | Err(Error::XmlParse(_))
        ));
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let mut reader = XmlEventReader::from_reader(Cursor::new("<a> two  words </a>"));
        reader.next_event().unwrap();
        assert_eq!(reader.next_event().unwrap(), Event::text(" two  words "));
    }

    #[test]
    fn test_mixed_content_keeps_spaces() {
        let events = collect("<p>Hello <b>big</b> world</p>");
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Hello big world");
    }

    #[test]
    fn test_trimmed_text() {
        let config = ReaderConfig::new().with_trim_text(true);
        let mut reader = XmlEventReader::with_config(Cursor::new("<a> x </a>"), config);
        reader.next_event().unwrap();
        assert_eq!(reader.next_event().unwrap(), Event::text("x"));
    }

    #[test]
    fn test_whitespace_text_can_be_kept() {
        let config = ReaderConfig::new().with_skip_whitespace(false);
        let reader = XmlEventReader::with_config(Cursor::new("<a>\n  <b/>\n</a>"), config);
        let events = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(
            events,
            vec![
                Event::open("a"),
                Event::text("\n  "),
                Event::open("b"),
                Event::end("b"),
                Event::text("\n"),
                Event::end("a"),
            ]
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SIMPLE_XML.as_bytes()).unwrap();

        let reader = XmlEventReader::from_file(file.path()).unwrap();
        let starts = reader
            .filter_map(|r| match r {
                Ok(Event::StartElement { name, .. }) => Some(name),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(starts, vec!["library", "book", "title", "isbn", "note"]);
    }
}
