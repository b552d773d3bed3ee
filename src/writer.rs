//! XML writer.
//!
//! The write side that pairs with the event reader: explicit
//! `open_tag`/`close_tag`/`text`/`comment` calls, plus [`XmlWriter::tag`]
//! for nesting a body between a start and an end tag.
//!
//! # Example
//!
//! ```rust
//! use kroki_xml::writer::xml;
//!
//! let doc = xml("order", &[("id", "17")], |w| {
//!     w.tag("item", &[("sku", "A-1")], |w| {
//!         w.text(3)?;
//!         Ok(())
//!     })?;
//!     w.comment("gift wrap")?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(doc.ends_with(r#"<order id="17"><item sku="A-1">3</item><!--gift wrap--></order>"#));
//! ```

use std::cmp::Ordering;
use std::fmt::Display;
use std::io::Write;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};

/// Configuration options for the XML writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Whether to indent the output for readability
    pub indent: bool,
    /// Indentation for one level (default: two spaces), made of one repeated
    /// ASCII character such as `"  "` or `"\t"`
    pub indent_string: String,
    /// Whether to include the XML declaration
    pub xml_declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: true,
            indent_string: "  ".to_string(),
            xml_declaration: true,
        }
    }
}

impl WriterConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compact configuration (no indentation).
    pub fn compact() -> Self {
        Self {
            indent: false,
            indent_string: String::new(),
            xml_declaration: true,
        }
    }

    /// Sets whether to indent the output.
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string.
    pub fn with_indent_string(mut self, s: impl Into<String>) -> Self {
        self.indent_string = s.into();
        self
    }

    /// Sets whether the XML declaration is written.
    pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = declaration;
        self
    }
}

/// Streaming XML writer.
///
/// Keeps a stack of open tags so that [`close_tag`](Self::close_tag) needs
/// no name and [`finish`](Self::finish) can report unbalanced output.
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
    open: Vec<String>,
}

impl<W: Write> XmlWriter<W> {
    /// Creates a writer with the default configuration.
    pub fn new(inner: W) -> Result<Self> {
        Self::with_config(inner, &WriterConfig::default())
    }

    /// Creates a writer with the specified configuration, writing the XML
    /// declaration if configured.
    pub fn with_config(inner: W, config: &WriterConfig) -> Result<Self> {
        let mut writer = if config.indent {
            let indent_char = config.indent_string.bytes().next().unwrap_or(b' ');
            Writer::new_with_indent(inner, indent_char, config.indent_string.len())
        } else {
            Writer::new(inner)
        };

        if config.xml_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        Ok(Self {
            writer,
            open: Vec::new(),
        })
    }

    /// Names of the tags currently open, outermost first.
    pub fn open_tags(&self) -> &[String] {
        &self.open
    }

    /// Writes a start tag.
    pub fn open_tag(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        self.writer.write_event(Event::Start(start_tag(name, attrs)))?;
        self.open.push(name.to_string());
        Ok(self)
    }

    /// Closes the innermost open tag.
    pub fn close_tag(&mut self) -> Result<&mut Self> {
        let name = self.open.pop().ok_or(Error::NoOpenTag)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(self)
    }

    /// Writes a self-closing tag.
    pub fn empty_tag(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        self.writer.write_event(Event::Empty(start_tag(name, attrs)))?;
        Ok(self)
    }

    /// Writes `body` between a start and an end tag.
    pub fn tag<F>(&mut self, name: &str, attrs: &[(&str, &str)], body: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.open_tag(name, attrs)?;
        let depth = self.open.len();
        body(&mut *self)?;
        match self.open.len().cmp(&depth) {
            Ordering::Greater => return Err(Error::UnclosedTags(self.open[depth..].to_vec())),
            Ordering::Less => return Err(Error::NoOpenTag),
            Ordering::Equal => {}
        }
        self.close_tag()
    }

    /// Writes escaped character data.
    pub fn text(&mut self, value: impl Display) -> Result<&mut Self> {
        let value = value.to_string();
        self.writer.write_event(Event::Text(BytesText::new(&value)))?;
        Ok(self)
    }

    /// Writes a CDATA section.
    pub fn cdata(&mut self, value: &str) -> Result<&mut Self> {
        self.writer.write_event(Event::CData(BytesCData::new(value)))?;
        Ok(self)
    }

    /// Writes a comment. The text may not contain `--` or end with `-`.
    pub fn comment(&mut self, value: &str) -> Result<&mut Self> {
        if value.contains("--") || value.ends_with('-') {
            return Err(Error::InvalidComment(value.to_string()));
        }
        self.writer
            .write_event(Event::Comment(BytesText::from_escaped(value)))?;
        Ok(self)
    }

    /// Checks that every tag was closed and returns the underlying writer.
    pub fn finish(self) -> Result<W> {
        if !self.open.is_empty() {
            return Err(Error::UnclosedTags(self.open));
        }
        Ok(self.writer.into_inner())
    }
}

fn start_tag<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut elem = BytesStart::new(name);
    for &(key, value) in attrs {
        elem.push_attribute((key, value));
    }
    elem
}

/// Writes a document with the given root element to `out`.
pub fn write_xml<W, F>(
    out: W,
    config: &WriterConfig,
    root: &str,
    attrs: &[(&str, &str)],
    body: F,
) -> Result<W>
where
    W: Write,
    F: FnOnce(&mut XmlWriter<W>) -> Result<()>,
{
    let mut writer = XmlWriter::with_config(out, config)?;
    writer.tag(root, attrs, body)?;
    writer.finish()
}

/// Convenience function to build a compact document as a string.
pub fn xml<F>(root: &str, attrs: &[(&str, &str)], body: F) -> Result<String>
where
    F: FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<()>,
{
    let buffer = write_xml(Vec::new(), &WriterConfig::compact(), root, attrs, body)?;
    String::from_utf8(buffer).map_err(|e| Error::Utf8(e.utf8_error()))
}
