//! Scoped event reader.
//!
//! A [`ScopedEventReader`] lets client code read the events of one element
//! of a larger stream. Once the element's closing tag is reached the reader
//! responds as if no more events were available, so a handler can never
//! consume its siblings or its parent's end tag.
//!
//! The scope borrows the outer cursor exclusively. Scopes nest by
//! reborrowing: a scope opened over another scope holds read authority until
//! it is dropped, after which the parent continues where the child stopped.
//!
//! # Example
//!
//! ```rust
//! use kroki_xml::cursor::EventCursor;
//! use kroki_xml::reader::XmlEventReader;
//! use kroki_xml::scope::ScopedEventReader;
//! use std::io::Cursor;
//!
//! let mut reader = XmlEventReader::from_reader(Cursor::new("<a><b>1</b></a><c/>"));
//! let mut scope = ScopedEventReader::enter(&mut reader).unwrap();
//! assert_eq!(scope.name(), "a");
//!
//! let mut seen = 0;
//! while scope.has_next() {
//!     scope.next_event().unwrap();
//!     seen += 1;
//! }
//! // <b>, "1", </b>, </a>
//! assert_eq!(seen, 4);
//! drop(scope);
//!
//! // The outer reader resumes at the sibling.
//! assert_eq!(reader.next_event().unwrap().name(), Some("c"));
//! ```

use tracing::trace;

use crate::cursor::EventCursor;
use crate::error::{Error, Result};
use crate::event::{Attribute, Event};

/// A bounded, self-closing view of an outer [`EventCursor`].
///
/// The scope is created right after its start tag has been consumed from the
/// outer cursor. Every start tag read through the scope increments the depth
/// and every end tag decrements it; the end tag read at depth zero is the
/// scope's own, and after returning it the scope is closed.
///
/// Only one reader may pull from a given outer cursor at a time. The borrow
/// checker enforces this for scopes; sharing the underlying source through
/// other means is unsupported.
pub struct ScopedEventReader<'a> {
    outer: &'a mut dyn EventCursor,
    name: String,
    attributes: Vec<Attribute>,
    open: bool,
    depth: usize,
    finished: bool,
}

impl<'a> ScopedEventReader<'a> {
    /// Opens a scope for the element `name` whose start tag was just
    /// consumed from `outer`.
    pub fn new(outer: &'a mut dyn EventCursor, name: impl Into<String>) -> Self {
        Self::with_attributes(outer, name, Vec::new())
    }

    /// Like [`new`](Self::new), also recording the start tag's attributes.
    pub fn with_attributes(
        outer: &'a mut dyn EventCursor,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            outer,
            name: name.into(),
            attributes,
            open: true,
            depth: 0,
            finished: false,
        }
    }

    /// Consumes the next event of `outer`, which must be a start tag, and
    /// opens a scope over that element.
    pub fn enter(outer: &'a mut dyn EventCursor) -> Result<Self> {
        match outer.next_event()? {
            Event::StartElement { name, attributes } => {
                Ok(Self::with_attributes(outer, name, attributes))
            }
            other => Err(Error::UnexpectedEvent(format!(
                "expected a start tag, found {}",
                other
            ))),
        }
    }

    /// Name of the element this scope covers.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes of the element's start tag.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute of the element's start tag.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true until the scope is closed explicitly or by reaching its
    /// end tag.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true once the element's own end tag has been consumed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Nesting depth relative to the scope's element.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Closes the scope. Idempotent; the outer cursor is left untouched.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Consumes everything left in the element, up to and including its end
    /// tag, and returns the number of events skipped.
    ///
    /// Works on a closed scope too, so the outer cursor ends up positioned
    /// after the element even if a handler closed the scope early.
    pub fn skip_rest(&mut self) -> Result<usize> {
        let mut skipped = 0;
        while !self.finished {
            self.pull()?;
            skipped += 1;
        }
        Ok(skipped)
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::ReaderClosed)
        }
    }

    /// Reads one event from the outer cursor and tracks depth.
    fn pull(&mut self) -> Result<Event> {
        let event = self.outer.next_event()?;
        match event {
            Event::StartElement { .. } => self.depth += 1,
            Event::EndElement { .. } if self.depth == 0 => {
                trace!(element = %self.name, "scope reached its end tag");
                self.finished = true;
                self.open = false;
            }
            Event::EndElement { .. } => self.depth -= 1,
            _ => {}
        }
        Ok(event)
    }
}

impl EventCursor for ScopedEventReader<'_> {
    fn has_next(&mut self) -> bool {
        self.open && !self.finished && self.outer.has_next()
    }

    fn next_event(&mut self) -> Result<Event> {
        self.check_open()?;
        self.pull()
    }

    fn peek(&mut self) -> Result<Option<&Event>> {
        self.check_open()?;
        // Until the own end tag is consumed, the next outer event is inside.
        self.outer.peek()
    }

    fn next_tag(&mut self) -> Result<Event> {
        Err(Error::Unsupported("next_tag on a scoped reader"))
    }
}
