//! The pull-based event cursor contract.
//!
//! Everything that produces [`Event`]s in document order implements
//! [`EventCursor`]: the quick-xml backed [`XmlEventReader`](crate::reader::XmlEventReader),
//! a [`ScopedEventReader`](crate::scope::ScopedEventReader) over another
//! cursor, and the in-memory [`EventBuffer`].

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::event::Event;

/// A pull-based source of document events.
pub trait EventCursor {
    /// Returns true if another event can be read.
    ///
    /// A pending parse error counts as "more": the next read reports it.
    fn has_next(&mut self) -> bool;

    /// Consumes and returns the next event.
    fn next_event(&mut self) -> Result<Event>;

    /// Returns the next event without consuming it, `None` at the end.
    fn peek(&mut self) -> Result<Option<&Event>>;

    /// Reads the text of the current element up to the next end tag, which
    /// is consumed.
    ///
    /// Intended to be called right after a start tag. Comments are skipped;
    /// a nested start tag fails with [`Error::UnexpectedEvent`].
    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => text.push_str(&t),
                Event::EndElement { .. } => return Ok(text),
                Event::StartElement { name, .. } => {
                    return Err(Error::UnexpectedEvent(format!(
                        "start of <{}> while reading text",
                        name
                    )))
                }
                Event::Comment(_) | Event::Other => {}
            }
        }
    }

    /// Reads the element text as an integer.
    fn read_int(&mut self) -> Result<i64> {
        Ok(self.read_text()?.trim().parse::<i64>()?)
    }

    /// Skips to the next start or end tag.
    ///
    /// Not every cursor provides this; the default fails with
    /// [`Error::Unsupported`].
    fn next_tag(&mut self) -> Result<Event> {
        Err(Error::Unsupported("next_tag"))
    }
}

/// An in-memory cursor over a prepared list of events.
///
/// Useful for replaying captured events or feeding a dispatch tree from
/// something other than an XML byte stream.
#[derive(Debug, Default, Clone)]
pub struct EventBuffer {
    events: VecDeque<Event>,
}

impl EventBuffer {
    /// Creates a buffer yielding `events` in order.
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Number of events left.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventCursor for EventBuffer {
    fn has_next(&mut self) -> bool {
        !self.events.is_empty()
    }

    fn next_event(&mut self) -> Result<Event> {
        self.events.pop_front().ok_or(Error::NoMoreEvents)
    }

    fn peek(&mut self) -> Result<Option<&Event>> {
        Ok(self.events.front())
    }
}

impl FromIterator<Event> for EventBuffer {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter)
    }
}
