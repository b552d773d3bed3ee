//! Declarative tag dispatch.
//!
//! A [`TagDispatchTree`] routes the elements of an event stream to handlers
//! registered by tag name. Handlers receive a [`ScopedEventReader`] bounded
//! to their element; nested trees match child names only inside the element
//! that selected them. Elements with no registered name are skipped together
//! with their whole subtree.
//!
//! # Example
//!
//! ```rust
//! use kroki_xml::cursor::EventCursor;
//! use kroki_xml::dispatch::{build_dispatch_tree, read_as_event_stream};
//! use std::cell::RefCell;
//! use std::io::Cursor;
//!
//! let xml = r#"<feed><entry><title>One</title></entry><junk/><entry><title>Two</title></entry></feed>"#;
//! let titles = RefCell::new(Vec::new());
//!
//! let tree = build_dispatch_tree(|root| {
//!     root.tag("feed", |feed| {
//!         feed.tag("entry", |entry| {
//!             entry.use_tag("title", |events| {
//!                 titles.borrow_mut().push(events.read_text()?);
//!                 Ok(())
//!             })?;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! read_as_event_stream(Cursor::new(xml), &tree).unwrap();
//! assert_eq!(*titles.borrow(), vec!["One", "Two"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;

use tracing::debug;

use crate::cursor::EventCursor;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::reader::XmlEventReader;
use crate::scope::ScopedEventReader;

/// A leaf handler: raw access to the events of one element.
pub type Handler<'h> = Box<dyn Fn(&mut ScopedEventReader<'_>) -> Result<()> + 'h>;

/// What happens to an element whose name was registered.
pub enum TagRoute<'h> {
    /// Route the element's children through a nested tree
    Dispatch(TagDispatchTree<'h>),
    /// Hand the element's events to a handler
    Use(Handler<'h>),
}

impl TagRoute<'_> {
    fn run(&self, scope: &mut ScopedEventReader<'_>) -> Result<()> {
        match self {
            TagRoute::Use(handler) => handler(scope),
            TagRoute::Dispatch(tree) => tree.parse(scope),
        }
    }
}

impl fmt::Debug for TagRoute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagRoute::Dispatch(tree) => f.debug_tuple("Dispatch").field(tree).finish(),
            TagRoute::Use(_) => f.write_str("Use(..)"),
        }
    }
}

/// Representation chosen by the number of registered tags.
enum Shape<'h> {
    /// Nothing registered: drain only
    NoOp,
    /// One registered tag, matched by a plain comparison
    Single {
        name: String,
        route: Box<TagRoute<'h>>,
    },
    /// Several tags, matched through a name index
    Multi(HashMap<String, TagRoute<'h>>),
}

/// An immutable routing table from tag names to handlers or nested tables.
///
/// Built once with a [`TagDispatchTreeBuilder`] and reusable for any number
/// of [`parse`](Self::parse) calls.
pub struct TagDispatchTree<'h> {
    shape: Shape<'h>,
}

impl<'h> TagDispatchTree<'h> {
    /// A tree with no registrations; parsing just drains the stream.
    pub fn no_op() -> Self {
        Self { shape: Shape::NoOp }
    }

    /// Number of registered tags at this level.
    pub fn len(&self) -> usize {
        match &self.shape {
            Shape::NoOp => 0,
            Shape::Single { .. } => 1,
            Shape::Multi(routes) => routes.len(),
        }
    }

    /// Returns true if no tag is registered at this level.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the route registered for `name`.
    pub fn route(&self, name: &str) -> Option<&TagRoute<'h>> {
        match &self.shape {
            Shape::NoOp => None,
            Shape::Single { name: tag, route } => (tag == name).then_some(route.as_ref()),
            Shape::Multi(routes) => routes.get(name),
        }
    }

    /// Registered tag names at this level, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = match &self.shape {
            Shape::NoOp => Vec::new(),
            Shape::Single { name, .. } => vec![name.as_str()],
            Shape::Multi(routes) => routes.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    /// Pulls events until `events` is exhausted, routing every element whose
    /// name is registered and skipping everything else.
    ///
    /// The first error from the cursor or from a handler aborts the parse.
    pub fn parse(&self, events: &mut dyn EventCursor) -> Result<()> {
        if let Shape::NoOp = self.shape {
            while events.has_next() {
                events.next_event()?;
            }
            return Ok(());
        }

        while events.has_next() {
            let Event::StartElement { name, attributes } = events.next_event()? else {
                continue;
            };
            let mut scope = ScopedEventReader::with_attributes(&mut *events, name, attributes);
            match self.route(scope.name()) {
                Some(route) => {
                    debug!(tag = %scope.name(), "dispatching element");
                    route.run(&mut scope)?;
                }
                None => {
                    debug!(tag = %scope.name(), "skipping unregistered element");
                }
            }
            scope.skip_rest()?;
        }
        Ok(())
    }
}

impl fmt::Debug for TagDispatchTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.tag_names() {
            if let Some(route) = self.route(name) {
                map.entry(&name, route);
            }
        }
        map.finish()
    }
}

/// Accumulates tag registrations into a [`TagDispatchTree`].
///
/// Registering a name twice fails immediately with
/// [`Error::DuplicateTag`]. After [`build`](Self::build) the builder is
/// finalized and rejects every further call with
/// [`Error::BuilderFinalized`].
#[derive(Debug, Default)]
pub struct TagDispatchTreeBuilder<'h> {
    routes: HashMap<String, TagRoute<'h>>,
    finalized: bool,
}

impl<'h> TagDispatchTreeBuilder<'h> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            finalized: false,
        }
    }

    /// Registers `name` with a nested tree configured by `configure`.
    pub fn tag<F>(&mut self, name: impl Into<String>, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut TagDispatchTreeBuilder<'h>) -> Result<()>,
    {
        let name = self.check_name(name.into())?;
        let mut nested = TagDispatchTreeBuilder::new();
        configure(&mut nested)?;
        let tree = nested.build()?;
        self.routes.insert(name, TagRoute::Dispatch(tree));
        Ok(self)
    }

    /// Registers `name` with a handler that reads the element's events.
    ///
    /// Whatever the handler leaves unread is skipped afterwards.
    pub fn use_tag<F>(&mut self, name: impl Into<String>, handler: F) -> Result<&mut Self>
    where
        F: Fn(&mut ScopedEventReader<'_>) -> Result<()> + 'h,
    {
        let name = self.check_name(name.into())?;
        self.routes.insert(name, TagRoute::Use(Box::new(handler)));
        Ok(self)
    }

    /// Freezes the registrations into a tree.
    pub fn build(&mut self) -> Result<TagDispatchTree<'h>> {
        if self.finalized {
            return Err(Error::BuilderFinalized);
        }
        self.finalized = true;

        let routes = std::mem::take(&mut self.routes);
        let shape = if routes.len() > 1 {
            Shape::Multi(routes)
        } else {
            match routes.into_iter().next() {
                Some((name, route)) => Shape::Single {
                    name,
                    route: Box::new(route),
                },
                None => Shape::NoOp,
            }
        };
        Ok(TagDispatchTree { shape })
    }

    fn check_name(&self, name: String) -> Result<String> {
        if self.finalized {
            return Err(Error::BuilderFinalized);
        }
        if self.routes.contains_key(&name) {
            return Err(Error::DuplicateTag(name));
        }
        Ok(name)
    }
}

/// Builds a tree in one go.
pub fn build_dispatch_tree<'h, F>(configure: F) -> Result<TagDispatchTree<'h>>
where
    F: FnOnce(&mut TagDispatchTreeBuilder<'h>) -> Result<()>,
{
    let mut builder = TagDispatchTreeBuilder::new();
    configure(&mut builder)?;
    builder.build()
}

/// Parses XML from `reader` through `tree`.
pub fn read_as_event_stream<R: BufRead>(reader: R, tree: &TagDispatchTree<'_>) -> Result<()> {
    let mut events = XmlEventReader::from_reader(reader);
    tree.parse(&mut events)
}
