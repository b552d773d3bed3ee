//! Scoped XML event streams and declarative tag dispatch.
//!
//! This crate layers a small declarative API over a pull-based XML event
//! stream:
//!
//! - **Event cursor**: [`EventCursor`] is the pull contract; [`XmlEventReader`]
//!   implements it over `quick-xml`.
//! - **Scoped reader**: [`ScopedEventReader`] shows only the events of one
//!   element and reports end-of-stream after the element's own end tag.
//! - **Tag dispatch**: [`TagDispatchTree`] routes elements by name to
//!   handlers or nested trees and skips everything else.
//! - **Writer**: [`XmlWriter`] is the matching write side.
//!
//! # Quick Start
//!
//! ```rust
//! use kroki_xml::{build_dispatch_tree, read_as_event_stream, EventCursor};
//! use std::cell::RefCell;
//! use std::io::Cursor;
//!
//! let xml = r#"<users><user id="1"><name>Ann</name></user><user id="2"><name>Bob</name></user></users>"#;
//! let names = RefCell::new(Vec::new());
//!
//! let tree = build_dispatch_tree(|b| {
//!     b.tag("users", |users| {
//!         users.use_tag("user", |user| {
//!             let id = user.attribute("id").unwrap_or_default().to_string();
//!             while user.has_next() {
//!                 if user.next_event()?.name() == Some("name") {
//!                     names.borrow_mut().push((id.clone(), user.read_text()?));
//!                 }
//!             }
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! read_as_event_stream(Cursor::new(xml), &tree).unwrap();
//! assert_eq!(names.borrow().len(), 2);
//! ```
//!
//! # Module Structure
//!
//! - [`event`] - Owned XML events
//! - [`cursor`] - The cursor contract and an in-memory cursor
//! - [`reader`] - Streaming XML reader
//! - [`scope`] - Scoped event reader
//! - [`dispatch`] - Tag dispatch tree and its builder
//! - [`writer`] - XML writer
//! - [`error`] - Error types
//!
//! # Optional Features
//!
//! - `serde` - Enable serde serialization/deserialization of [`Event`]
//! - `cli` - Build the `xml_select` command line tool

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod reader;
pub mod scope;
pub mod writer;

// Re-export commonly used types at the crate root
pub use cursor::{EventBuffer, EventCursor};
pub use dispatch::{
    build_dispatch_tree, read_as_event_stream, TagDispatchTree, TagDispatchTreeBuilder, TagRoute,
};
pub use error::{Error, Result};
pub use event::{Attribute, Event};
pub use reader::{ReaderConfig, XmlEventReader};
pub use scope::ScopedEventReader;
pub use writer::{xml, write_xml, WriterConfig, XmlWriter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
