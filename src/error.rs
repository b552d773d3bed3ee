//! Error types for kroki-xml.

use thiserror::Error;

/// Errors that can occur while reading, dispatching or writing XML.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute parsing error
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document ended or nested in a way the reader cannot accept
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// A read was attempted on an exhausted cursor
    #[error("No more events")]
    NoMoreEvents,

    /// An event arrived where the operation cannot accept it
    #[error("Unexpected event: {0}")]
    UnexpectedEvent(String),

    /// A read was attempted on a closed scoped reader
    #[error("Event reader closed already")]
    ReaderClosed,

    /// The same tag name was registered twice on one builder
    #[error("tag {0} already defined")]
    DuplicateTag(String),

    /// A dispatch tree builder was used after `build()`
    #[error("Builder already finalized")]
    BuilderFinalized,

    /// `close_tag` was called with no open tag
    #[error("No open tag to close")]
    NoOpenTag,

    /// The writer was finished while tags were still open
    #[error("Unclosed tags: {}", .0.join(", "))]
    UnclosedTags(Vec<String>),

    /// A comment whose text cannot be written as an XML comment
    #[error("Invalid comment: {0:?}")]
    InvalidComment(String),

    /// The operation is intentionally not provided
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Integer parsing error
    #[error("Integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl Error {
    /// Returns true for errors caused by misusing the API rather than by the
    /// document being read.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::ReaderClosed
                | Error::DuplicateTag(_)
                | Error::BuilderFinalized
                | Error::NoOpenTag
                | Error::UnclosedTags(_)
                | Error::InvalidComment(_)
        )
    }
}

/// Result type alias for kroki-xml operations.
pub type Result<T> = std::result::Result<T, Error>;
