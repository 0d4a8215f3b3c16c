//! Error types for libepub operations.

use thiserror::Error;

/// Errors that can occur while opening or reading an EPUB.
#[derive(Error, Debug)]
pub enum Error {
    /// The archive could not be opened (missing file, not a zip, truncated).
    #[error("cannot open container: {0}")]
    ContainerOpen(String),

    /// `META-INF/container.xml` is missing or malformed, or it names no
    /// root of the requested media type.
    #[error("invalid container: {0}")]
    ContainerParse(String),

    /// The package document is malformed.
    #[error("invalid package document: {0}")]
    PackageParse(String),

    /// A manifest id referenced from the spine or the package was not found.
    #[error("manifest entry not found: {0}")]
    MissingResource(String),

    /// An archive entry could not be located or read.
    #[error("cannot read {path}: {reason}")]
    ResourceRead { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    pub(crate) fn resource_read(path: impl Into<String>, reason: impl ToString) -> Self {
        Error::ResourceRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
