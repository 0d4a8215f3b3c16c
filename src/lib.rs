//! # libepub
//!
//! A reader for EPUB (OCF) archives and their OPF package documents.
//!
//! ## Features
//!
//! - Resolves the package document through `META-INF/container.xml`
//! - Parses Dublin Core metadata, the manifest, the spine, guide and tours
//! - Iterates the reading order, loading one content document at a time
//! - Reads the NCX navigation map into a flat, depth-annotated list
//! - Raw access to any archive member
//!
//! ## Quick Start
//!
//! ```no_run
//! use libepub::{DebugLevel, Epub, IterMode, MetadataField};
//!
//! libepub::init();
//!
//! let epub = Epub::open("book.epub", DebugLevel::Warning)?;
//! println!("{}", epub.metadata(MetadataField::Title).join(" / "));
//!
//! let mut reading = epub.iter(IterMode::Linear);
//! if let Some(first) = reading.current() {
//!     println!("first document: {} bytes", first.len());
//! }
//! epub.close()?;
//!
//! libepub::cleanup();
//! # Ok::<(), libepub::Error>(())
//! ```
//!
//! ## Diagnostics
//!
//! Every handle carries a [`Diagnostics`] channel. Messages always go to the
//! [`log`] facade (target `libepub`); messages at or below the handle's
//! [`DebugLevel`] are also printed to stderr. The last error-level message
//! is kept and available through [`Epub::last_error`].

pub mod diagnostics;
pub mod epub;
pub mod error;
pub mod io;
pub(crate) mod util;

pub use diagnostics::{DebugLevel, Diagnostics};
pub use epub::{
    Container, ContainerRoot, Creator, Date, Epub, GuideRef, Identifier, IterMode, Manifest,
    ManifestEntry, Meta, Metadata, MetadataField, NavPoint, OpenOptions, Package, Site, Spine,
    SpineItem, SpineIter, Tour, cleanup, init,
};
pub use error::{Error, Result};
