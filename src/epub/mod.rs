//! EPUB container and package reading.
//!
//! [`Epub`] is the open handle: it owns the archive, the resolved
//! container, the parsed package and the diagnostics channel.

mod archive;
mod container;
mod guide;
mod iter;
mod manifest;
mod metadata;
mod package;
mod spine;
mod toc;
pub(crate) mod xml;

use std::fmt;
use std::io::Write;
use std::path::Path;

pub use archive::Archive;
pub use container::{
    CONTAINER_PATH, Container, ContainerRoot, EPUB_MIMETYPE, MIMETYPE_PATH, PACKAGE_MEDIA_TYPE,
    UNSUPPORTED_FILES,
};
pub use guide::{GuideRef, Site, Tour};
pub use iter::{IterMode, SpineIter};
pub use manifest::{Manifest, ManifestEntry};
pub use metadata::{Creator, Date, Identifier, Meta, Metadata, MetadataField};
pub use package::Package;
pub use spine::{Spine, SpineItem};
pub use toc::{NavPoint, parse_ncx};
pub use xml::{cleanup, init, is_initialized};

use crate::diagnostics::{DebugLevel, Diagnostics};
use crate::error::{Error, Result};
use crate::util::decode_xml;

/// Media type of an NCX navigation document.
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Settings for opening a book.
///
/// ```no_run
/// use libepub::{DebugLevel, Epub, OpenOptions};
///
/// let options = OpenOptions::new()
///     .with_debug(DebugLevel::Warning)
///     .with_read_toc(false);
/// let epub = Epub::open_with("book.epub", options)?;
/// # Ok::<(), libepub::Error>(())
/// ```
pub struct OpenOptions {
    debug: DebugLevel,
    package_media_type: String,
    read_toc: bool,
    writer: Option<Box<dyn Write + Send>>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            debug: DebugLevel::default(),
            package_media_type: PACKAGE_MEDIA_TYPE.to_string(),
            read_toc: true,
            writer: None,
        }
    }

    /// Verbosity threshold of the diagnostic side stream.
    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }

    /// Media type of the container root to parse as the package document.
    pub fn with_package_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.package_media_type = media_type.into();
        self
    }

    /// Whether to read the NCX navigation document.
    pub fn with_read_toc(mut self, read_toc: bool) -> Self {
        self.read_toc = read_toc;
        self
    }

    /// Send shown diagnostics to `writer` instead of stderr.
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    fn diagnostics(&mut self) -> Diagnostics {
        match self.writer.take() {
            Some(writer) => Diagnostics::with_writer(self.debug, writer),
            None => Diagnostics::new(self.debug),
        }
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("debug", &self.debug)
            .field("package_media_type", &self.package_media_type)
            .field("read_toc", &self.read_toc)
            .field("writer", &self.writer.is_some())
            .finish()
    }
}

/// An open EPUB.
///
/// Usable from one thread at a time; the archive cursor and the error
/// latch live behind `RefCell`s.
///
/// ```no_run
/// use libepub::{DebugLevel, Epub, IterMode, MetadataField};
///
/// libepub::init();
/// let epub = Epub::open("book.epub", DebugLevel::Error)?;
/// for title in epub.metadata(MetadataField::Title) {
///     println!("{title}");
/// }
///
/// let mut pages = epub.iter(IterMode::Linear);
/// let mut next = pages.current().map(<[u8]>::len);
/// while let Some(len) = next {
///     println!("{} bytes", len);
///     next = pages.advance().map(<[u8]>::len);
/// }
/// epub.close()?;
/// libepub::cleanup();
/// # Ok::<(), libepub::Error>(())
/// ```
pub struct Epub {
    filename: String,
    archive: Archive,
    container: Container,
    package: Package,
    nav_points: Vec<NavPoint>,
    diag: Diagnostics,
}

impl Epub {
    /// Open the book at `path`.
    pub fn open<P: AsRef<Path>>(path: P, debug: DebugLevel) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().with_debug(debug))
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        Self::load(path.display().to_string(), options, || Archive::open(path))
    }

    /// Open a book held in memory.
    pub fn from_bytes(data: Vec<u8>, debug: DebugLevel) -> Result<Self> {
        Self::from_bytes_with(data, "<memory>", OpenOptions::new().with_debug(debug))
    }

    pub fn from_bytes_with(
        data: Vec<u8>,
        name: impl Into<String>,
        options: OpenOptions,
    ) -> Result<Self> {
        let name = name.into();
        let archive_name = name.clone();
        Self::load(name, options, move || Archive::from_bytes(data, archive_name))
    }

    fn load(
        filename: String,
        mut options: OpenOptions,
        open: impl FnOnce() -> Result<Archive>,
    ) -> Result<Self> {
        let diag = options.diagnostics();
        if !is_initialized() {
            diag.warn("XML backend not initialized, call libepub::init() first");
        }
        diag.info(format_args!("opening {filename}"));

        let parts = open().and_then(|archive| {
            let (container, package, nav_points) = read_parts(&archive, &options, &diag)?;
            Ok((archive, container, package, nav_points))
        });
        match parts {
            Ok((archive, container, package, nav_points)) => Ok(Self {
                filename,
                archive,
                container,
                package,
                nav_points,
                diag,
            }),
            Err(e) => {
                diag.error(format_args!("{filename}: {e}"));
                Err(e)
            }
        }
    }

    /// Close the handle, releasing the archive and the parsed model.
    pub fn close(self) -> Result<()> {
        self.diag.info(format_args!("closing {}", self.filename));
        Ok(())
    }

    /// Name the book was opened under (its path for files on disk).
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Points of the NCX navigation map, empty when there is none.
    pub fn nav_points(&self) -> &[NavPoint] {
        &self.nav_points
    }

    /// One metadata slot formatted as strings, in document order.
    pub fn metadata(&self, field: MetadataField) -> Vec<String> {
        let values = self.package.metadata.field(field);
        if values.is_empty() {
            self.diag
                .verbose(format_args!("no {} metadata", field.label()));
        }
        values
    }

    /// Iterate over the spine.
    pub fn iter(&self, mode: IterMode) -> SpineIter<'_> {
        SpineIter::new(self, mode)
    }

    /// Raw bytes of any archive member, bypassing the package model.
    pub fn raw_entry(&self, name: &str) -> Result<Vec<u8>> {
        self.archive.read(name).inspect_err(|e| self.diag.error(e))
    }

    /// Most recent error-level diagnostic, copied out.
    pub fn last_error(&self) -> Option<String> {
        self.diag.last_error()
    }

    pub fn debug_level(&self) -> DebugLevel {
        self.diag.threshold()
    }

    pub fn set_debug(&self, debug: DebugLevel) {
        self.diag.set_threshold(debug);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Structural summary: container, package sections and nav map.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = self.dump_to(&mut out);
        out
    }

    pub fn dump_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        self.container.dump(&self.filename, out)?;
        self.package.dump(out)?;
        if !self.nav_points.is_empty() {
            writeln!(out, "navigation ({} points):", self.nav_points.len())?;
            for point in &self.nav_points {
                writeln!(
                    out,
                    "   {:indent$}{} -> {}",
                    "",
                    point.label,
                    point.src.as_deref().unwrap_or("-"),
                    indent = point.depth * 2
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Epub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Epub")
            .field("filename", &self.filename)
            .field("container", &self.container)
            .field("package", &self.package)
            .field("nav_points", &self.nav_points.len())
            .finish_non_exhaustive()
    }
}

fn read_parts(
    archive: &Archive,
    options: &OpenOptions,
    diag: &Diagnostics,
) -> Result<(Container, Package, Vec<NavPoint>)> {
    let container = Container::resolve(archive, diag)?;

    let media_type = options.package_media_type.as_str();
    let Some(root) = container.root_by_media_type(media_type) else {
        diag.warn(format_args!("no root of type {media_type} in {CONTAINER_PATH}"));
        return Err(Error::ContainerParse(format!("no root of type {media_type}")));
    };
    let path = root.full_path.as_str();
    diag.info(format_args!("package document is {path}"));

    let bytes = archive
        .read(path)
        .map_err(|e| Error::PackageParse(e.to_string()))?;
    let base = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    };
    let package = Package::parse(&decode_xml(&bytes), base, diag)?;

    let nav_points = if options.read_toc {
        read_nav_points(archive, &package, diag)
    } else {
        Vec::new()
    };

    Ok((container, package, nav_points))
}

/// Navigation problems never fail an open; they are reported as warnings.
fn read_nav_points(archive: &Archive, package: &Package, diag: &Diagnostics) -> Vec<NavPoint> {
    let Some(entry) = package.toc_entry() else {
        return Vec::new();
    };
    if entry.media_type != NCX_MEDIA_TYPE {
        diag.info(format_args!(
            "navigation document {} is {}, not read",
            entry.href, entry.media_type
        ));
        return Vec::new();
    }

    let path = package.resolve(&entry.href);
    let points = archive
        .read(&path)
        .and_then(|bytes| parse_ncx(&decode_xml(&bytes)));
    match points {
        Ok(points) => {
            diag.info(format_args!("{} navigation points in {path}", points.len()));
            points
        }
        Err(e) => {
            diag.warn(format_args!("can't read navigation document {path}: {e}"));
            Vec::new()
        }
    }
}
