//! Zip archive access by entry name.

use std::cell::RefCell;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use zip::ZipArchive;
use zip::result::{ZipError, ZipResult};

use crate::error::{Error, Result};
use crate::io::{ByteSource, FileSource, MemorySource, SourceCursor};

/// An opened OCF zip archive.
///
/// Reads go through a `RefCell` because the zip reader needs `&mut` to seek;
/// an `Archive` is therefore usable from one thread at a time.
pub struct Archive {
    name: String,
    zip: RefCell<ZipArchive<SourceCursor>>,
}

impl Archive {
    /// Open the archive at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let source = FileSource::open(path)
            .map_err(|e| Error::ContainerOpen(format!("{name} - {e}")))?;
        Self::from_source(Arc::new(source), name)
    }

    /// Open an archive held in memory.
    pub fn from_bytes(data: Vec<u8>, name: impl Into<String>) -> Result<Self> {
        Self::from_source(Arc::new(MemorySource::new(data)), name)
    }

    /// Open an archive over any random-access source.
    pub fn from_source(source: Arc<dyn ByteSource>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let zip = ZipArchive::new(SourceCursor::new(source))
            .map_err(|e| Error::ContainerOpen(format!("{name} - {e}")))?;
        Ok(Self {
            name,
            zip: RefCell::new(zip),
        })
    }

    /// Display name (the file path for archives opened from disk).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an entry with exactly this name exists.
    pub fn contains(&self, entry: &str) -> bool {
        self.zip.borrow().file_names().any(|name| name == entry)
    }

    /// All entry names in central-directory order.
    pub fn entries(&self) -> Vec<String> {
        self.zip.borrow().file_names().map(str::to_owned).collect()
    }

    pub fn len(&self) -> usize {
        self.zip.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an entry, failing with [`Error::ResourceRead`] if it is absent.
    pub fn read(&self, entry: &str) -> Result<Vec<u8>> {
        self.read_optional(entry)?
            .ok_or_else(|| Error::resource_read(entry, "not found in archive"))
    }

    /// Read an entry, distinguishing "absent" (`Ok(None)`) from read errors.
    ///
    /// Names that are not found verbatim are retried percent-decoded, since
    /// some producers escape hrefs in the package document but not in the zip.
    pub fn read_optional(&self, entry: &str) -> Result<Option<Vec<u8>>> {
        let mut zip = self.zip.borrow_mut();

        if let Some(data) = read_entry(&mut *zip, entry).map_err(|e| Error::resource_read(entry, e))? {
            return Ok(Some(data));
        }

        let decoded = match percent_encoding::percent_decode_str(entry).decode_utf8() {
            Ok(decoded) if decoded != entry => decoded,
            _ => return Ok(None),
        };
        read_entry(&mut *zip, &decoded).map_err(|e| Error::resource_read(entry, e))
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("name", &self.name)
            .field("entries", &self.len())
            .finish()
    }
}

fn read_entry<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> ZipResult<Option<Vec<u8>>> {
    let mut file = match zip.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut data = Vec::with_capacity(prealloc_hint(file.size()));
    file.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Upper bound on the buffer reserved from an entry's declared size, which
/// comes from the archive and may be wrong.
const MAX_PREALLOC: u64 = 1 << 20;

fn prealloc_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}
