//! Cursor over the spine that loads one content document at a time.

use super::Epub;
use super::manifest::ManifestEntry;
use super::spine::SpineItem;
use crate::error::{Error, Result};

/// Which spine entries an iterator visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IterMode {
    /// Every entry, in document order.
    Spine,
    /// Only entries with `linear = true`.
    #[default]
    Linear,
    /// Only entries marked `linear="no"`.
    NonLinear,
}

impl IterMode {
    fn accepts(self, item: &SpineItem) -> bool {
        match self {
            IterMode::Spine => true,
            IterMode::Linear => item.linear,
            IterMode::NonLinear => !item.linear,
        }
    }
}

/// Reading-order iterator borrowed from an [`Epub`].
///
/// Holds at most one payload: the bytes returned by `current` stay valid
/// until the next call to `advance`.
///
/// A failed load (unknown manifest id, unreadable entry) logs an error,
/// which is latched on the handle, and returns `None` without moving; the
/// caller may inspect [`Epub::last_error`] and `advance` past the entry.
pub struct SpineIter<'a> {
    epub: &'a Epub,
    mode: IterMode,
    /// `None` once exhausted.
    index: Option<usize>,
    payload: Option<Vec<u8>>,
}

impl<'a> SpineIter<'a> {
    pub(crate) fn new(epub: &'a Epub, mode: IterMode) -> Self {
        let mut iter = Self {
            epub,
            mode,
            index: None,
            payload: None,
        };
        iter.index = iter.next_from(0);
        iter
    }

    pub fn mode(&self) -> IterMode {
        self.mode
    }

    /// Bytes of the current entry, loading them on first access.
    pub fn current(&mut self) -> Option<&[u8]> {
        let index = self.index?;
        if self.payload.is_none() {
            match self.load(index) {
                Ok(bytes) => self.payload = Some(bytes),
                Err(e) => {
                    self.epub.diag.error(e);
                    return None;
                }
            }
        }
        self.payload.as_deref()
    }

    /// Move to the next visited entry and return its bytes.
    pub fn advance(&mut self) -> Option<&[u8]> {
        self.payload = None;
        self.index = self.index.and_then(|i| self.next_from(i + 1));
        self.current()
    }

    /// Spine position of the current entry.
    pub fn position(&self) -> Option<usize> {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index.is_none()
    }

    pub fn item(&self) -> Option<&'a SpineItem> {
        self.epub.package.spine.get(self.index?)
    }

    /// Manifest entry of the current item, if its idref resolves.
    pub fn entry(&self) -> Option<&'a ManifestEntry> {
        self.epub.package.manifest.get(&self.item()?.idref)
    }

    /// Archive path of the current entry.
    pub fn path(&self) -> Option<String> {
        self.entry().map(|entry| self.epub.package.resolve(&entry.href))
    }

    fn next_from(&self, start: usize) -> Option<usize> {
        let items = self.epub.package.spine.items();
        (start..items.len()).find(|&i| self.mode.accepts(&items[i]))
    }

    fn load(&self, index: usize) -> Result<Vec<u8>> {
        let package = &self.epub.package;
        let item = package
            .spine
            .get(index)
            .ok_or_else(|| Error::MissingResource(format!("spine position {index}")))?;
        let entry = package
            .manifest
            .get(&item.idref)
            .ok_or_else(|| Error::MissingResource(item.idref.clone()))?;
        let path = package.resolve(&entry.href);
        self.epub
            .diag
            .verbose(format_args!("reading {} from {path}", entry.id));
        self.epub.archive.read(&path)
    }
}

impl std::fmt::Debug for SpineIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpineIter")
            .field("mode", &self.mode)
            .field("index", &self.index)
            .field("loaded", &self.payload.as_ref().map(Vec::len))
            .finish()
    }
}
