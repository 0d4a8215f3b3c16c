//! Manifest: every resource in the publication, keyed by unique id.

use std::collections::HashMap;

/// One `<item>` of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    /// Path relative to the package document.
    pub href: String,
    pub media_type: String,
    /// Id of the fallback item for readers that can't handle `media_type`.
    pub fallback: Option<String>,
    pub fallback_style: Option<String>,
    pub required_namespace: Option<String>,
    pub required_modules: Option<String>,
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            ..Default::default()
        }
    }
}

/// Unique-by-id resource index, iterable in document order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    by_id: HashMap<String, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Insert an entry. The first entry with a given id wins; a later
    /// duplicate is handed back to the caller untouched.
    pub(crate) fn insert(&mut self, entry: ManifestEntry) -> Result<(), ManifestEntry> {
        if self.by_id.contains_key(&entry.id) {
            return Err(entry);
        }
        self.by_id.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
