//! Spine: the reading order.

/// An `<itemref>` in the spine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    /// Id of the referenced manifest entry.
    pub idref: String,
    /// `false` only when the itemref carries `linear="no"`.
    pub linear: bool,
}

impl SpineItem {
    pub fn new(idref: impl Into<String>, linear: bool) -> Self {
        Self {
            idref: idref.into(),
            linear,
        }
    }

    /// Interpret a `linear` attribute value. Only `no` (any case) is
    /// non-linear; absent or anything else reads as linear.
    pub fn parse_linear(value: Option<&str>) -> bool {
        !value.is_some_and(|v| v.trim().eq_ignore_ascii_case("no"))
    }
}

/// Ordered spine items plus the running count of linear ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spine {
    items: Vec<SpineItem>,
    linear_count: usize,
}

impl Spine {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, item: SpineItem) {
        if item.linear {
            self.linear_count += 1;
        }
        self.items.push(item);
    }

    pub fn items(&self) -> &[SpineItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&SpineItem> {
        self.items.get(index)
    }

    /// Number of items with `linear = true`.
    pub fn linear_count(&self) -> usize {
        self.linear_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpineItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Spine {
    type Item = &'a SpineItem;
    type IntoIter = std::slice::Iter<'a, SpineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
