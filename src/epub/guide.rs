//! Guide landmarks and (deprecated) tours.

/// A `<reference>` in the guide: cover, title page, table of contents…
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideRef {
    /// The `type` attribute, e.g. `cover` or `text`.
    pub ref_type: String,
    pub title: Option<String>,
    pub href: String,
}

/// A `<tour>`: an alternate reading path through a subset of sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tour {
    pub id: String,
    pub title: Option<String>,
    pub sites: Vec<Site>,
}

/// A `<site>` within a tour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    pub title: Option<String>,
    pub href: String,
}
