//! Descriptive metadata (Dublin Core elements plus `<meta>` extensions).
//!
//! Every slot is an ordered, possibly empty list: repeated elements are kept
//! in the order they appear in the package document.

use std::fmt;

/// `<dc:identifier>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifier {
    pub value: String,
    /// `opf:scheme`, e.g. `ISBN` or `UUID`.
    pub scheme: Option<String>,
    /// The element's `id`, referenced by `package@unique-identifier`.
    pub id: Option<String>,
}

/// `<dc:creator>` or `<dc:contributor>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Creator {
    pub name: String,
    pub file_as: Option<String>,
    /// MARC relator code such as `aut` or `edt`.
    pub role: Option<String>,
}

/// `<dc:date>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Date {
    pub value: String,
    /// `opf:event`, e.g. `publication` or `modification`.
    pub event: Option<String>,
}

/// `<meta>` extension metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub name: String,
    pub content: String,
}

/// Selects one metadata slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Identifier,
    Title,
    Creator,
    Contributor,
    Subject,
    Publisher,
    Description,
    Date,
    Type,
    Format,
    Source,
    Language,
    Relation,
    Coverage,
    Rights,
    Meta,
}

impl MetadataField {
    pub const ALL: [MetadataField; 16] = [
        MetadataField::Identifier,
        MetadataField::Title,
        MetadataField::Creator,
        MetadataField::Contributor,
        MetadataField::Subject,
        MetadataField::Publisher,
        MetadataField::Description,
        MetadataField::Date,
        MetadataField::Type,
        MetadataField::Format,
        MetadataField::Source,
        MetadataField::Language,
        MetadataField::Relation,
        MetadataField::Coverage,
        MetadataField::Rights,
        MetadataField::Meta,
    ];

    /// Human-readable label used by dumps.
    pub fn label(self) -> &'static str {
        match self {
            MetadataField::Identifier => "Identifier",
            MetadataField::Title => "Title",
            MetadataField::Creator => "Creator",
            MetadataField::Contributor => "Contributor",
            MetadataField::Subject => "Subject",
            MetadataField::Publisher => "Publisher",
            MetadataField::Description => "Description",
            MetadataField::Date => "Date",
            MetadataField::Type => "Type",
            MetadataField::Format => "Format",
            MetadataField::Source => "Source",
            MetadataField::Language => "Language",
            MetadataField::Relation => "Relation",
            MetadataField::Coverage => "Coverage",
            MetadataField::Rights => "Rights",
            MetadataField::Meta => "Meta",
        }
    }
}

/// Book metadata as declared in the package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub(crate) identifiers: Vec<Identifier>,
    pub(crate) titles: Vec<String>,
    pub(crate) creators: Vec<Creator>,
    pub(crate) contributors: Vec<Creator>,
    pub(crate) subjects: Vec<String>,
    pub(crate) publishers: Vec<String>,
    pub(crate) descriptions: Vec<String>,
    pub(crate) dates: Vec<Date>,
    pub(crate) types: Vec<String>,
    pub(crate) formats: Vec<String>,
    pub(crate) sources: Vec<String>,
    pub(crate) languages: Vec<String>,
    pub(crate) relations: Vec<String>,
    pub(crate) coverages: Vec<String>,
    pub(crate) rights: Vec<String>,
    pub(crate) metas: Vec<Meta>,
}

impl Metadata {
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn creators(&self) -> &[Creator] {
        &self.creators
    }

    pub fn contributors(&self) -> &[Creator] {
        &self.contributors
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn publishers(&self) -> &[String] {
        &self.publishers
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    pub fn coverages(&self) -> &[String] {
        &self.coverages
    }

    pub fn rights(&self) -> &[String] {
        &self.rights
    }

    pub fn metas(&self) -> &[Meta] {
        &self.metas
    }

    /// First title, if any.
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    /// Content of the first `<meta name="...">` with the given name.
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.metas
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.content.as_str())
    }

    /// Format one slot as display strings, in document order.
    ///
    /// Structured slots render as `scheme: value` (identifiers),
    /// `role: name (file-as)` (creators and contributors), `event: value`
    /// (dates) and `name: content` (meta); missing parts are omitted.
    pub fn field(&self, field: MetadataField) -> Vec<String> {
        fn strings(values: &[String]) -> Vec<String> {
            values.to_vec()
        }
        fn display<T: fmt::Display>(values: &[T]) -> Vec<String> {
            values.iter().map(ToString::to_string).collect()
        }

        match field {
            MetadataField::Identifier => display(&self.identifiers),
            MetadataField::Title => strings(&self.titles),
            MetadataField::Creator => display(&self.creators),
            MetadataField::Contributor => display(&self.contributors),
            MetadataField::Subject => strings(&self.subjects),
            MetadataField::Publisher => strings(&self.publishers),
            MetadataField::Description => strings(&self.descriptions),
            MetadataField::Date => display(&self.dates),
            MetadataField::Type => strings(&self.types),
            MetadataField::Format => strings(&self.formats),
            MetadataField::Source => strings(&self.sources),
            MetadataField::Language => strings(&self.languages),
            MetadataField::Relation => strings(&self.relations),
            MetadataField::Coverage => strings(&self.coverages),
            MetadataField::Rights => strings(&self.rights),
            MetadataField::Meta => display(&self.metas),
        }
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        MetadataField::ALL.iter().all(|&f| self.len(f) == 0)
    }

    /// Number of values in a slot.
    pub fn len(&self, field: MetadataField) -> usize {
        match field {
            MetadataField::Identifier => self.identifiers.len(),
            MetadataField::Title => self.titles.len(),
            MetadataField::Creator => self.creators.len(),
            MetadataField::Contributor => self.contributors.len(),
            MetadataField::Subject => self.subjects.len(),
            MetadataField::Publisher => self.publishers.len(),
            MetadataField::Description => self.descriptions.len(),
            MetadataField::Date => self.dates.len(),
            MetadataField::Type => self.types.len(),
            MetadataField::Format => self.formats.len(),
            MetadataField::Source => self.sources.len(),
            MetadataField::Language => self.languages.len(),
            MetadataField::Relation => self.relations.len(),
            MetadataField::Coverage => self.coverages.len(),
            MetadataField::Rights => self.rights.len(),
            MetadataField::Meta => self.metas.len(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scheme {
            Some(scheme) => write!(f, "{scheme}: {}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

impl fmt::Display for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(role) = &self.role {
            write!(f, "{role}: ")?;
        }
        f.write_str(&self.name)?;
        if let Some(file_as) = &self.file_as {
            write!(f, " ({file_as})")?;
        }
        Ok(())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.event {
            Some(event) => write!(f, "{event}: {}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.content)
    }
}
