//! Small pull-parser helpers over `quick-xml` shared by the container,
//! package and NCX readers.

use std::sync::atomic::{AtomicBool, Ordering};

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

static BACKEND_READY: AtomicBool = AtomicBool::new(false);

/// Prepare the XML backend for use.
///
/// Call once before opening the first book. Repeated calls are harmless.
pub fn init() {
    BACKEND_READY.store(true, Ordering::SeqCst);
}

/// Tear down the XML backend after the last book has been closed.
pub fn cleanup() {
    BACKEND_READY.store(false, Ordering::SeqCst);
}

/// Whether [`init`] has been called without a matching [`cleanup`].
pub fn is_initialized() -> bool {
    BACKEND_READY.load(Ordering::SeqCst)
}

/// Namespace URI of the OPF vocabulary.
pub const OPF_NS: &str = "http://www.idpf.org/2007/opf";

/// Create a reader over an in-memory document.
pub(crate) fn reader(text: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(text);
    // Whitespace is dropped per text node in `read_text`; trimming here
    // would eat the spaces around entity references.
    reader.config_mut().trim_text(false);
    reader
}

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Attributes of one element, decoded and unescaped.
#[derive(Debug, Default)]
pub(crate) struct Attrs {
    items: Vec<(String, String)>,
}

impl Attrs {
    /// Collect the attributes of a start or empty tag. Malformed
    /// attributes are skipped.
    pub(crate) fn of(e: &BytesStart<'_>) -> Self {
        let items = e
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let raw = String::from_utf8_lossy(&attr.value);
                let value = unescape(&raw)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                (key, value)
            })
            .collect();
        Self { items }
    }

    /// Look up an attribute by its exact qualified name.
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Look up `prefix:name`, falling back to the unprefixed `name`.
    pub(crate) fn get_ns(&self, prefix: &str, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| {
                key.split_once(':')
                    .is_some_and(|(p, local)| p == prefix && local == name)
            })
            .or_else(|| self.items.iter().find(|(key, _)| key == name))
            .map(|(_, value)| value.as_str())
    }

    /// Owned copy of `get`.
    pub(crate) fn owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_owned)
    }

    /// Prefix bound to `namespace` by an `xmlns:prefix` declaration here.
    pub(crate) fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, value)| key.starts_with("xmlns:") && value == namespace)
            .map(|(key, _)| &key["xmlns:".len()..])
    }
}

/// A child element met by [`each_child`].
#[derive(Debug)]
pub(crate) struct Child {
    /// Local name, ASCII-lowercased.
    pub(crate) local: String,
    pub(crate) attrs: Attrs,
    /// `true` for `<x>…</x>`, `false` for `<x/>`. When `true` the visitor
    /// must consume the element up to its end tag.
    pub(crate) has_body: bool,
}

impl Child {
    pub(crate) fn new(e: &BytesStart<'_>, has_body: bool) -> Self {
        let name = e.name();
        Self {
            local: String::from_utf8_lossy(local_name(name.as_ref())).to_ascii_lowercase(),
            attrs: Attrs::of(e),
            has_body,
        }
    }

    /// Consume the body if there is one.
    pub(crate) fn skip(&self, reader: &mut Reader<&[u8]>) -> Result<()> {
        if self.has_body {
            skip_element(reader)?;
        }
        Ok(())
    }

    /// Text content (empty for `<x/>`).
    pub(crate) fn text(&self, reader: &mut Reader<&[u8]>) -> Result<String> {
        if self.has_body {
            read_text(reader)
        } else {
            Ok(String::new())
        }
    }
}

/// Visit each child element of the element whose start tag was just read,
/// returning after its end tag.
pub(crate) fn each_child<'i>(
    reader: &mut Reader<&'i [u8]>,
    mut visit: impl FnMut(&mut Reader<&'i [u8]>, Child) -> Result<()>,
) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let child = Child::new(&e, true);
                visit(reader, child)?;
            }
            Event::Empty(e) => {
                let child = Child::new(&e, false);
                visit(reader, child)?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Collect the text content of the element whose start tag was just read,
/// consuming everything up to and including its end tag.
///
/// Text of nested elements is included. The result is trimmed.
pub(crate) fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Text(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    text.push_str(&resolved);
                }
            }
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }

    Ok(collapse_whitespace(&text))
}

/// Consume the rest of the element whose start tag was just read.
pub(crate) fn skip_element(reader: &mut Reader<&[u8]>) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

pub(crate) fn unexpected_eof() -> Error {
    Error::Xml(quick_xml::Error::Syntax(
        quick_xml::errors::SyntaxError::UnclosedTag,
    ))
}

/// Trim and fold internal runs of whitespace (line breaks inside long
/// descriptions) into single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve XML entity references.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };

    code.and_then(char::from_u32).map(|c| c.to_string())
}
