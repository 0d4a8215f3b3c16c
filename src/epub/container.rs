//! OCF container resolution: `mimetype` and `META-INF/container.xml`.

use std::fmt;

use quick_xml::events::Event;

use super::archive::Archive;
use super::xml::{self, Attrs};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::util::decode_xml;

pub const MIMETYPE_PATH: &str = "mimetype";
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Mimetype assumed when the `mimetype` entry is missing.
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Media type of the OPF package document root.
pub const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Auxiliary OCF files that are detected but not interpreted.
pub const UNSUPPORTED_FILES: [&str; 5] = [
    "META-INF/manifest.xml",
    "META-INF/metadata.xml",
    "META-INF/signatures.xml",
    "META-INF/encryption.xml",
    "META-INF/rights.xml",
];

/// A `<rootfile>` of the container document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRoot {
    pub media_type: String,
    /// Archive path of the root document.
    pub full_path: String,
}

/// Result of resolving the container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub mimetype: String,
    pub roots: Vec<ContainerRoot>,
    /// Auxiliary META-INF files present in the archive.
    pub unsupported: Vec<String>,
}

impl Container {
    /// Read the mimetype, the root list and the auxiliary file census.
    pub fn resolve(archive: &Archive, diag: &Diagnostics) -> Result<Self> {
        let mimetype = match archive.read_optional(MIMETYPE_PATH) {
            Ok(Some(bytes)) => {
                let mimetype = String::from_utf8_lossy(&bytes).trim().to_string();
                diag.info(format_args!("mimetype found {mimetype}"));
                mimetype
            }
            Ok(None) => {
                diag.warn(format_args!("can't get mimetype, assuming {EPUB_MIMETYPE}"));
                EPUB_MIMETYPE.to_string()
            }
            Err(e) => {
                diag.warn(format_args!("can't get mimetype ({e}), assuming {EPUB_MIMETYPE}"));
                EPUB_MIMETYPE.to_string()
            }
        };

        let bytes = archive
            .read_optional(CONTAINER_PATH)
            .map_err(|e| Error::ContainerParse(e.to_string()))?
            .ok_or_else(|| Error::ContainerParse(format!("{CONTAINER_PATH} not found")))?;
        let roots = parse_roots(&decode_xml(&bytes), diag)?;
        if roots.is_empty() {
            return Err(Error::ContainerParse(format!(
                "{CONTAINER_PATH} lists no rootfile"
            )));
        }

        let mut unsupported = Vec::new();
        for name in UNSUPPORTED_FILES {
            if archive.contains(name) {
                diag.warn(format_args!(
                    "file {name} exists but is not supported by this version"
                ));
                unsupported.push(name.to_string());
            }
        }

        Ok(Self {
            mimetype,
            roots,
            unsupported,
        })
    }

    /// First root with exactly this media type.
    pub fn root_by_media_type(&self, media_type: &str) -> Option<&ContainerRoot> {
        self.roots.iter().find(|root| root.media_type == media_type)
    }

    /// Write the archive name, mimetype and roots.
    pub fn dump(&self, filename: &str, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out, "filename:\t {filename}")?;
        writeln!(out, "mimetype:\t {}", self.mimetype)?;
        for root in &self.roots {
            writeln!(out, "root:")?;
            writeln!(out, " full path:\t {}", root.full_path)?;
            writeln!(out, " media type:\t {}", root.media_type)?;
        }
        for name in &self.unsupported {
            writeln!(out, "unsupported:\t {name}")?;
        }
        Ok(())
    }
}

/// Collect every `rootfile` element of a container document, in order.
pub fn parse_roots(text: &str, diag: &Diagnostics) -> Result<Vec<ContainerRoot>> {
    let mut reader = xml::reader(text);
    let mut roots = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::ContainerParse(format!("{CONTAINER_PATH}: {e}")))?;
        let e = match event {
            Event::Start(e) => {
                depth += 1;
                e
            }
            Event::Empty(e) => e,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof if depth > 0 => {
                return Err(Error::ContainerParse(format!(
                    "{CONTAINER_PATH}: unexpected end of document"
                )));
            }
            Event::Eof => break,
            _ => continue,
        };
        if xml::local_name(e.name().as_ref()).eq_ignore_ascii_case(b"rootfile") {
            let attrs = Attrs::of(&e);
            let media_type = attrs.owned("media-type").unwrap_or_else(|| {
                diag.warn("rootfile without media-type");
                String::new()
            });
            let full_path = attrs.owned("full-path").unwrap_or_else(|| {
                diag.warn("rootfile without full-path");
                String::new()
            });
            diag.verbose(format_args!("found root {full_path} ({media_type})"));
            roots.push(ContainerRoot {
                media_type,
                full_path,
            });
        }
    }

    Ok(roots)
}
