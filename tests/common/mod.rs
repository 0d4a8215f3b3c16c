//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use libepub::{DebugLevel, OpenOptions};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const OPF_PATH: &str = "OEBPS/content.opf";

/// A package document wrapping the given sections.
pub fn opf(sections: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" xmlns:opf="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
{sections}
</package>"#
    )
}

/// Metadata, three-chapter manifest and spine with a non-linear middle.
pub fn three_chapter_opf() -> String {
    opf(r#"
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>The Book</dc:title>
  <dc:creator opf:role="aut" opf:file-as="Doe, John">John Doe</dc:creator>
  <dc:identifier id="bookid" opf:scheme="UUID">urn:uuid:0000</dc:identifier>
  <dc:language>en</dc:language>
</metadata>
<manifest>
  <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
  <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
  <item id="aside" href="aside.xhtml" media-type="application/xhtml+xml"/>
  <item id="ch2" href="ch2.xhtml" media-type="application/xhtml+xml"/>
</manifest>
<spine toc="ncx">
  <itemref idref="ch1"/>
  <itemref idref="aside" linear="no"/>
  <itemref idref="ch2"/>
</spine>"#)
}

pub const NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <navMap>
    <navPoint id="np1" playOrder="1"><navLabel><text>Chapter 1</text></navLabel><content src="ch1.xhtml"/></navPoint>
    <navPoint id="np2" playOrder="2"><navLabel><text>Chapter 2</text></navLabel><content src="ch2.xhtml"/></navPoint>
  </navMap>
</ncx>"#;

/// Builds OCF archives in memory.
#[derive(Default)]
pub struct EpubBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `mimetype` plus a container document pointing at [`OPF_PATH`].
    pub fn standard() -> Self {
        Self::new()
            .entry("mimetype", "application/epub+zip")
            .entry("META-INF/container.xml", CONTAINER_XML)
    }

    /// The standard three-chapter book, content documents included.
    pub fn three_chapters() -> Self {
        Self::standard()
            .entry(OPF_PATH, three_chapter_opf())
            .entry("OEBPS/toc.ncx", NCX)
            .entry("OEBPS/ch1.xhtml", "<html><body><p>one</p></body></html>")
            .entry("OEBPS/aside.xhtml", "<html><body><p>aside</p></body></html>")
            .entry("OEBPS/ch2.xhtml", "<html><body><p>two</p></body></html>")
    }

    pub fn entry(mut self, name: &str, data: impl AsRef<[u8]>) -> Self {
        self.entries.push((name.to_string(), data.as_ref().to_vec()));
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.entries.retain(|(entry, _)| entry != name);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &self.entries {
            let method = if name == "mimetype" {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Write the archive as `book.epub` inside `dir`.
    pub fn write_to(&self, dir: &TempDir) -> PathBuf {
        let path = dir.path().join("book.epub");
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Shared in-memory diagnostics writer.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Options that discard every diagnostic.
pub fn quiet() -> OpenOptions {
    OpenOptions::new()
        .with_debug(DebugLevel::None)
        .with_writer(io::sink())
}

/// Options capturing diagnostics up to `level`.
pub fn captured(level: DebugLevel) -> (OpenOptions, Capture) {
    let capture = Capture::default();
    let options = OpenOptions::new()
        .with_debug(level)
        .with_writer(capture.clone());
    (options, capture)
}
